//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetch policy, the crawl driver and persistence end-to-end.

use health_harvest::config::{Config, FetchConfig, Source, SourceCategory};
use health_harvest::crawler::{Coordinator, FetchFailure, FetchPolicy};
use health_harvest::extract::DocumentKind;
use health_harvest::state::{RunContext, RunPhase};
use health_harvest::{run_harvest, HarvestError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME_PAGE: &str = r#"<html><head><title>Test Ministry of Health</title></head><body>
    <ul><li>National plan <a href="/files/plan.pdf">Health Plan 2024</a></li></ul>
    <article>
        <h2>Measles campaign reaches five million children</h2>
        <span class="date">1 March 2024</span>
        <a href="/news/measles">Read more</a>
    </article>
    <table>
        <caption>Vaccination Coverage by State</caption>
        <thead><tr><th>State</th><th>Coverage</th></tr></thead>
        <tbody><tr><td>Kano</td><td>85</td></tr><tr><td>Lagos</td><td>91</td></tr></tbody>
    </table>
    <footer>Contact us at info@health.gov.ng or +2348031234567</footer>
</body></html>"#;

const PLAIN_PAGE: &str =
    r#"<html><head><title>Reports</title></head><body><p>Nothing yet.</p></body></html>"#;

/// Creates a test configuration with one source on the mock server
fn create_test_config(base_url: &str, pages: &[&str], output_dir: &str) -> Config {
    let mut config = Config::default();
    config.fetch = FetchConfig {
        request_delay_ms: 1, // Very short for testing
        max_attempts: 3,
        timeout_secs: 5,
        rate_limit_backoff_ms: 1,
    };
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.purpose = "Testing".to_string();
    config.user_agent.contact_email = "test@example.com".to_string();
    config.output.directory = output_dir.to_string();
    config.sitreps.enabled = false;
    config.sources = vec![test_source(base_url, pages)];
    config
}

fn test_source(base_url: &str, pages: &[&str]) -> Source {
    Source {
        key: "test_moh".to_string(),
        name: "Test Ministry".to_string(),
        base_url: base_url.to_string(),
        pages: pages.iter().map(|p| p.to_string()).collect(),
        category: SourceCategory::Guidelines,
    }
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn new_coordinator(config: Config) -> Coordinator {
    Coordinator::new(config, Arc::new(RunContext::new("test")))
        .expect("Failed to create coordinator")
}

#[tokio::test]
async fn test_full_run_extracts_and_persists() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(html(PLAIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let out = TempDir::new().unwrap();
    let output_dir = out.path().join("scraped_data");
    let config = create_test_config(
        &mock_server.uri(),
        &["/", "/reports"],
        output_dir.to_str().unwrap(),
    );

    let summary = run_harvest(config, "test-hash")
        .await
        .expect("Harvest failed");

    assert_eq!(summary.config_hash, "test-hash");
    assert_eq!(summary.sources_total, 1);
    assert_eq!(summary.pages_scraped, 2);
    assert_eq!(summary.total_urls_visited, 2);
    // robots.txt is not counted
    assert_eq!(summary.total_requests, 2);
    assert_eq!(summary.documents_found, 1);
    assert_eq!(summary.articles_found, 1);
    assert_eq!(summary.tables_found, 1);
    assert_eq!(summary.unique_emails, 1);
    assert_eq!(summary.unique_phones, 1);

    // Snapshots: the root page falls back to the source name
    assert!(output_dir.join("html/Test_Ministry.html").is_file());
    assert!(output_dir.join("html/reports.html").is_file());

    assert!(output_dir.join("summary.json").is_file());
    assert!(output_dir.join("summary.md").is_file());

    let json_file = std::fs::read_dir(output_dir.join("json"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("scraped_data_"))
        })
        .expect("JSON export missing");
    let data: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_file).unwrap()).unwrap();

    assert_eq!(
        data["documents"][0]["url"],
        format!("{}/files/plan.pdf", mock_server.uri())
    );
    assert_eq!(data["documents"][0]["title"], "Health Plan 2024");
    assert_eq!(data["articles"][0]["date"], "1 March 2024");
    assert_eq!(data["tables"][0]["title"], "Vaccination Coverage by State");
    assert_eq!(data["tables"][0]["data"][0]["State"], "Kano");
    assert_eq!(data["tables"][0]["data"][1]["Coverage"], 91);

    let home = format!("{}/", mock_server.uri());
    assert_eq!(data["contacts"][&home]["emails"][0], "info@health.gov.ng");

    let csv_count = std::fs::read_dir(output_dir.join("csv")).unwrap().count();
    assert_eq!(csv_count, 2);
}

#[tokio::test]
async fn test_robots_disallow_skips_source() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nDisallow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(html(PLAIN_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/", "/reports"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.tally().sources_blocked, 1);
    assert_eq!(coordinator.tally().pages_scraped, 0);
    assert!(coordinator.result().visited.is_empty());
    assert_eq!(coordinator.context().requests(), 0);
}

#[tokio::test]
async fn test_robots_forbidden_blocks_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.tally().sources_blocked, 1);
}

#[tokio::test]
async fn test_robots_unreachable_fails_open() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(PLAIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.tally().sources_blocked, 0);
    assert_eq!(coordinator.tally().pages_scraped, 1);
}

#[tokio::test]
async fn test_missing_robots_allows() {
    let mock_server = MockServer::start().await;

    // No robots.txt mounted: the mock server answers 404
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(PLAIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.tally().pages_scraped, 1);
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &[], "unused");
    let context = Arc::new(RunContext::default());
    let policy = FetchPolicy::from_config(&config, Arc::clone(&context)).unwrap();

    let url = Url::parse(&format!("{}/busy", mock_server.uri())).unwrap();
    let result = policy.fetch(&url).await;

    assert!(!result.is_success());
    assert_eq!(result.attempts, 3);
    assert_eq!(result.failure(), Some(&FetchFailure::RateLimited));
    assert_eq!(context.requests(), 3);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html(PLAIN_PAGE))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &[], "unused");
    let context = Arc::new(RunContext::default());
    let policy = FetchPolicy::from_config(&config, Arc::clone(&context)).unwrap();

    let url = Url::parse(&format!("{}/flaky", mock_server.uri())).unwrap();
    let result = policy.fetch(&url).await;

    assert!(result.is_success());
    assert_eq!(result.attempts, 2);
    let page = result.page().unwrap();
    assert_eq!(page.status_code, 200);
    assert!(page.text().contains("Nothing yet."));
    assert_eq!(context.requests(), 2);
}

#[tokio::test]
async fn test_rate_limit_backoff_grows_per_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &[], "unused");
    config.fetch.rate_limit_backoff_ms = 200;
    let policy = FetchPolicy::from_config(&config, Arc::new(RunContext::default())).unwrap();

    let url = Url::parse(&format!("{}/busy", mock_server.uri())).unwrap();
    let started = Instant::now();
    let result = policy.fetch(&url).await;
    let elapsed = started.elapsed();

    assert_eq!(result.failure(), Some(&FetchFailure::RateLimited));
    // 2 x 200ms before the second attempt, 3 x 200ms before the third
    assert!(elapsed >= Duration::from_millis(1000), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1400), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(PLAIN_PAGE).set_delay(Duration::from_millis(1500)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &[], "unused");
    config.fetch.timeout_secs = 1;
    let context = Arc::new(RunContext::default());
    let policy = FetchPolicy::from_config(&config, Arc::clone(&context)).unwrap();

    let url = Url::parse(&format!("{}/slow", mock_server.uri())).unwrap();
    let result = policy.fetch(&url).await;

    assert!(!result.is_success());
    assert_eq!(result.attempts, 3);
    assert_eq!(result.failure(), Some(&FetchFailure::Timeout));
    assert_eq!(context.requests(), 3);
}

#[tokio::test]
async fn test_body_bytes_are_kept_verbatim() {
    let mock_server = MockServer::start().await;
    let body = b"<html><body><p>Ab\xe9okuta</p></body></html>".to_vec();

    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.clone())
                .insert_header("content-type", "text/html; charset=iso-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &[], "unused");
    let policy = FetchPolicy::from_config(&config, Arc::new(RunContext::default())).unwrap();

    let url = Url::parse(&format!("{}/latin1", mock_server.uri())).unwrap();
    let result = policy.fetch(&url).await;

    let page = result.page().unwrap();
    assert_eq!(page.body, body);
    assert!(page.text().contains("Ab\u{fffd}okuta"));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &[], "unused");
    let policy = FetchPolicy::from_config(&config, Arc::new(RunContext::default())).unwrap();

    let url = Url::parse(&format!("{}/missing", mock_server.uri())).unwrap();
    let result = policy.fetch(&url).await;

    assert_eq!(result.attempts, 1);
    assert_eq!(result.failure(), Some(&FetchFailure::Status(404)));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/broken"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    // Failed pages stay visited but produce no records
    assert_eq!(coordinator.result().visited.len(), 1);
    assert_eq!(coordinator.tally().pages_scraped, 0);
}

#[tokio::test]
async fn test_visited_page_fetched_once() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(HOME_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/a", "/a", "/a#section"], "unused");
    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert_eq!(coordinator.result().visited.len(), 1);
    assert_eq!(coordinator.tally().pages_scraped, 1);
    assert_eq!(coordinator.result().documents.len(), 1);
    assert_eq!(coordinator.context().requests(), 1);
}

#[tokio::test]
async fn test_scrape_page_returns_none_when_visited() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(HOME_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["/"], "unused");
    let source = config.sources[0].clone();
    let mut coordinator = new_coordinator(config);
    coordinator.scrape_source(&source).await.unwrap();

    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    let again = coordinator.scrape_page(&url, "Test Ministry").await.unwrap();

    assert!(again.is_none());
    assert_eq!(coordinator.phase(), RunPhase::ScrapingSource);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0 (Testing; test@example.com)"))
        .respond_with(html(PLAIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &[], "unused");
    let policy = FetchPolicy::from_config(&config, Arc::new(RunContext::default())).unwrap();

    let url = Url::parse(&format!("{}/", mock_server.uri())).unwrap();
    assert!(policy.fetch(&url).await.is_success());
}

#[tokio::test]
async fn test_sitrep_pass() {
    let mock_server = MockServer::start().await;

    // The report listing is not gated by robots.txt
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/diseases/sitreps"))
        .respond_with(html(
            r#"<html><body>
                <a href="/diseases/sitreps/lassa-week-12">Lassa fever SitRep</a>
                <a href="/files/cholera-week-12.pdf">Cholera week 12</a>
                <a href="/about">About</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &[], "unused");
    config.sources.clear();
    config.sitreps.enabled = true;
    config.sitreps.url = format!("{}/diseases/sitreps", mock_server.uri());

    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    let documents = &coordinator.result().documents;
    assert_eq!(documents.len(), 2);
    assert!(documents
        .iter()
        .all(|d| d.kind == DocumentKind::DiseaseReport));
    assert_eq!(documents[0].title, "Lassa fever SitRep");
    assert!(coordinator.result().visited.is_empty());
    assert_eq!(coordinator.context().requests(), 1);
    assert_eq!(coordinator.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_failed_sitrep_pass_does_not_abort_run() {
    let mock_server = MockServer::start().await;

    let mut config = create_test_config(&mock_server.uri(), &[], "unused");
    config.sources.clear();
    config.sitreps.enabled = true;
    config.sitreps.url = "ftp://ncdc.gov.ng/sitreps".to_string();

    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    assert!(coordinator.result().documents.is_empty());
    assert_eq!(coordinator.phase(), RunPhase::Done);
}

#[tokio::test]
async fn test_failed_source_does_not_abort_run() {
    let mock_server = MockServer::start().await;
    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(PLAIN_PAGE))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &["/"], "unused");
    config
        .sources
        .insert(0, test_source("ftp://broken.example", &["/"]));

    let mut coordinator = new_coordinator(config);
    coordinator.run().await.unwrap();

    let tally = coordinator.tally();
    assert_eq!(tally.sources_total, 2);
    assert_eq!(tally.sources_failed, 1);
    assert_eq!(tally.pages_scraped, 1);
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("file");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut config = Config::default();
    config.sources.clear();
    config.sitreps.enabled = false;
    config.output.directory = blocker.to_str().unwrap().to_string();

    let err = run_harvest(config, "x").await.unwrap_err();
    assert!(matches!(err, HarvestError::Output(_)));
}
