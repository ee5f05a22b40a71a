use crate::config::types::{
    Config, ExtractionConfig, FetchConfig, OutputConfig, SitrepConfig, Source, UserAgentConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_extraction_config(&config.extraction)?;
    validate_sitrep_config(&config.sitreps)?;
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates pacing and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.context_chars == 0 || config.summary_chars == 0 {
        return Err(ConfigError::Validation(
            "context_chars and summary_chars must be > 0".to_string(),
        ));
    }

    if config.document_suffixes.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "document_suffixes cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_sitrep_config(config: &SitrepConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    validate_http_url(&config.url, "sitreps url")?;

    Ok(())
}

/// Validates source entries: unique keys, http(s) base URLs, at least one page
fn validate_sources(sources: &[Source]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for source in sources {
        if source.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source key cannot be empty".to_string(),
            ));
        }

        if !seen.insert(source.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source key '{}'",
                source.key
            )));
        }

        validate_http_url(&source.base_url, &format!("base-url of '{}'", source.key))?;

        if source.pages.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Source '{}' must have at least one page",
                source.key
            )));
        }
    }

    Ok(())
}

fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceCategory;

    fn source(key: &str, base_url: &str) -> Source {
        Source {
            key: key.to_string(),
            name: key.to_uppercase(),
            base_url: base_url.to_string(),
            pages: vec!["/".to_string()],
            category: SourceCategory::Reports,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_crawler_name_rejects_spaces() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "Research Bot".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_source_keys_rejected() {
        let sources = vec![
            source("ncdc", "https://ncdc.gov.ng"),
            source("ncdc", "https://ncdc.gov.ng/other"),
        ];
        assert!(validate_sources(&sources).is_err());
    }

    #[test]
    fn test_source_requires_http_base_url() {
        assert!(validate_sources(&[source("a", "ftp://a.example.org")]).is_err());
        assert!(validate_sources(&[source("a", "not a url")]).is_err());
        assert!(validate_sources(&[source("a", "http://127.0.0.1:8080")]).is_ok());
    }

    #[test]
    fn test_source_requires_pages() {
        let mut entry = source("a", "https://a.example.org");
        entry.pages.clear();
        assert!(validate_sources(&[entry]).is_err());
    }

    #[test]
    fn test_disabled_sitreps_skip_url_check() {
        let mut config = Config::default();
        config.sitreps.url = "nonsense".to_string();
        assert!(validate(&config).is_err());

        config.sitreps.enabled = false;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let mut config = Config::default();
        config.extraction.summary_chars = 0;
        assert!(validate(&config).is_err());
    }
}
