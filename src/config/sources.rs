//! Built-in target sites used when no configuration file is given

use crate::config::types::{Source, SourceCategory};

fn source(
    key: &str,
    name: &str,
    base_url: &str,
    pages: &[&str],
    category: SourceCategory,
) -> Source {
    Source {
        key: key.to_string(),
        name: name.to_string(),
        base_url: base_url.to_string(),
        pages: pages.iter().map(|p| p.to_string()).collect(),
        category,
    }
}

/// Returns the public health sources in crawl order
pub fn default_sources() -> Vec<Source> {
    vec![
        source(
            "fmoh",
            "Federal Ministry of Health Nigeria",
            "https://www.health.gov.ng",
            &[
                "/index.php/resources/publications",
                "/index.php/resources/guidelines",
                "/index.php/resources/health-facility-registry",
            ],
            SourceCategory::Guidelines,
        ),
        source(
            "nphcda",
            "National Primary Health Care Development Agency",
            "https://nphcda.gov.ng",
            &["/resources/", "/publications/", "/guidelines/"],
            SourceCategory::Guidelines,
        ),
        source(
            "ncdc",
            "Nigeria Centre for Disease Control",
            "https://ncdc.gov.ng",
            &["/diseases/info", "/reports", "/publications"],
            SourceCategory::DiseaseData,
        ),
        source(
            "who_nigeria",
            "WHO Nigeria",
            "https://www.afro.who.int/countries/nigeria",
            &["/publications", "/news"],
            SourceCategory::Reports,
        ),
        source(
            "unicef_nigeria",
            "UNICEF Nigeria",
            "https://www.unicef.org/nigeria",
            &["/reports", "/press-releases", "/what-we-do/health"],
            SourceCategory::Reports,
        ),
    ]
}
