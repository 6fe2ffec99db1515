use anyhow::Result;

use crate::config::Config;
use crate::models::SourceType;

/// One row of `jobhunt sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub name: &'static str,
    pub kind: &'static str,
    pub endpoint: String,
    pub enabled: bool,
}

/// Every built-in source with its configured endpoint, enabled or not.
pub fn get_sources(config: &Config) -> Vec<SourceStatus> {
    vec![
        SourceStatus {
            name: "github",
            kind: SourceType::Aggregator.as_str(),
            endpoint: config.sources.github.base_url.clone(),
            enabled: config.sources.github.enabled,
        },
        SourceStatus {
            name: "microsoft",
            kind: SourceType::CompanyPortal.as_str(),
            endpoint: config.sources.microsoft.base_url.clone(),
            enabled: config.sources.microsoft.enabled,
        },
    ]
}

pub fn list_sources(config: &Config) -> Result<()> {
    println!("{:<12} {:<16} {:<9} ENDPOINT", "SOURCE", "TYPE", "ENABLED");
    for source in get_sources(config) {
        println!(
            "{:<12} {:<16} {:<9} {}",
            source.name,
            source.kind,
            if source.enabled { "yes" } else { "no" },
            source.endpoint
        );
    }
    Ok(())
}
