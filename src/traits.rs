//! Job source extension point.
//!
//! A [`JobSource`] knows how to page through one external job board and
//! turn its raw JSON records into [`JobPosting`]s. The ingest pipeline
//! ([`crate::ingest::scrape`]) drives any source the same way:
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │          SourceRegistry          │
//! │  ┌────────┐ ┌─────────┐ ┌──────┐ │
//! │  │ github │ │microsoft│ │custom│ │
//! │  └────────┘ └─────────┘ └──────┘ │
//! └───────────────┬──────────────────┘
//!                 ▼
//!   fetch_raw → parse_raw → dedup → jobs table
//! ```
//!
//! Custom sources (for tests, or boards not built in) are added with
//! [`SourceRegistry::register`].

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::models::{JobPosting, SourceType};

/// One page request against a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
    /// Zero-based page number.
    pub page: u32,
}

/// An external job board.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Value stored in `jobs.source`, e.g. `"github"`.
    fn source_name(&self) -> &str;

    fn source_type(&self) -> SourceType;

    /// Endpoint shown by `jobhunt sources`.
    fn endpoint(&self) -> &str;

    /// Whether a page with `fetched` raw items is the last one.
    fn is_last_page(&self, fetched: usize) -> bool {
        fetched == 0
    }

    /// Fetch one page of raw records.
    async fn fetch_raw(&self, query: &ScrapeQuery) -> Result<Vec<Value>>;

    /// Normalize one raw record. Errors are logged and the record skipped.
    fn parse_raw(&self, raw: &Value) -> Result<JobPosting>;
}

/// The set of sources a scrape can run against.
#[derive(Default)]
pub struct SourceRegistry {
    sources: Vec<Box<dyn JobSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in source enabled in `config`.
    pub fn builtin(config: &Config) -> Result<Self> {
        use crate::source_github::GithubSource;
        use crate::source_microsoft::MicrosoftSource;

        let mut registry = Self::new();
        if config.sources.github.enabled {
            registry.register(Box::new(GithubSource::new(config)?));
        }
        if config.sources.microsoft.enabled {
            registry.register(Box::new(MicrosoftSource::new(config)?));
        }
        Ok(registry)
    }

    pub fn register(&mut self, source: Box<dyn JobSource>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Box<dyn JobSource>] {
        &self.sources
    }

    pub fn get(&self, name: &str) -> Option<&dyn JobSource> {
        self.sources
            .iter()
            .find(|s| s.source_name() == name)
            .map(|s| s.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.source_name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Build an HTTP client with the scrape timeout and user agent.
pub(crate) fn http_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.scrape.timeout_secs))
        .user_agent(config.scrape.user_agent.clone())
        .build()?;
    Ok(client)
}

/// String field of a raw record. Numbers are rendered as text so numeric
/// ids survive.
pub(crate) fn str_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
