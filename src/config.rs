use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "./config/jobhunt.toml";
pub const DEFAULT_DB_PATH: &str = "./data/jobs.db";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_pages() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) jobhunt".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub github: GithubSourceConfig,
    #[serde(default)]
    pub microsoft: MicrosoftSourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubSourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_github_url")]
    pub base_url: String,
}

impl Default for GithubSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_github_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MicrosoftSourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_microsoft_url")]
    pub base_url: String,
    #[serde(default = "default_microsoft_careers_url")]
    pub careers_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for MicrosoftSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_microsoft_url(),
            careers_url: default_microsoft_careers_url(),
            page_size: default_page_size(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_github_url() -> String {
    "https://jobs.github.com/positions.json".to_string()
}
fn default_microsoft_url() -> String {
    "https://gcsservices.careers.microsoft.com/search/api/v1/search".to_string()
}
fn default_microsoft_careers_url() -> String {
    "https://careers.microsoft.com/us/en".to_string()
}
fn default_page_size() -> u32 {
    20
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig::default(),
            scrape: ScrapeConfig::default(),
            sources: SourcesConfig::default(),
        }
    }

    /// Point the database at `DATABASE_URL` when it is set.
    /// Accepts a bare path or a `sqlite:` URL.
    pub fn apply_database_url(&mut self, url: Option<&str>) {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return;
        };
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        self.db.path = PathBuf::from(path);
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Resolve the effective config for a CLI invocation.
///
/// An explicitly requested file must exist; the default path may be absent,
/// in which case [`Config::minimal`] is used. `DATABASE_URL` is applied last.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)?
            } else {
                log::debug!("no config at {}, using defaults", default.display());
                Config::minimal()
            }
        }
    };
    config.apply_database_url(std::env::var("DATABASE_URL").ok().as_deref());
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.scrape.max_pages == 0 {
        anyhow::bail!("scrape.max_pages must be >= 1");
    }
    if config.scrape.timeout_secs == 0 {
        anyhow::bail!("scrape.timeout_secs must be >= 1");
    }

    if config.sources.github.base_url.trim().is_empty() {
        anyhow::bail!("sources.github.base_url must not be empty");
    }

    let microsoft = &config.sources.microsoft;
    if microsoft.base_url.trim().is_empty() {
        anyhow::bail!("sources.microsoft.base_url must not be empty");
    }
    if microsoft.careers_url.trim().is_empty() {
        anyhow::bail!("sources.microsoft.careers_url must not be empty");
    }
    if microsoft.page_size == 0 {
        anyhow::bail!("sources.microsoft.page_size must be >= 1");
    }

    Ok(())
}
