//! GitHub Jobs board (`positions.json` API).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::html;
use crate::models::{JobPosting, RemotePreference, SourceType};
use crate::traits::{http_client, str_field, JobSource, ScrapeQuery};

/// Results per page returned by the API.
pub const PAGE_SIZE: usize = 50;

const REQUIREMENT_KEYWORDS: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "java",
    "go",
    "rust",
    "c++",
    "csharp",
    "c#",
    "sql",
    "react",
    "vue",
    "angular",
    "node",
    "express",
    "django",
    "flask",
    "fastapi",
    "aws",
    "gcp",
    "azure",
    "docker",
    "kubernetes",
    "git",
    "linux",
    "postgresql",
    "mongodb",
    "redis",
    "elasticsearch",
    "graphql",
    "rest api",
    "microservices",
    "agile",
    "ci/cd",
    "jenkins",
    "terraform",
];

pub struct GithubSource {
    base_url: String,
    client: reqwest::Client,
}

impl GithubSource {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.sources.github.base_url.clone(),
            client: http_client(config)?,
        })
    }
}

#[async_trait]
impl JobSource for GithubSource {
    fn source_name(&self) -> &str {
        "github"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Aggregator
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn is_last_page(&self, fetched: usize) -> bool {
        fetched < PAGE_SIZE
    }

    async fn fetch_raw(&self, query: &ScrapeQuery) -> Result<Vec<Value>> {
        let mut params = vec![("page", query.page.to_string())];
        if let Some(keyword) = &query.keyword {
            params.push(("description", keyword.clone()));
        }
        if let Some(location) = &query.location {
            params.push(("location", location.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .context("Failed to fetch GitHub Jobs")?
            .error_for_status()
            .context("Failed to fetch GitHub Jobs")?;

        let body: Value = response.json().await?;
        match body {
            Value::Array(items) => Ok(items),
            other => anyhow::bail!("GitHub Jobs returned a non-array body: {}", other),
        }
    }

    fn parse_raw(&self, raw: &Value) -> Result<JobPosting> {
        let source_job_id =
            str_field(raw, "id").ok_or_else(|| anyhow::anyhow!("GitHub job without an id"))?;

        let description = str_field(raw, "description").map(|d| html::strip_tags(&d));
        let requirements = description
            .as_deref()
            .and_then(|d| html::match_keywords(d, REQUIREMENT_KEYWORDS));

        // The board only reports employment type; full-time listings are
        // treated as remote.
        let remote = (str_field(raw, "type").as_deref() == Some("Full Time"))
            .then_some(RemotePreference::Remote);

        Ok(JobPosting {
            source: self.source_name().to_string(),
            source_job_id,
            title: str_field(raw, "title"),
            company: str_field(raw, "company"),
            department: None,
            location: str_field(raw, "location"),
            remote,
            salary_min: None,
            salary_max: None,
            description,
            requirements,
            nice_to_haves: None,
            apply_url: str_field(raw, "url"),
            posted_at: html::posted_at_or_now(str_field(raw, "created_at").as_deref()),
            company_industry: None,
            company_size: None,
            source_type: self.source_type(),
        })
    }
}
