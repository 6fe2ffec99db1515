//! Microsoft careers portal search API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::html;
use crate::models::{JobPosting, RemotePreference, SourceType};
use crate::traits::{http_client, str_field, JobSource, ScrapeQuery};

const REQUIREMENT_KEYWORDS: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "java",
    "c++",
    "csharp",
    "c#",
    "golang",
    "rust",
    "sql",
    "azure",
    "aws",
    "gcp",
    ".net",
    "asp.net",
    "react",
    "angular",
    "vue",
    "node",
    "express",
    "docker",
    "kubernetes",
    "git",
    "rest api",
    "graphql",
    "microservices",
    "agile",
    "scrum",
    "jira",
    "linux",
    "windows server",
    "postgresql",
    "sql server",
    "mongodb",
    "cosmosdb",
];

pub struct MicrosoftSource {
    base_url: String,
    careers_url: String,
    page_size: u32,
    user_agent: String,
    client: reqwest::Client,
}

impl MicrosoftSource {
    pub fn new(config: &Config) -> Result<Self> {
        let cfg = &config.sources.microsoft;
        Ok(Self {
            base_url: cfg.base_url.clone(),
            careers_url: cfg.careers_url.trim_end_matches('/').to_string(),
            page_size: cfg.page_size,
            user_agent: config.scrape.user_agent.clone(),
            client: http_client(config)?,
        })
    }
}

/// `description` and `additionalInfo` joined, markup removed.
fn combined_description(raw: &Value) -> Option<String> {
    let parts: Vec<String> = ["description", "additionalInfo"]
        .iter()
        .filter_map(|key| str_field(raw, key))
        .collect();
    if parts.is_empty() {
        return None;
    }
    let text = html::strip_tags(&parts.join(" "));
    (!text.is_empty()).then_some(text)
}

/// Jobs array of a search response; absent keys mean no jobs.
fn jobs_of(body: Value) -> Vec<Value> {
    match body
        .get("operationResult")
        .and_then(|r| r.get("result"))
        .and_then(|r| r.get("jobs"))
    {
        Some(Value::Array(jobs)) => jobs.clone(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl JobSource for MicrosoftSource {
    fn source_name(&self) -> &str {
        "microsoft"
    }

    fn source_type(&self) -> SourceType {
        SourceType::CompanyPortal
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn fetch_raw(&self, query: &ScrapeQuery) -> Result<Vec<Value>> {
        let mut params = vec![
            ("q", query.keyword.clone().unwrap_or_default()),
            ("p", query.page.to_string()),
            ("pagesize", self.page_size.to_string()),
        ];
        if let Some(location) = &query.location {
            params.push(("l", location.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .context("Failed to fetch Microsoft jobs")?
            .error_for_status()
            .context("Failed to fetch Microsoft jobs")?;

        let body: Value = response.json().await?;
        Ok(jobs_of(body))
    }

    fn parse_raw(&self, raw: &Value) -> Result<JobPosting> {
        let source_job_id = str_field(raw, "jobId")
            .ok_or_else(|| anyhow::anyhow!("Microsoft job without a jobId"))?;

        let description = combined_description(raw);
        let requirements = description
            .as_deref()
            .and_then(|d| html::match_keywords(d, REQUIREMENT_KEYWORDS));

        let location = str_field(raw, "location");
        let remote = location
            .as_deref()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| l == "remote" || l == "virtual")
            .map(|_| RemotePreference::Remote);

        Ok(JobPosting {
            source: self.source_name().to_string(),
            apply_url: Some(format!("{}/jobs/{}", self.careers_url, source_job_id)),
            source_job_id,
            title: str_field(raw, "title"),
            company: Some("Microsoft".to_string()),
            department: str_field(raw, "category"),
            location,
            remote,
            salary_min: None,
            salary_max: None,
            description,
            requirements,
            nice_to_haves: None,
            posted_at: html::posted_at_or_now(str_field(raw, "postingDate").as_deref()),
            company_industry: Some("Technology".to_string()),
            company_size: Some("Large Enterprise".to_string()),
            source_type: self.source_type(),
        })
    }
}
