//! Stored job listing and retrieval.
//!
//! Used by `jobhunt jobs list` / `jobhunt jobs show` and by the tracker to
//! resolve the job behind an application.

use anyhow::{bail, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::models::Job;

/// Filters for [`list_jobs`]. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub source: Option<String>,
    /// Case-insensitive substring of the company name.
    pub company: Option<String>,
    pub limit: Option<i64>,
}

const JOB_COLUMNS: &str = "id, source, source_job_id, title, company, department, location, remote, \
     salary_min, salary_max, description, requirements_json, apply_url, posted_at, scraped_at, source_type";

fn job_from_row(row: &SqliteRow) -> Job {
    let requirements_json: String = row.get("requirements_json");
    Job {
        id: row.get("id"),
        source: row.get("source"),
        source_job_id: row.get("source_job_id"),
        title: row.get("title"),
        company: row.get("company"),
        department: row.get("department"),
        location: row.get("location"),
        remote: row.get("remote"),
        salary_min: row.get("salary_min"),
        salary_max: row.get("salary_max"),
        description: row.get("description"),
        requirements: serde_json::from_str(&requirements_json).unwrap_or_default(),
        apply_url: row.get("apply_url"),
        posted_at: row.get("posted_at"),
        scraped_at: row.get("scraped_at"),
        source_type: row.get("source_type"),
    }
}

/// Jobs newest first (by posting date, then id).
pub async fn list_jobs(pool: &SqlitePool, filter: &JobFilter) -> Result<Vec<Job>> {
    let sql = format!(
        r#"
        SELECT {JOB_COLUMNS} FROM jobs
        WHERE (?1 IS NULL OR source = ?1)
          AND (?2 IS NULL OR LOWER(company) LIKE '%' || LOWER(?2) || '%')
        ORDER BY posted_at DESC, id DESC
        LIMIT ?3
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(&filter.source)
        .bind(&filter.company)
        .bind(filter.limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(job_from_row).collect())
}

pub async fn get_job(pool: &SqlitePool, id: i64) -> Result<Option<Job>> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(job_from_row))
}

/// CLI entry point for `jobhunt jobs list`.
pub async fn run_list(config: &Config, filter: &JobFilter) -> Result<()> {
    let pool = db::connect(config).await?;
    let jobs = list_jobs(&pool, filter).await?;
    pool.close().await;

    if jobs.is_empty() {
        println!("No jobs stored. Run `jobhunt scrape` first.");
        return Ok(());
    }

    for job in &jobs {
        println!(
            "{:>5}  {:<10} {:<40} {:<24} {}",
            job.id,
            job.source,
            truncate(job.title.as_deref().unwrap_or("(untitled)"), 40),
            truncate(job.company.as_deref().unwrap_or("-"), 24),
            job.location.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} job(s)", jobs.len());
    Ok(())
}

/// CLI entry point for `jobhunt jobs show`.
pub async fn run_show(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let job = get_job(&pool, id).await?;
    pool.close().await;

    let Some(job) = job else {
        bail!("job not found: {}", id);
    };

    println!("--- Job ---");
    println!("id:           {}", job.id);
    println!("title:        {}", job.title.as_deref().unwrap_or("(untitled)"));
    println!("company:      {}", job.company.as_deref().unwrap_or("-"));
    println!("source:       {} ({})", job.source, job.source_type);
    println!("source_id:    {}", job.source_job_id);
    if let Some(ref department) = job.department {
        println!("department:   {}", department);
    }
    if let Some(ref location) = job.location {
        println!("location:     {}", location);
    }
    if let Some(ref remote) = job.remote {
        println!("remote:       {}", remote);
    }
    if let Some(posted_at) = job.posted_at {
        println!("posted:       {}", db::format_date(posted_at));
    }
    if let Some(ref url) = job.apply_url {
        println!("apply:        {}", url);
    }
    if !job.requirements.is_empty() {
        println!("requirements: {}", job.requirements.join(", "));
    }
    if let Some(ref description) = job.description {
        println!("--- Description ---");
        println!("{}", description);
    }
    Ok(())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
