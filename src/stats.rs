//! Database statistics for `jobhunt stats`.
//!
//! Summarizes profiles, stored jobs per source (with the time of the last
//! scrape), the application funnel by status, and offers awaiting a
//! decision.

use anyhow::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::models::ApplicationStatus;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceStats {
    pub source: String,
    pub job_count: i64,
    pub last_scraped_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrackerStats {
    pub users: i64,
    pub jobs: i64,
    pub by_source: Vec<SourceStats>,
    /// Every status in lifecycle order, including zero counts.
    pub applications_by_status: Vec<(ApplicationStatus, i64)>,
    pub interviews: i64,
    pub pending_offers: i64,
}

impl TrackerStats {
    pub fn applications(&self) -> i64 {
        self.applications_by_status.iter().map(|(_, n)| n).sum()
    }
}

pub async fn collect_stats(pool: &SqlitePool) -> Result<TrackerStats> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;
    let interviews: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interviews")
        .fetch_one(pool)
        .await?;
    let pending_offers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers WHERE decision = ?")
        .bind(crate::models::OfferDecision::Pending.as_str())
        .fetch_one(pool)
        .await?;

    let source_rows = sqlx::query(
        r#"
        SELECT source, COUNT(*) AS job_count, MAX(scraped_at) AS last_scraped_at
        FROM jobs
        GROUP BY source
        ORDER BY job_count DESC, source ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    let by_source = source_rows
        .iter()
        .map(|row| SourceStats {
            source: row.get("source"),
            job_count: row.get("job_count"),
            last_scraped_at: row.get("last_scraped_at"),
        })
        .collect();

    let status_rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM applications GROUP BY status")
            .fetch_all(pool)
            .await?;
    let applications_by_status = ApplicationStatus::ALL
        .iter()
        .map(|status| {
            let count = status_rows
                .iter()
                .find(|(s, _)| s == status.as_str())
                .map(|(_, n)| *n)
                .unwrap_or(0);
            (*status, count)
        })
        .collect();

    Ok(TrackerStats {
        users,
        jobs,
        by_source,
        applications_by_status,
        interviews,
        pending_offers,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stats = collect_stats(&pool).await?;
    pool.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Job Hunter Database Stats");
    println!("=========================");
    println!();
    println!("  Database:      {}", config.db.path.display());
    println!("  Size:          {}", format_bytes(db_size));
    println!();
    println!("  Profiles:      {}", stats.users);
    println!("  Jobs:          {}", stats.jobs);
    println!("  Applications:  {}", stats.applications());
    println!("  Interviews:    {}", stats.interviews);
    println!("  Open offers:   {}", stats.pending_offers);

    if !stats.by_source.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<16} {:>6}   {}", "SOURCE", "JOBS", "LAST SCRAPE");
        println!("  {}", "-".repeat(44));
        for s in &stats.by_source {
            let scraped = match s.last_scraped_at {
                Some(ts) => format_ts_relative(ts),
                None => "never".to_string(),
            };
            println!("  {:<16} {:>6}   {}", s.source, s.job_count, scraped);
        }
    }

    if stats.applications() > 0 {
        println!();
        println!("  Applications by status:");
        for (status, count) in &stats.applications_by_status {
            println!("  {:<16} {:>6}", status.as_str(), count);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    match bytes {
        b if b < 1024 => format!("{} B", b),
        b if (b as f64) < KB * KB => format!("{:.1} KB", b as f64 / KB),
        b => format!("{:.1} MB", b as f64 / (KB * KB)),
    }
}

/// "3 hours ago" for recent timestamps, a date beyond a month.
fn format_ts_relative(ts: i64) -> String {
    let delta = db::now() - ts;
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    match delta {
        d if d < 0 => db::format_date(ts),
        d if d < 60 => "just now".to_string(),
        d if d < 3600 => format!("{} min{} ago", d / 60, plural(d / 60)),
        d if d < 86_400 => format!("{} hour{} ago", d / 3600, plural(d / 3600)),
        d if d < 86_400 * 30 => format!("{} day{} ago", d / 86_400, plural(d / 86_400)),
        _ => db::format_date(ts),
    }
}
