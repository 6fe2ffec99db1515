//! Job ingestion pipeline.
//!
//! Coordinates the scrape flow: source page fetch → record normalization →
//! dedup on `(source, source_job_id)` → storage. Records that fail to parse
//! are logged and skipped; a fetch failure ends paging for that keyword.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use std::ops::AddAssign;

use crate::config::Config;
use crate::db;
use crate::models::JobPosting;
use crate::progress::{ProgressMode, ScrapeProgressEvent, ScrapeProgressReporter};
use crate::traits::{JobSource, ScrapeQuery, SourceRegistry};

/// Counters for one or more scraped pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    /// Raw records returned by the source.
    pub fetched: u64,
    /// Records that could not be normalized.
    pub parse_failures: u64,
    /// New rows written to `jobs`.
    pub inserted: u64,
    /// Records already stored, or repeated within the batch.
    pub duplicates: u64,
}

impl AddAssign for ScrapeStats {
    fn add_assign(&mut self, other: Self) {
        self.fetched += other.fetched;
        self.parse_failures += other.parse_failures;
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
    }
}

/// Fetch and normalize one page without touching the database.
pub async fn collect(
    source: &dyn JobSource,
    query: &ScrapeQuery,
) -> Result<(Vec<JobPosting>, ScrapeStats)> {
    let raw = source.fetch_raw(query).await?;
    let mut stats = ScrapeStats {
        fetched: raw.len() as u64,
        ..Default::default()
    };

    let mut postings = Vec::with_capacity(raw.len());
    for item in &raw {
        match source.parse_raw(item) {
            Ok(posting) => postings.push(posting),
            Err(e) => {
                log::warn!("skipping unparseable {} record: {:#}", source.source_name(), e);
                stats.parse_failures += 1;
            }
        }
    }
    Ok((postings, stats))
}

/// Fetch one page from `source` and store the postings not seen before.
pub async fn scrape(
    pool: &SqlitePool,
    source: &dyn JobSource,
    query: &ScrapeQuery,
    progress: &dyn ScrapeProgressReporter,
) -> Result<ScrapeStats> {
    let keyword = query.keyword.clone().unwrap_or_default();
    progress.report(ScrapeProgressEvent::Fetching {
        source: source.source_name().to_string(),
        keyword: keyword.clone(),
        page: query.page,
    });

    let (postings, mut stats) = collect(source, query).await?;
    let (inserted, duplicates) = store_postings(pool, &postings).await?;
    stats.inserted = inserted;
    stats.duplicates = duplicates;

    progress.report(ScrapeProgressEvent::Stored {
        source: source.source_name().to_string(),
        keyword,
        page: query.page,
        fetched: stats.fetched,
        inserted,
    });
    Ok(stats)
}

/// Insert postings in one transaction. Returns `(inserted, duplicates)`.
pub async fn store_postings(pool: &SqlitePool, postings: &[JobPosting]) -> Result<(u64, u64)> {
    let scraped_at = db::now();
    let mut inserted = 0u64;
    let mut duplicates = 0u64;

    let mut tx = pool.begin().await?;
    for posting in postings {
        let requirements = serde_json::to_string(&posting.requirements.clone().unwrap_or_default())?;
        let nice_to_haves =
            serde_json::to_string(&posting.nice_to_haves.clone().unwrap_or_default())?;

        let result = sqlx::query(
            r#"
            INSERT INTO jobs (source, source_job_id, title, company, department, location, remote,
                              salary_min, salary_max, description, requirements_json, nice_to_haves_json,
                              apply_url, posted_at, scraped_at, company_industry, company_size, source_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source, source_job_id) DO NOTHING
            "#,
        )
        .bind(&posting.source)
        .bind(&posting.source_job_id)
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.department)
        .bind(&posting.location)
        .bind(posting.remote.map(|r| r.as_str()))
        .bind(posting.salary_min)
        .bind(posting.salary_max)
        .bind(&posting.description)
        .bind(&requirements)
        .bind(&nice_to_haves)
        .bind(&posting.apply_url)
        .bind(posting.posted_at)
        .bind(scraped_at)
        .bind(&posting.company_industry)
        .bind(&posting.company_size)
        .bind(posting.source_type.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 1 {
            inserted += 1;
        } else {
            log::debug!(
                "job {}:{} already stored",
                posting.source,
                posting.source_job_id
            );
            duplicates += 1;
        }
    }
    tx.commit().await?;

    Ok((inserted, duplicates))
}

/// Page through `source` for each keyword, up to `max_pages` per keyword.
///
/// Paging for a keyword stops at the source's last-page rule or at the
/// first fetch error, which is logged.
pub async fn scrape_keywords(
    pool: &SqlitePool,
    source: &dyn JobSource,
    keywords: &[String],
    location: Option<&str>,
    max_pages: u32,
    progress: &dyn ScrapeProgressReporter,
) -> Result<ScrapeStats> {
    let mut total = ScrapeStats::default();

    for keyword in keywords {
        for page in 0..max_pages {
            let query = ScrapeQuery {
                keyword: Some(keyword.clone()),
                location: location.map(str::to_string),
                page,
            };
            match scrape(pool, source, &query, progress).await {
                Ok(stats) => {
                    total += stats;
                    if source.is_last_page(stats.fetched as usize) {
                        break;
                    }
                }
                Err(e) => {
                    log::error!(
                        "error scraping {} page {} for '{}': {:#}",
                        source.source_name(),
                        page,
                        keyword,
                        e
                    );
                    break;
                }
            }
        }
    }
    Ok(total)
}

/// CLI entry point for `jobhunt scrape`.
pub async fn run_scrape(
    config: &Config,
    source: &str,
    keywords: &[String],
    location: Option<&str>,
    max_pages: Option<u32>,
    dry_run: bool,
    progress_mode: ProgressMode,
) -> Result<()> {
    if keywords.is_empty() {
        bail!("at least one --keyword is required");
    }
    let max_pages = max_pages.unwrap_or(config.scrape.max_pages);
    if max_pages == 0 {
        bail!("--max-pages must be >= 1");
    }

    let registry = SourceRegistry::builtin(config)?;
    let selected: Vec<&dyn JobSource> = if source == "all" {
        registry.sources().iter().map(|s| s.as_ref()).collect()
    } else {
        match registry.get(source) {
            Some(s) => vec![s],
            None => bail!(
                "Unknown or disabled source: '{}'. Available: {}",
                source,
                registry.names().join(", ")
            ),
        }
    };
    if selected.is_empty() {
        bail!("No job sources are enabled");
    }

    if dry_run {
        for source in &selected {
            let query = ScrapeQuery {
                keyword: keywords.first().cloned(),
                location: location.map(str::to_string),
                page: 0,
            };
            let (postings, stats) = collect(*source, &query).await?;
            println!("scrape {} (dry-run)", source.source_name());
            println!("  fetched: {}", stats.fetched);
            println!("  parsed: {}", postings.len());
            for posting in postings.iter().take(10) {
                println!(
                    "  - [{}] {} @ {}",
                    posting.source_job_id,
                    posting.title.as_deref().unwrap_or("(untitled)"),
                    posting.company.as_deref().unwrap_or("-")
                );
            }
        }
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let reporter = progress_mode.reporter();

    for source in selected {
        let stats = scrape_keywords(
            &pool,
            source,
            keywords,
            location,
            max_pages,
            reporter.as_ref(),
        )
        .await?;

        println!("scrape {}", source.source_name());
        println!("  keywords: {}", keywords.join(", "));
        println!("  fetched: {}", stats.fetched);
        println!("  new jobs: {}", stats.inserted);
        println!("  already known: {}", stats.duplicates);
        if stats.parse_failures > 0 {
            println!("  unparseable: {}", stats.parse_failures);
        }
    }
    println!("ok");

    pool.close().await;
    Ok(())
}
