//! Application lifecycle tracking: applications, interviews, and offers.
//!
//! ```text
//! applied ─┬─► reviewing ─┬─► interview ──► offer
//!          │              │
//!          └──────────────┴─► rejected / withdrawn
//! ```
//!
//! Recording an interview moves an `applied` or `reviewing` application to
//! `interview`; recording an offer moves it to `offer`. Any status can also
//! be set explicitly with [`set_status`].

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::config::Config;
use crate::db;
use crate::jobs::{self, truncate};
use crate::models::{
    Application, ApplicationStatus, Interview, InterviewResult, InterviewType, Job, Offer,
    OfferDecision,
};
use crate::profile;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("job not found: {0}")]
    JobNotFound(i64),

    #[error("already applied to job {job_id} (application {application_id})")]
    AlreadyApplied { job_id: i64, application_id: i64 },

    #[error("application not found: {0}")]
    ApplicationNotFound(i64),

    #[error("offer not found: {0}")]
    OfferNotFound(i64),

    #[error("offer {offer_id} was already {decision}")]
    OfferDecided {
        offer_id: i64,
        decision: OfferDecision,
    },
}

#[derive(Debug, Clone, Default)]
pub struct NewInterview {
    pub scheduled_at: i64,
    pub interview_type: Option<InterviewType>,
    pub interviewer_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewOffer {
    pub salary: Option<f64>,
    pub benefits: Vec<String>,
    /// `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub expires_at: Option<String>,
    pub notes: Option<String>,
}

/// An application with the headline fields of its job.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: Application,
    pub job: Option<Job>,
    pub interviews: Vec<Interview>,
    pub offers: Vec<Offer>,
}

// ═══════════════════════════════════════════════════════════════════════
// Row mapping
// ═══════════════════════════════════════════════════════════════════════

const APPLICATION_COLUMNS: &str = "a.id AS id, a.user_id AS user_id, a.job_id AS job_id, \
     a.status AS status, a.applied_at AS applied_at, a.method AS method, a.notes AS notes, \
     a.updated_at AS updated_at";

fn application_from_row(row: &SqliteRow) -> Result<Application> {
    let status: String = row.get("status");
    Ok(Application {
        id: row.get("id"),
        user_id: row.get("user_id"),
        job_id: row.get("job_id"),
        status: status.parse()?,
        applied_at: row.get("applied_at"),
        method: row.get("method"),
        notes: row.get("notes"),
        updated_at: row.get("updated_at"),
    })
}

fn interview_from_row(row: &SqliteRow) -> Result<Interview> {
    let interview_type: Option<String> = row.get("interview_type");
    let result: String = row.get("result");
    Ok(Interview {
        id: row.get("id"),
        application_id: row.get("application_id"),
        scheduled_at: row.get("scheduled_at"),
        interview_type: interview_type
            .map(|t| t.parse::<InterviewType>())
            .transpose()?,
        interviewer_name: row.get("interviewer_name"),
        notes: row.get("notes"),
        result: result.parse()?,
    })
}

fn offer_from_row(row: &SqliteRow) -> Result<Offer> {
    let benefits: String = row.get("benefits_json");
    let decision: String = row.get("decision");
    Ok(Offer {
        id: row.get("id"),
        application_id: row.get("application_id"),
        salary: row.get("salary"),
        benefits: serde_json::from_str(&benefits).unwrap_or_default(),
        start_date: row.get("start_date"),
        expires_at: row.get("expires_at"),
        decision: decision.parse()?,
        notes: row.get("notes"),
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════════════════

/// Record an application by `user_id` to `job_id` with status `applied`.
pub async fn apply(
    pool: &SqlitePool,
    user_id: i64,
    job_id: i64,
    method: Option<&str>,
    notes: Option<&str>,
) -> Result<Application> {
    if profile::get_user(pool, user_id).await?.is_none() {
        return Err(TrackerError::UserNotFound(user_id).into());
    }
    if jobs::get_job(pool, job_id).await?.is_none() {
        return Err(TrackerError::JobNotFound(job_id).into());
    }

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM applications WHERE user_id = ? AND job_id = ?")
            .bind(user_id)
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
    if let Some(application_id) = existing {
        return Err(TrackerError::AlreadyApplied {
            job_id,
            application_id,
        }
        .into());
    }

    let now = db::now();
    let result = sqlx::query(
        r#"
        INSERT INTO applications (user_id, job_id, status, applied_at, method, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(job_id)
    .bind(ApplicationStatus::Applied.as_str())
    .bind(now)
    .bind(method)
    .bind(notes)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_application(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| TrackerError::ApplicationNotFound(result.last_insert_rowid()).into())
}

pub async fn get_application(pool: &SqlitePool, id: i64) -> Result<Option<Application>> {
    let row = sqlx::query(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(application_from_row).transpose()
}

async fn require_application(pool: &SqlitePool, id: i64) -> Result<Application> {
    get_application(pool, id)
        .await?
        .ok_or_else(|| TrackerError::ApplicationNotFound(id).into())
}

/// Set the status of an application. `notes`, when given, are appended to
/// the existing notes.
pub async fn set_status(
    pool: &SqlitePool,
    application_id: i64,
    status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<Application> {
    let current = require_application(pool, application_id).await?;
    let notes = append_note(current.notes.as_deref(), notes);

    sqlx::query("UPDATE applications SET status = ?, notes = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(&notes)
        .bind(db::now())
        .bind(application_id)
        .execute(pool)
        .await?;

    log::info!(
        "application {}: {} -> {}",
        application_id,
        current.status,
        status
    );
    require_application(pool, application_id).await
}

fn append_note(existing: Option<&str>, note: Option<&str>) -> Option<String> {
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    match (existing.filter(|e| !e.is_empty()), note) {
        (Some(existing), Some(note)) => Some(format!("{}\n{}", existing, note)),
        (None, Some(note)) => Some(note.to_string()),
        (existing, None) => existing.map(str::to_string),
    }
}

/// Record an interview and advance the application to `interview`.
pub async fn add_interview(
    pool: &SqlitePool,
    application_id: i64,
    interview: &NewInterview,
) -> Result<Interview> {
    let application = require_application(pool, application_id).await?;

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO interviews (application_id, scheduled_at, interview_type, interviewer_name, notes, result)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(application_id)
    .bind(interview.scheduled_at)
    .bind(interview.interview_type.map(|t| t.as_str()))
    .bind(&interview.interviewer_name)
    .bind(&interview.notes)
    .bind(InterviewResult::Pending.as_str())
    .execute(&mut *tx)
    .await?;
    let interview_id = result.last_insert_rowid();

    if matches!(
        application.status,
        ApplicationStatus::Applied | ApplicationStatus::Reviewing
    ) {
        sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(ApplicationStatus::Interview.as_str())
            .bind(db::now())
            .bind(application_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let row = sqlx::query("SELECT * FROM interviews WHERE id = ?")
        .bind(interview_id)
        .fetch_one(pool)
        .await?;
    interview_from_row(&row)
}

/// Record an offer and move the application to `offer`.
pub async fn add_offer(pool: &SqlitePool, application_id: i64, offer: &NewOffer) -> Result<Offer> {
    require_application(pool, application_id).await?;

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO offers (application_id, salary, benefits_json, start_date, expires_at, decision, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(application_id)
    .bind(offer.salary)
    .bind(serde_json::to_string(&offer.benefits)?)
    .bind(&offer.start_date)
    .bind(&offer.expires_at)
    .bind(OfferDecision::Pending.as_str())
    .bind(&offer.notes)
    .execute(&mut *tx)
    .await?;
    let offer_id = result.last_insert_rowid();

    sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
        .bind(ApplicationStatus::Offer.as_str())
        .bind(db::now())
        .bind(application_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    get_offer(pool, offer_id)
        .await?
        .ok_or_else(|| TrackerError::OfferNotFound(offer_id).into())
}

pub async fn get_offer(pool: &SqlitePool, offer_id: i64) -> Result<Option<Offer>> {
    let row = sqlx::query("SELECT * FROM offers WHERE id = ?")
        .bind(offer_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(offer_from_row).transpose()
}

/// Accept or reject a pending offer.
pub async fn decide_offer(pool: &SqlitePool, offer_id: i64, accept: bool) -> Result<Offer> {
    let offer = get_offer(pool, offer_id)
        .await?
        .ok_or(TrackerError::OfferNotFound(offer_id))?;
    if offer.decision != OfferDecision::Pending {
        return Err(TrackerError::OfferDecided {
            offer_id,
            decision: offer.decision,
        }
        .into());
    }

    let decision = if accept {
        OfferDecision::Accepted
    } else {
        OfferDecision::Rejected
    };
    sqlx::query("UPDATE offers SET decision = ? WHERE id = ?")
        .bind(decision.as_str())
        .bind(offer_id)
        .execute(pool)
        .await?;

    Ok(Offer { decision, ..offer })
}

/// Applications, most recently updated first.
pub async fn list_applications(
    pool: &SqlitePool,
    user_id: Option<i64>,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationSummary>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {APPLICATION_COLUMNS}, j.title AS job_title, j.company AS company
        FROM applications a
        LEFT JOIN jobs j ON j.id = a.job_id
        WHERE (?1 IS NULL OR a.user_id = ?1)
          AND (?2 IS NULL OR a.status = ?2)
        ORDER BY a.updated_at DESC, a.id DESC
        "#
    ))
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<ApplicationSummary> {
            Ok(ApplicationSummary {
                application: application_from_row(row)?,
                job_title: row.get("job_title"),
                company: row.get("company"),
            })
        })
        .collect()
}

/// An application with its job, interviews, and offers.
pub async fn application_detail(pool: &SqlitePool, id: i64) -> Result<ApplicationDetail> {
    let application = require_application(pool, id).await?;
    let job = jobs::get_job(pool, application.job_id).await?;

    let interviews = sqlx::query(
        "SELECT * FROM interviews WHERE application_id = ? ORDER BY scheduled_at ASC, id ASC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .iter()
    .map(interview_from_row)
    .collect::<Result<Vec<_>>>()?;

    let offers = sqlx::query("SELECT * FROM offers WHERE application_id = ? ORDER BY id ASC")
        .bind(id)
        .fetch_all(pool)
        .await?
        .iter()
        .map(offer_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(ApplicationDetail {
        application,
        job,
        interviews,
        offers,
    })
}

/// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM` (UTC) as unix seconds.
pub fn parse_when(input: &str) -> Result<i64> {
    let input = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M") {
        return Ok(dt.and_utc().timestamp());
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD[THH:MM]", input))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

/// Validate a `YYYY-MM-DD` date and return it normalized.
pub fn parse_date(input: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD", input))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// CLI entry points
// ═══════════════════════════════════════════════════════════════════════

pub async fn run_apply(
    config: &Config,
    job_id: i64,
    user_id: Option<i64>,
    method: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let user = profile::resolve_user(&pool, user_id).await?;
    let application = apply(&pool, user.id, job_id, method, notes).await?;
    pool.close().await;

    println!(
        "applied: application {} (user {}, job {})",
        application.id, application.user_id, application.job_id
    );
    Ok(())
}

pub async fn run_list(
    config: &Config,
    user_id: Option<i64>,
    status: Option<ApplicationStatus>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let applications = list_applications(&pool, user_id, status).await?;
    pool.close().await;

    if applications.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10} {:<10} {:<36} COMPANY",
        "ID", "STATUS", "APPLIED", "JOB"
    );
    for summary in &applications {
        let app = &summary.application;
        println!(
            "{:>5}  {:<10} {:<10} {:<36} {}",
            app.id,
            app.status,
            db::format_date(app.applied_at),
            truncate(summary.job_title.as_deref().unwrap_or("(untitled)"), 36),
            summary.company.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

pub async fn run_show(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let detail = application_detail(&pool, id).await?;
    pool.close().await;

    let app = &detail.application;
    println!("--- Application ---");
    println!("id:        {}", app.id);
    println!("status:    {}", app.status);
    println!("applied:   {}", db::format_ts_iso(app.applied_at));
    println!("updated:   {}", db::format_ts_iso(app.updated_at));
    if let Some(ref method) = app.method {
        println!("method:    {}", method);
    }
    if let Some(ref job) = detail.job {
        println!(
            "job:       {} - {} @ {}",
            job.id,
            job.title.as_deref().unwrap_or("(untitled)"),
            job.company.as_deref().unwrap_or("-")
        );
    }
    if let Some(ref notes) = app.notes {
        println!("notes:     {}", notes.replace('\n', "\n           "));
    }

    if !detail.interviews.is_empty() {
        println!();
        println!("Interviews:");
        for interview in &detail.interviews {
            println!(
                "  #{} {} {} with {} [{}]",
                interview.id,
                db::format_ts_iso(interview.scheduled_at),
                interview
                    .interview_type
                    .map(|t| t.as_str())
                    .unwrap_or("interview"),
                interview.interviewer_name.as_deref().unwrap_or("?"),
                interview.result
            );
        }
    }

    if !detail.offers.is_empty() {
        println!();
        println!("Offers:");
        for offer in &detail.offers {
            println!(
                "  #{} {} [{}]{}",
                offer.id,
                offer
                    .salary
                    .map(profile::format_money)
                    .unwrap_or_else(|| "salary n/a".to_string()),
                offer.decision,
                offer
                    .expires_at
                    .as_deref()
                    .map(|d| format!(" expires {}", d))
                    .unwrap_or_default()
            );
            if !offer.benefits.is_empty() {
                println!("     benefits: {}", offer.benefits.join(", "));
            }
        }
    }
    Ok(())
}

pub async fn run_status(
    config: &Config,
    id: i64,
    status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let application = set_status(&pool, id, status, notes).await?;
    pool.close().await;
    println!("application {}: {}", application.id, application.status);
    Ok(())
}

pub async fn run_add_interview(
    config: &Config,
    application_id: i64,
    interview: &NewInterview,
) -> Result<()> {
    let pool = db::connect(config).await?;
    let interview = add_interview(&pool, application_id, interview).await?;
    let application = require_application(&pool, application_id).await?;
    pool.close().await;
    println!(
        "interview {} scheduled for {} (application {} is now {})",
        interview.id,
        db::format_ts_iso(interview.scheduled_at),
        application.id,
        application.status
    );
    Ok(())
}

pub async fn run_add_offer(config: &Config, application_id: i64, offer: &NewOffer) -> Result<()> {
    let pool = db::connect(config).await?;
    let offer = add_offer(&pool, application_id, offer).await?;
    pool.close().await;
    println!(
        "offer {} recorded for application {}",
        offer.id, offer.application_id
    );
    Ok(())
}

pub async fn run_decide_offer(config: &Config, offer_id: i64, accept: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let offer = decide_offer(&pool, offer_id, accept).await?;
    pool.close().await;
    println!("offer {}: {}", offer.id, offer.decision);
    Ok(())
}
