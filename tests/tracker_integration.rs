//! Integration tests for the library surface.
//!
//! A custom [`JobSource`] feeds the real ingest pipeline, then a profile is
//! built from a CV on disk and carried through the application lifecycle.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Mutex;
use tempfile::TempDir;

use job_hunter::config::Config;
use job_hunter::export::export_profile;
use job_hunter::ingest::{self, ScrapeStats};
use job_hunter::jobs::{self, JobFilter};
use job_hunter::models::{
    ApplicationStatus, InterviewType, JobPosting, OfferDecision, RemotePreference, SourceType,
};
use job_hunter::profile::{self, PreferencesUpdate, ProfileError};
use job_hunter::progress::{NoProgress, ScrapeProgressEvent, ScrapeProgressReporter};
use job_hunter::stats::collect_stats;
use job_hunter::tracker::{self, NewInterview, NewOffer, TrackerError};
use job_hunter::traits::{JobSource, ScrapeQuery, SourceRegistry};
use job_hunter::{db, migrate};

// ─── Test Source ────────────────────────────────────────────────────

/// Serves fixed pages of raw records; pages past the end are empty.
struct InMemorySource {
    pages: Vec<Vec<Value>>,
}

#[async_trait]
impl JobSource for InMemorySource {
    fn source_name(&self) -> &str {
        "inmemory"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Aggregator
    }

    fn endpoint(&self) -> &str {
        "memory://jobs"
    }

    async fn fetch_raw(&self, query: &ScrapeQuery) -> Result<Vec<Value>> {
        Ok(self
            .pages
            .get(query.page as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn parse_raw(&self, raw: &Value) -> Result<JobPosting> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("record without id"))?;
        Ok(JobPosting {
            source: self.source_name().to_string(),
            source_job_id: id.to_string(),
            title: raw.get("title").and_then(Value::as_str).map(str::to_string),
            company: raw.get("company").and_then(Value::as_str).map(str::to_string),
            department: None,
            location: Some("Remote".to_string()),
            remote: Some(RemotePreference::Remote),
            salary_min: None,
            salary_max: None,
            description: None,
            requirements: Some(vec!["rust".to_string()]),
            nice_to_haves: None,
            apply_url: None,
            posted_at: raw.get("posted_at").and_then(Value::as_i64).unwrap_or(0),
            company_industry: None,
            company_size: None,
            source_type: self.source_type(),
        })
    }
}

/// Always fails to fetch.
struct BrokenSource;

#[async_trait]
impl JobSource for BrokenSource {
    fn source_name(&self) -> &str {
        "broken"
    }

    fn source_type(&self) -> SourceType {
        SourceType::CompanyPortal
    }

    fn endpoint(&self) -> &str {
        "memory://broken"
    }

    async fn fetch_raw(&self, _query: &ScrapeQuery) -> Result<Vec<Value>> {
        Err(anyhow!("connection refused"))
    }

    fn parse_raw(&self, _raw: &Value) -> Result<JobPosting> {
        unreachable!("nothing is ever fetched")
    }
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<ScrapeProgressEvent>>,
}

impl ScrapeProgressReporter for RecordingProgress {
    fn report(&self, event: ScrapeProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn job(id: &str, title: &str, company: &str, posted_at: i64) -> Value {
    json!({ "id": id, "title": title, "company": company, "posted_at": posted_at })
}

fn sample_source() -> InMemorySource {
    InMemorySource {
        pages: vec![
            vec![
                job("a1", "Rust Engineer", "Acme", 1_700_000_300),
                job("a2", "Platform Engineer", "Acme", 1_700_000_200),
                json!({ "title": "no id" }),
            ],
            vec![
                job("b1", "Site Reliability Engineer", "Globex", 1_700_000_100),
                job("a1", "Rust Engineer", "Acme", 1_700_000_300),
            ],
        ],
    }
}

const CV: &str = "# Jonas Weber

- **Email**: jonas@example.de
- **Location**: Berlin, Germany
- **Title**: Senior Software Engineer

## Skills

### Technical
- Rust
- Kafka

### Soft Skills
- Facilitation

## Experience

### Spree GmbH | Senior Software Engineer
**Duration**: 2019 - Present

- Streaming pipelines
";

async fn setup() -> (TempDir, SqlitePool) {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::minimal();
    config.db.path = tmp.path().join("data/jobs.db");
    let pool = db::connect(&config).await.unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    (tmp, pool)
}

async fn setup_profile(tmp: &TempDir, pool: &SqlitePool) -> i64 {
    let cv_path = tmp.path().join("cv.md");
    std::fs::write(&cv_path, CV).unwrap();
    profile::create_profile_from_cv(pool, &cv_path, &PreferencesUpdate::default())
        .await
        .unwrap()
        .id
}

// ─── Ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_scrape_single_page_stores_and_counts() {
    let (_tmp, pool) = setup().await;
    let source = sample_source();
    let progress = RecordingProgress::default();

    let query = ScrapeQuery {
        keyword: Some("rust".to_string()),
        location: None,
        page: 0,
    };
    let stats = ingest::scrape(&pool, &source, &query, &progress).await.unwrap();
    assert_eq!(
        stats,
        ScrapeStats {
            fetched: 3,
            parse_failures: 1,
            inserted: 2,
            duplicates: 0,
        }
    );

    let events = progress.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[1],
        ScrapeProgressEvent::Stored { inserted: 2, fetched: 3, .. }
    ));
}

#[tokio::test]
async fn test_scrape_keywords_dedups_across_pages_and_runs() {
    let (_tmp, pool) = setup().await;
    let source = sample_source();

    let stats = ingest::scrape_keywords(
        &pool,
        &source,
        &["rust".to_string()],
        None,
        5,
        &NoProgress,
    )
    .await
    .unwrap();
    assert_eq!(stats.fetched, 5);
    assert_eq!(stats.inserted, 3);
    assert_eq!(stats.duplicates, 1);

    // A second run sees only known postings.
    let again = ingest::scrape_keywords(
        &pool,
        &source,
        &["rust".to_string()],
        None,
        5,
        &NoProgress,
    )
    .await
    .unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.duplicates, 4);

    let all = jobs::list_jobs(&pool, &JobFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].source_job_id, "a1");
    assert_eq!(all[0].requirements, vec!["rust".to_string()]);
    assert_eq!(all[0].source_type, "aggregator");
}

#[tokio::test]
async fn test_scrape_keywords_respects_max_pages() {
    let (_tmp, pool) = setup().await;
    let source = sample_source();

    let stats = ingest::scrape_keywords(&pool, &source, &["rust".to_string()], None, 1, &NoProgress)
        .await
        .unwrap();
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.inserted, 2);
}

#[tokio::test]
async fn test_fetch_error_is_not_fatal() {
    let (_tmp, pool) = setup().await;

    let stats = ingest::scrape_keywords(
        &pool,
        &BrokenSource,
        &["rust".to_string(), "go".to_string()],
        None,
        3,
        &NoProgress,
    )
    .await
    .unwrap();
    assert_eq!(stats, ScrapeStats::default());
}

#[tokio::test]
async fn test_job_filters() {
    let (_tmp, pool) = setup().await;
    ingest::scrape_keywords(&pool, &sample_source(), &["x".to_string()], None, 5, &NoProgress)
        .await
        .unwrap();

    let globex = jobs::list_jobs(
        &pool,
        &JobFilter {
            company: Some("GLOB".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(globex.len(), 1);
    assert_eq!(globex[0].title.as_deref(), Some("Site Reliability Engineer"));

    let limited = jobs::list_jobs(
        &pool,
        &JobFilter {
            limit: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(limited.len(), 2);

    let other_source = jobs::list_jobs(
        &pool,
        &JobFilter {
            source: Some("github".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(other_source.is_empty());
}

#[test]
fn test_registry_accepts_custom_sources() {
    let mut registry = SourceRegistry::new();
    assert!(registry.is_empty());
    registry.register(Box::new(sample_source()));
    registry.register(Box::new(BrokenSource));

    assert_eq!(registry.names(), vec!["inmemory", "broken"]);
    assert_eq!(registry.get("broken").unwrap().endpoint(), "memory://broken");
    assert!(registry.get("github").is_none());
}

// ─── Profiles ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_profile_from_cv_and_preference_updates() {
    let (tmp, pool) = setup().await;
    let user_id = setup_profile(&tmp, &pool).await;

    let user = profile::get_user(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(user.name, "Jonas Weber");
    assert_eq!(user.title.as_deref(), Some("Senior Software Engineer"));
    assert_eq!(user.location.as_deref(), Some("Berlin, Germany"));

    let cv = profile::get_parsed_cv(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(cv.skills.technical, vec!["Rust", "Kafka"]);
    assert_eq!(cv.skills.soft, vec!["Facilitation"]);
    assert_eq!(cv.experience[0].company, "Spree GmbH");

    // Re-upload with preferences only: same user, preferences merged.
    let cv_path = tmp.path().join("cv.md");
    let update = PreferencesUpdate {
        target_titles: Some(vec!["Staff Engineer".to_string()]),
        salary_min: Some(90_000.0),
        remote_preference: Some(RemotePreference::Hybrid),
        ..Default::default()
    };
    let again = profile::create_profile_from_cv(&pool, &cv_path, &update)
        .await
        .unwrap();
    assert_eq!(again.id, user_id);

    let update = PreferencesUpdate {
        salary_max: Some(120_000.0),
        ..Default::default()
    };
    profile::create_profile_from_cv(&pool, &cv_path, &update)
        .await
        .unwrap();

    let prefs = profile::get_user_preferences(&pool, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prefs.target_titles, vec!["Staff Engineer"]);
    assert_eq!(prefs.salary_min, Some(90_000.0));
    assert_eq!(prefs.salary_max, Some(120_000.0));
    assert_eq!(prefs.remote_preference, Some(RemotePreference::Hybrid));

    assert_eq!(profile::list_users(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_changed_cv_updates_profile_and_replaces_skills() {
    let (tmp, pool) = setup().await;
    let user_id = setup_profile(&tmp, &pool).await;
    let before = profile::get_user(&pool, user_id).await.unwrap().unwrap();

    let cv_path = tmp.path().join("cv.md");
    std::fs::write(
        &cv_path,
        "# Jonas Weber\n\n- **Location**: Hamburg, Germany\n- **Title**: CTO\n\n## Skills\n\n### Technical\n- Zig\n",
    )
    .unwrap();
    let updated = profile::create_profile_from_cv(&pool, &cv_path, &PreferencesUpdate::default())
        .await
        .unwrap();

    assert_eq!(updated.id, user_id);
    assert_eq!(updated.title.as_deref(), Some("CTO"));
    assert_eq!(updated.location.as_deref(), Some("Hamburg, Germany"));
    assert_ne!(updated.cv_hash, before.cv_hash);
    assert_eq!(profile::list_users(&pool).await.unwrap().len(), 1);

    let skills: Vec<(String, String)> =
        sqlx::query_as("SELECT skill_name, category FROM skills WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(skills, vec![("Zig".to_string(), "technical".to_string())]);

    let cv = profile::get_parsed_cv(&pool, user_id).await.unwrap().unwrap();
    assert_eq!(cv.skills.technical, vec!["Zig"]);
    assert!(cv.experience.is_empty());
}

#[tokio::test]
async fn test_profile_requires_a_name() {
    let (tmp, pool) = setup().await;
    let cv_path = tmp.path().join("anon.md");
    std::fs::write(&cv_path, "Just some text\n\n## Skills\n- Rust\n").unwrap();

    let err = profile::create_profile_from_cv(&pool, &cv_path, &PreferencesUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::MissingName { .. })
    ));
    assert!(profile::list_users(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_user_without_profiles() {
    let (_tmp, pool) = setup().await;
    let err = profile::resolve_user(&pool, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::NoUsers)
    ));

    let err = profile::resolve_user(&pool, Some(42)).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ProfileError>(),
        Some(ProfileError::UserNotFound(42))
    ));
}

// ─── Lifecycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_application_lifecycle() {
    let (tmp, pool) = setup().await;
    let user_id = setup_profile(&tmp, &pool).await;
    ingest::scrape_keywords(&pool, &sample_source(), &["x".to_string()], None, 5, &NoProgress)
        .await
        .unwrap();
    let job = jobs::list_jobs(&pool, &JobFilter::default()).await.unwrap()[0].clone();

    let app = tracker::apply(&pool, user_id, job.id, Some("portal"), None)
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Applied);
    assert_eq!(app.method.as_deref(), Some("portal"));

    let err = tracker::apply(&pool, user_id, job.id, None, None)
        .await
        .unwrap_err();
    match err.downcast_ref::<TrackerError>() {
        Some(TrackerError::AlreadyApplied {
            job_id,
            application_id,
        }) => {
            assert_eq!(*job_id, job.id);
            assert_eq!(*application_id, app.id);
        }
        other => panic!("expected AlreadyApplied, got {:?}", other),
    }

    let err = tracker::apply(&pool, user_id, 9999, None, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::JobNotFound(9999))
    ));

    let reviewing = tracker::set_status(&pool, app.id, ApplicationStatus::Reviewing, Some("recruiter replied"))
        .await
        .unwrap();
    assert_eq!(reviewing.status, ApplicationStatus::Reviewing);

    let interview = tracker::add_interview(
        &pool,
        app.id,
        &NewInterview {
            scheduled_at: tracker::parse_when("2030-03-01T09:30").unwrap(),
            interview_type: Some(InterviewType::Video),
            interviewer_name: Some("Petra".to_string()),
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(db::format_ts_iso(interview.scheduled_at), "2030-03-01T09:30:00Z");
    let current = tracker::get_application(&pool, app.id).await.unwrap().unwrap();
    assert_eq!(current.status, ApplicationStatus::Interview);

    let offer = tracker::add_offer(
        &pool,
        app.id,
        &NewOffer {
            salary: Some(95_000.0),
            benefits: vec!["30 days leave".to_string()],
            start_date: Some(tracker::parse_date("2030-05-01").unwrap()),
            expires_at: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(offer.decision, OfferDecision::Pending);
    let current = tracker::get_application(&pool, app.id).await.unwrap().unwrap();
    assert_eq!(current.status, ApplicationStatus::Offer);

    let declined = tracker::decide_offer(&pool, offer.id, false).await.unwrap();
    assert_eq!(declined.decision, OfferDecision::Rejected);
    let err = tracker::decide_offer(&pool, offer.id, true).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::OfferDecided { .. })
    ));

    let detail = tracker::application_detail(&pool, app.id).await.unwrap();
    assert_eq!(detail.job.unwrap().id, job.id);
    assert_eq!(detail.interviews.len(), 1);
    assert_eq!(detail.offers[0].benefits, vec!["30 days leave"]);
    assert_eq!(detail.offers[0].start_date.as_deref(), Some("2030-05-01"));
    assert!(detail
        .application
        .notes
        .as_deref()
        .unwrap_or("")
        .contains("recruiter replied"));

    let offers = tracker::list_applications(&pool, Some(user_id), Some(ApplicationStatus::Offer))
        .await
        .unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].company.as_deref(), Some("Acme"));
    let rejected = tracker::list_applications(&pool, None, Some(ApplicationStatus::Rejected))
        .await
        .unwrap();
    assert!(rejected.is_empty());

    let stats = collect_stats(&pool).await.unwrap();
    assert_eq!(stats.users, 1);
    assert_eq!(stats.jobs, 3);
    assert_eq!(stats.by_source[0].source, "inmemory");
    assert_eq!(stats.applications(), 1);
    assert_eq!(stats.interviews, 1);
    assert_eq!(stats.pending_offers, 0);

    let export = export_profile(&pool, None).await.unwrap();
    assert_eq!(export.user.id, user_id);
    assert_eq!(export.applications.len(), 1);
    assert!(export.cv.is_some());
    let json = serde_json::to_value(&export).unwrap();
    assert_eq!(json["applications"][0]["offers"][0]["decision"], "rejected");
}

#[tokio::test]
async fn test_missing_application_and_offer() {
    let (_tmp, pool) = setup().await;

    let err = tracker::set_status(&pool, 7, ApplicationStatus::Withdrawn, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::ApplicationNotFound(7))
    ));

    let err = tracker::decide_offer(&pool, 3, true).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::OfferNotFound(3))
    ));
}
