use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        title TEXT,
        location TEXT,
        cv_text TEXT,
        cv_parsed_json TEXT,
        cv_hash TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_preferences (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE,
        target_titles_json TEXT NOT NULL DEFAULT '[]',
        target_industries_json TEXT NOT NULL DEFAULT '[]',
        preferred_locations_json TEXT NOT NULL DEFAULT '[]',
        salary_min REAL,
        salary_max REAL,
        experience_level TEXT,
        remote_preference TEXT,
        contract_types_json TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS skills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        skill_name TEXT NOT NULL,
        proficiency TEXT,
        category TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source TEXT NOT NULL,
        source_job_id TEXT NOT NULL,
        title TEXT,
        company TEXT,
        department TEXT,
        location TEXT,
        remote TEXT,
        salary_min REAL,
        salary_max REAL,
        description TEXT,
        requirements_json TEXT NOT NULL DEFAULT '[]',
        nice_to_haves_json TEXT NOT NULL DEFAULT '[]',
        apply_url TEXT,
        posted_at INTEGER,
        scraped_at INTEGER NOT NULL,
        company_industry TEXT,
        company_size TEXT,
        source_type TEXT NOT NULL DEFAULT 'aggregator',
        UNIQUE(source, source_job_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_matches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        match_score REAL,
        skill_score REAL,
        title_score REAL,
        experience_score REAL,
        location_or_remote_score REAL,
        salary_score REAL,
        calculated_at INTEGER NOT NULL,
        FOREIGN KEY (job_id) REFERENCES jobs(id),
        FOREIGN KEY (user_id) REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        job_id INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'applied',
        applied_at INTEGER NOT NULL,
        method TEXT,
        notes TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE(user_id, job_id),
        FOREIGN KEY (user_id) REFERENCES users(id),
        FOREIGN KEY (job_id) REFERENCES jobs(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interviews (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        application_id INTEGER NOT NULL,
        scheduled_at INTEGER NOT NULL,
        interview_type TEXT,
        interviewer_name TEXT,
        notes TEXT,
        result TEXT NOT NULL DEFAULT 'pending',
        FOREIGN KEY (application_id) REFERENCES applications(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS offers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        application_id INTEGER NOT NULL,
        salary REAL,
        benefits_json TEXT NOT NULL DEFAULT '[]',
        start_date TEXT,
        expires_at TEXT,
        decision TEXT NOT NULL DEFAULT 'pending',
        notes TEXT,
        FOREIGN KEY (application_id) REFERENCES applications(id)
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_skills_user_id ON skills(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_source ON jobs(source)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_company ON jobs(company)",
    "CREATE INDEX IF NOT EXISTS idx_jobs_posted_at ON jobs(posted_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_applications_user_status ON applications(user_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_interviews_application_id ON interviews(application_id)",
    "CREATE INDEX IF NOT EXISTS idx_offers_application_id ON offers(application_id)",
];

/// Create every table and index. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in TABLES.iter().chain(INDEXES) {
        sqlx::query(*ddl).execute(pool).await?;
    }
    Ok(())
}

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}
