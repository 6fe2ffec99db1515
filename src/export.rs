//! Export a profile as JSON.
//!
//! The export bundles the stored CV extraction, the search preferences, and
//! every application with its interviews and offers, so a profile can be
//! backed up or fed to other tools.

use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::models::{ParsedCv, User, UserPreferences};
use crate::profile;
use crate::tracker::{self, ApplicationDetail};

#[derive(Debug, Serialize)]
pub struct ProfileExport {
    pub exported_at: String,
    pub user: User,
    pub cv: Option<ParsedCv>,
    pub preferences: Option<UserPreferences>,
    pub applications: Vec<ApplicationDetail>,
}

pub async fn export_profile(pool: &SqlitePool, user_id: Option<i64>) -> Result<ProfileExport> {
    let user = profile::resolve_user(pool, user_id).await?;
    let cv = profile::get_parsed_cv(pool, user.id).await?;
    let preferences = profile::get_user_preferences(pool, user.id).await?;

    let mut applications = Vec::new();
    for summary in tracker::list_applications(pool, Some(user.id), None).await? {
        applications.push(tracker::application_detail(pool, summary.application.id).await?);
    }
    applications.sort_by_key(|detail| detail.application.id);

    Ok(ProfileExport {
        exported_at: db::format_ts_iso(db::now()),
        user,
        cv,
        preferences,
        applications,
    })
}

/// Export a profile as pretty JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes
/// to stdout for piping.
pub async fn run_export(config: &Config, user_id: Option<i64>, output: Option<&Path>) -> Result<()> {
    let pool = db::connect(config).await?;
    let export = export_profile(&pool, user_id).await?;
    pool.close().await;

    let json = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!(
                "Exported profile '{}' with {} application(s) to {}",
                export.user.name,
                export.applications.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
