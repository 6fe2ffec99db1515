//! User profiles built from CVs, and their job search preferences.
//!
//! A profile is keyed by the name found in the CV. Uploading a CV for a
//! name that already exists updates that profile in place; uploading the
//! exact same CV text again leaves the stored CV columns and skills alone
//! and only applies preference changes.

use anyhow::Result;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::cv_parser;
use crate::db;
use crate::models::{
    ExperienceLevel, ParsedCv, RemotePreference, Skills, User, UserPreferences,
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("CV {} has no name: expected a '# Full Name' heading in its first lines", path.display())]
    MissingName { path: PathBuf },

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("no user profiles found; run `jobhunt profile upload <CV_FILE>` first")]
    NoUsers,
}

/// Preference fields to set. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesUpdate {
    pub target_titles: Option<Vec<String>>,
    pub target_industries: Option<Vec<String>>,
    pub preferred_locations: Option<Vec<String>>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub experience_level: Option<ExperienceLevel>,
    pub remote_preference: Option<RemotePreference>,
    pub contract_types: Option<Vec<String>>,
}

impl PreferencesUpdate {
    pub fn apply_to(&self, prefs: &mut UserPreferences) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        set(&mut prefs.target_titles, &self.target_titles);
        set(&mut prefs.target_industries, &self.target_industries);
        set(&mut prefs.preferred_locations, &self.preferred_locations);
        set_opt(&mut prefs.salary_min, &self.salary_min);
        set_opt(&mut prefs.salary_max, &self.salary_max);
        set_opt(&mut prefs.experience_level, &self.experience_level);
        set_opt(&mut prefs.remote_preference, &self.remote_preference);
        set(&mut prefs.contract_types, &self.contract_types);
    }
}

/// Flatten repeated and comma-separated CLI values: `["a, b", "c"]` → `[a, b, c]`.
pub fn parse_list_input(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// `None` for an empty list, so that "no values given" does not clear
/// stored preferences.
pub fn non_empty_list(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn cv_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ═══════════════════════════════════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════════════════════════════════

/// Create or update the profile for the person named in the CV at `cv_path`.
pub async fn create_profile_from_cv(
    pool: &SqlitePool,
    cv_path: &Path,
    prefs: &PreferencesUpdate,
) -> Result<User> {
    let text = cv_parser::read_cv(cv_path)?;
    let parsed = cv_parser::parse(&text);
    let name = parsed
        .personal_info
        .name
        .clone()
        .ok_or_else(|| ProfileError::MissingName {
            path: cv_path.to_path_buf(),
        })?;
    let hash = cv_hash(&text);
    let parsed_json = serde_json::to_string(&parsed)?;
    let now = db::now();

    let mut tx = pool.begin().await?;

    let existing = sqlx::query("SELECT id, cv_hash FROM users WHERE name = ?")
        .bind(&name)
        .fetch_optional(&mut *tx)
        .await?;

    let user_id: i64 = match existing {
        Some(row) if row.get::<Option<String>, _>("cv_hash").as_deref() == Some(hash.as_str()) => {
            log::info!("CV for '{}' is unchanged; keeping stored profile", name);
            row.get("id")
        }
        Some(row) => {
            let id: i64 = row.get("id");
            sqlx::query(
                r#"
                UPDATE users
                SET title = ?, location = ?, cv_text = ?, cv_parsed_json = ?, cv_hash = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&parsed.personal_info.title)
            .bind(&parsed.personal_info.location)
            .bind(&text)
            .bind(&parsed_json)
            .bind(&hash)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            replace_skills(&mut *tx, id, &parsed.skills).await?;
            log::info!("updated profile {} for '{}'", id, name);
            id
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO users (name, title, location, cv_text, cv_parsed_json, cv_hash, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&name)
            .bind(&parsed.personal_info.title)
            .bind(&parsed.personal_info.location)
            .bind(&text)
            .bind(&parsed_json)
            .bind(&hash)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            let id = result.last_insert_rowid();
            replace_skills(&mut *tx, id, &parsed.skills).await?;
            log::info!("created profile {} for '{}'", id, name);
            id
        }
    };

    upsert_preferences(&mut *tx, user_id, prefs, now).await?;
    tx.commit().await?;

    get_user(pool, user_id)
        .await?
        .ok_or_else(|| ProfileError::UserNotFound(user_id).into())
}

async fn replace_skills(conn: &mut SqliteConnection, user_id: i64, skills: &Skills) -> Result<()> {
    sqlx::query("DELETE FROM skills WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for (category, skill) in skills.iter_categorized() {
        sqlx::query("INSERT INTO skills (user_id, skill_name, category) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(skill)
            .bind(category.as_str())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn upsert_preferences(
    conn: &mut SqliteConnection,
    user_id: i64,
    update: &PreferencesUpdate,
    now: i64,
) -> Result<()> {
    let row = sqlx::query(&format!("SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = ?"))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    let exists = row.is_some();

    let mut prefs = row.as_ref().map(preferences_from_row).unwrap_or_default();
    update.apply_to(&mut prefs);

    let sql = if exists {
        r#"
        UPDATE user_preferences
        SET target_titles_json = ?1, target_industries_json = ?2, preferred_locations_json = ?3,
            salary_min = ?4, salary_max = ?5, experience_level = ?6, remote_preference = ?7,
            contract_types_json = ?8, updated_at = ?9
        WHERE user_id = ?10
        "#
    } else {
        r#"
        INSERT INTO user_preferences (target_titles_json, target_industries_json, preferred_locations_json,
                                      salary_min, salary_max, experience_level, remote_preference,
                                      contract_types_json, created_at, updated_at, user_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?10)
        "#
    };

    sqlx::query(sql)
        .bind(serde_json::to_string(&prefs.target_titles)?)
        .bind(serde_json::to_string(&prefs.target_industries)?)
        .bind(serde_json::to_string(&prefs.preferred_locations)?)
        .bind(prefs.salary_min)
        .bind(prefs.salary_max)
        .bind(prefs.experience_level.map(|l| l.as_str()))
        .bind(prefs.remote_preference.map(|r| r.as_str()))
        .bind(serde_json::to_string(&prefs.contract_types)?)
        .bind(now)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

const PREFERENCE_COLUMNS: &str = "target_titles_json, target_industries_json, preferred_locations_json, \
     salary_min, salary_max, experience_level, remote_preference, contract_types_json";

fn json_list(row: &SqliteRow, column: &str) -> Vec<String> {
    let raw: Option<String> = row.get(column);
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn preferences_from_row(row: &SqliteRow) -> UserPreferences {
    let experience_level: Option<String> = row.get("experience_level");
    let remote_preference: Option<String> = row.get("remote_preference");
    UserPreferences {
        target_titles: json_list(row, "target_titles_json"),
        target_industries: json_list(row, "target_industries_json"),
        preferred_locations: json_list(row, "preferred_locations_json"),
        salary_min: row.get("salary_min"),
        salary_max: row.get("salary_max"),
        experience_level: experience_level.and_then(|s| s.parse().ok()),
        remote_preference: remote_preference.and_then(|s| s.parse().ok()),
        contract_types: json_list(row, "contract_types_json"),
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        title: row.get("title"),
        location: row.get("location"),
        cv_hash: row.get("cv_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const USER_COLUMNS: &str = "id, name, title, location, cv_hash, created_at, updated_at";

pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(user_from_row))
}

/// All users, oldest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(user_from_row).collect())
}

pub async fn get_user_preferences(pool: &SqlitePool, user_id: i64) -> Result<Option<UserPreferences>> {
    let row = sqlx::query(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(preferences_from_row))
}

/// The stored extraction result for a user's latest CV.
pub async fn get_parsed_cv(pool: &SqlitePool, user_id: i64) -> Result<Option<ParsedCv>> {
    let raw: Option<Option<String>> =
        sqlx::query_scalar("SELECT cv_parsed_json FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    match raw.flatten() {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// The user with `user_id`, or the first user when no id is given.
pub async fn resolve_user(pool: &SqlitePool, user_id: Option<i64>) -> Result<User> {
    match user_id {
        Some(id) => Ok(get_user(pool, id)
            .await?
            .ok_or(ProfileError::UserNotFound(id))?),
        None => Ok(list_users(pool)
            .await?
            .into_iter()
            .next()
            .ok_or(ProfileError::NoUsers)?),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CLI entry points
// ═══════════════════════════════════════════════════════════════════════

/// `jobhunt parse`: print the extraction result as JSON.
pub fn run_parse(cv_path: &Path, pretty: bool) -> Result<()> {
    let parsed = cv_parser::parse_file(cv_path)?;
    let json = if pretty {
        serde_json::to_string_pretty(&parsed)?
    } else {
        serde_json::to_string(&parsed)?
    };
    println!("{}", json);
    Ok(())
}

pub async fn run_upload(config: &Config, cv_path: &Path, prefs: &PreferencesUpdate) -> Result<()> {
    let pool = db::connect(config).await?;
    let user = create_profile_from_cv(&pool, cv_path, prefs).await?;
    let stored = get_user_preferences(&pool, user.id).await?.unwrap_or_default();
    pool.close().await;

    println!("profile saved");
    println!("  id:        {}", user.id);
    println!("  name:      {}", user.name);
    println!("  title:     {}", user.title.as_deref().unwrap_or("N/A"));
    println!("  location:  {}", user.location.as_deref().unwrap_or("N/A"));
    print_preferences(&stored);
    Ok(())
}

pub async fn run_show(config: &Config, user_id: Option<i64>) -> Result<()> {
    let pool = db::connect(config).await?;
    let user = resolve_user(&pool, user_id).await?;
    let prefs = get_user_preferences(&pool, user.id).await?;
    let skills: Vec<(String, String)> =
        sqlx::query_as("SELECT category, skill_name FROM skills WHERE user_id = ? ORDER BY id")
            .bind(user.id)
            .fetch_all(&pool)
            .await?;
    pool.close().await;

    println!("--- Profile ---");
    println!("id:        {}", user.id);
    println!("name:      {}", user.name);
    println!("title:     {}", user.title.as_deref().unwrap_or("N/A"));
    println!("location:  {}", user.location.as_deref().unwrap_or("N/A"));
    println!("created:   {}", db::format_ts_iso(user.created_at));
    println!("updated:   {}", db::format_ts_iso(user.updated_at));

    if !skills.is_empty() {
        println!();
        println!("Skills:");
        for category in ["technical", "soft", "language"] {
            let names: Vec<&str> = skills
                .iter()
                .filter(|(c, _)| c == category)
                .map(|(_, s)| s.as_str())
                .collect();
            if !names.is_empty() {
                println!("  {:<10} {}", category, names.join(", "));
            }
        }
    }

    if let Some(prefs) = prefs {
        println!();
        println!("Preferences:");
        print_preferences(&prefs);
    }
    Ok(())
}

pub async fn run_list(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let users = list_users(&pool).await?;
    pool.close().await;

    if users.is_empty() {
        println!("No user profiles found.");
        return Ok(());
    }

    println!("{:>4}  {:<28} {:<32} LOCATION", "ID", "NAME", "TITLE");
    for user in &users {
        println!(
            "{:>4}  {:<28} {:<32} {}",
            user.id,
            user.name,
            user.title.as_deref().unwrap_or("N/A"),
            user.location.as_deref().unwrap_or("N/A")
        );
    }
    Ok(())
}

fn print_preferences(prefs: &UserPreferences) {
    if !prefs.target_titles.is_empty() {
        println!("  target titles: {}", prefs.target_titles.join(", "));
    }
    if !prefs.target_industries.is_empty() {
        println!("  industries:    {}", prefs.target_industries.join(", "));
    }
    if !prefs.preferred_locations.is_empty() {
        println!("  locations:     {}", prefs.preferred_locations.join(", "));
    }
    if let Some(range) = format_salary_range(prefs.salary_min, prefs.salary_max) {
        println!("  salary:        {}", range);
    }
    if let Some(level) = prefs.experience_level {
        println!("  experience:    {}", level);
    }
    if let Some(remote) = prefs.remote_preference {
        println!("  remote:        {}", remote);
    }
    if !prefs.contract_types.is_empty() {
        println!("  contracts:     {}", prefs.contract_types.join(", "));
    }
}

/// `$90,000 - $120,000`; `?` stands in for a missing minimum.
pub fn format_salary_range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (None, None) => None,
        (min, max) => {
            let mut range = min.map(format_money).unwrap_or_else(|| "?".to_string());
            if let Some(max) = max {
                range.push_str(" - ");
                range.push_str(&format_money(max));
            }
            Some(range)
        }
    }
}

pub(crate) fn format_money(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
