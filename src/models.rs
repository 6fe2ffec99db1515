//! Core data models used throughout Job Hunter.
//!
//! Two families of types live here: the structured record produced by the
//! CV extractor ([`ParsedCv`] and its parts), and the rows persisted in
//! SQLite (users, preferences, jobs, applications, interviews, offers).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// Parsed CV
// ═══════════════════════════════════════════════════════════════════════

/// Structured record extracted from a CV document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCv {
    pub personal_info: PersonalInfo,
    pub professional_summary: Option<String>,
    pub skills: Skills,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub certifications: Option<String>,
    pub projects: Option<String>,
    pub languages: Vec<String>,
}

/// Contact block. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
}

/// Skill buckets. All three are always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
}

impl Skills {
    /// Iterate `(category, skill)` pairs in bucket order, using the
    /// category labels stored in the `skills` table.
    pub fn iter_categorized(&self) -> impl Iterator<Item = (SkillCategory, &str)> {
        let technical = self
            .technical
            .iter()
            .map(|s| (SkillCategory::Technical, s.as_str()));
        let soft = self.soft.iter().map(|s| (SkillCategory::Soft, s.as_str()));
        let languages = self
            .languages
            .iter()
            .map(|s| (SkillCategory::Language, s.as_str()));
        technical.chain(soft).chain(languages)
    }

    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.soft.is_empty() && self.languages.is_empty()
    }
}

/// One job held, keyed by company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

/// One degree or course of study, keyed by school.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Enumerated columns
// ═══════════════════════════════════════════════════════════════════════

/// Declares a string-backed enum stored as lowercase text in SQLite.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let choices: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        anyhow::anyhow!(
                            "invalid {}: '{}'. Expected one of: {}",
                            stringify!($name),
                            s,
                            choices.join(", ")
                        )
                    })
            }
        }
    };
}

text_enum! {
    /// Bucket a skill row belongs to.
    SkillCategory {
        Technical => "technical",
        Soft => "soft",
        Language => "language",
    }
}

text_enum! {
    /// Seniority the user is targeting.
    ExperienceLevel {
        Junior => "junior",
        Mid => "mid",
        Senior => "senior",
        Lead => "lead",
    }
}

text_enum! {
    /// Work arrangement, used for both preferences and postings.
    RemotePreference {
        Onsite => "onsite",
        Hybrid => "hybrid",
        Remote => "remote",
    }
}

text_enum! {
    /// Where a posting came from.
    SourceType {
        Aggregator => "aggregator",
        CompanyPortal => "company_portal",
    }
}

text_enum! {
    /// Application lifecycle state.
    ApplicationStatus {
        Applied => "applied",
        Reviewing => "reviewing",
        Interview => "interview",
        Rejected => "rejected",
        Offer => "offer",
        Withdrawn => "withdrawn",
    }
}

text_enum! {
    InterviewType {
        Phone => "phone",
        Video => "video",
        InPerson => "in-person",
    }
}

text_enum! {
    InterviewResult {
        Pending => "pending",
        Pass => "pass",
        Fail => "fail",
    }
}

text_enum! {
    OfferDecision {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Stored rows
// ═══════════════════════════════════════════════════════════════════════

/// A user profile built from a CV.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub cv_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Job search preferences, one row per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub target_titles: Vec<String>,
    pub target_industries: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub experience_level: Option<ExperienceLevel>,
    pub remote_preference: Option<RemotePreference>,
    pub contract_types: Vec<String>,
}

/// A normalized posting produced by a [`crate::traits::JobSource`],
/// before it is assigned a row id.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPosting {
    pub source: String,
    pub source_job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub remote: Option<RemotePreference>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub nice_to_haves: Option<Vec<String>>,
    pub apply_url: Option<String>,
    pub posted_at: i64,
    pub company_industry: Option<String>,
    pub company_size: Option<String>,
    pub source_type: SourceType,
}

/// A stored job posting.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i64,
    pub source: String,
    pub source_job_id: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub remote: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub description: Option<String>,
    pub requirements: Vec<String>,
    pub apply_url: Option<String>,
    pub posted_at: Option<i64>,
    pub scraped_at: i64,
    pub source_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub status: ApplicationStatus,
    pub applied_at: i64,
    pub method: Option<String>,
    pub notes: Option<String>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Interview {
    pub id: i64,
    pub application_id: i64,
    pub scheduled_at: i64,
    pub interview_type: Option<InterviewType>,
    pub interviewer_name: Option<String>,
    pub notes: Option<String>,
    pub result: InterviewResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    pub id: i64,
    pub application_id: i64,
    pub salary: Option<f64>,
    pub benefits: Vec<String>,
    pub start_date: Option<String>,
    pub expires_at: Option<String>,
    pub decision: OfferDecision,
    pub notes: Option<String>,
}
