//! Heuristic extractor for markdown-style CVs.
//!
//! A CV is expected to loosely follow this layout:
//!
//! ```text
//! # Full Name                          ← level 1: name
//! ## Contact Information               ← level 2: section
//! - **Location**: Lisbon               ← labelled metadata
//! ## Professional Experience
//! ### Company | Title                  ← level 3: entry
//! **Location**: Porto | **Duration**: 2020-2023
//! - Built things                       ← bullet narrative (ignored)
//! ```
//!
//! Extraction is an ordered set of independent matchers over a
//! [`CvDocument`]. None of them can fail: a section or field that is not
//! there comes back as `None` or an empty list. Every pattern is compiled
//! once with the `regex` crate, whose matching time is linear in the input.
//!
//! The only fallible entry point is [`parse_file`], and only for reading
//! the file.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::{EducationEntry, ExperienceEntry, ParsedCv, PersonalInfo, Skills};

/// Name must appear within this many leading lines.
const NAME_SCAN_LINES: usize = 10;
/// Unlabelled `location:` / `title:` fallback scans this many leading lines.
const CONTACT_SCAN_LINES: usize = 20;
/// Minimum length of a phone-like run.
const PHONE_MIN_LEN: usize = 10;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?[0-9 \t()\-]{10,}").expect("phone pattern"));

/// `**Label**:` or `**Label:**`.
static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*([A-Za-z][A-Za-z &/]*?)\s*(?::\*\*|\*\*\s*:)").expect("label pattern")
});

static SUMMARY_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("professional summary"));
static SKILLS_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("skill"));
static EXPERIENCE_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("experience"));
static EDUCATION_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("education"));
static CERTIFICATIONS_HEADING: LazyLock<Regex> =
    LazyLock::new(|| heading_pattern("certifications|awards & recognition"));
static PROJECTS_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("projects"));
static LANGUAGES_HEADING: LazyLock<Regex> = LazyLock::new(|| heading_pattern("language"));

fn heading_pattern(alternatives: &str) -> Regex {
    Regex::new(&format!("(?i){}", alternatives)).expect("section heading pattern")
}

// ═══════════════════════════════════════════════════════════════════════
// Entry points
// ═══════════════════════════════════════════════════════════════════════

/// Failure to obtain CV text. Parsing itself never fails.
#[derive(Debug, Error)]
pub enum CvError {
    #[error("CV file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read CV file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse CV text into a [`ParsedCv`].
pub fn parse(text: &str) -> ParsedCv {
    CvDocument::new(text).parse()
}

/// Read a CV file as UTF-8 text.
pub fn read_cv(path: &Path) -> Result<String, CvError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CvError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CvError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Read and parse a CV file.
///
/// A missing file is reported as [`CvError::NotFound`], which callers can
/// tell apart from a file that parsed to an empty record.
pub fn parse_file(path: &Path) -> Result<ParsedCv, CvError> {
    let text = read_cv(path)?;
    Ok(parse(&text))
}

// ═══════════════════════════════════════════════════════════════════════
// Document view
// ═══════════════════════════════════════════════════════════════════════

/// Immutable view over CV text and its lines.
#[derive(Debug, Clone)]
pub struct CvDocument<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> CvDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: text.lines().collect(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Run every matcher and assemble the record.
    pub fn parse(&self) -> ParsedCv {
        ParsedCv {
            personal_info: self.personal_info(),
            professional_summary: self.free_text(&SUMMARY_HEADING),
            skills: self.skills(),
            experience: self.experience(),
            education: self.education(),
            certifications: self.free_text(&CERTIFICATIONS_HEADING),
            projects: self.free_text(&PROJECTS_HEADING),
            languages: self.languages(),
        }
    }

    /// Body lines of the first level-2 section whose title matches `title`.
    ///
    /// The body ends at the next heading of level 2 or above, or at the end
    /// of the document.
    pub fn section(&self, title: &Regex) -> Option<&[&'a str]> {
        let start = self.lines.iter().position(|line| {
            matches!(heading(line), Some(h) if h.level == 2 && title.is_match(h.text))
        })?;
        let body = &self.lines[start + 1..];
        let end = body
            .iter()
            .position(|line| matches!(heading(line), Some(h) if h.level <= 2))
            .unwrap_or(body.len());
        Some(&body[..end])
    }

    pub fn personal_info(&self) -> PersonalInfo {
        PersonalInfo {
            name: extract_name(&self.lines),
            email: extract_email(self.text),
            phone: extract_phone(self.text),
            location: self.contact_field("location"),
            title: self.contact_field("title"),
        }
    }

    /// Labelled `**Field**:` anywhere, else an unlabelled `field: value`
    /// line near the top.
    fn contact_field(&self, field: &str) -> Option<String> {
        labelled_to_eol(&self.lines, field)
            .or_else(|| unlabelled_near_top(&self.lines, field))
    }

    fn free_text(&self, title: &Regex) -> Option<String> {
        self.section(title).and_then(block_text)
    }

    pub fn skills(&self) -> Skills {
        let mut skills = Skills::default();
        let Some(section) = self.section(&SKILLS_HEADING) else {
            return skills;
        };

        for block in split_entries(section) {
            let label = block.header.unwrap_or("").to_lowercase();
            let bucket = if label.contains("language") {
                &mut skills.languages
            } else if label.contains("technical") {
                &mut skills.technical
            } else {
                &mut skills.soft
            };
            bucket.extend(
                block
                    .body
                    .iter()
                    .filter_map(|line| bullet(line))
                    .filter(|item| !item.is_empty())
                    .map(str::to_string),
            );
        }
        skills
    }

    pub fn experience(&self) -> Vec<ExperienceEntry> {
        self.section(&EXPERIENCE_HEADING)
            .map(|section| {
                split_entries(section)
                    .iter()
                    .filter_map(experience_entry)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn education(&self) -> Vec<EducationEntry> {
        self.section(&EDUCATION_HEADING)
            .map(|section| {
                split_entries(section)
                    .iter()
                    .filter_map(education_entry)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn languages(&self) -> Vec<String> {
        self.section(&LANGUAGES_HEADING)
            .map(|section| {
                section
                    .iter()
                    .filter_map(|line| bullet(line))
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Personal info matchers
// ═══════════════════════════════════════════════════════════════════════

fn extract_name(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .take(NAME_SCAN_LINES)
        .filter_map(|line| heading(line))
        .find(|h| h.level == 1)
        .map(|h| h.text.to_string())
        .filter(|name| !name.is_empty())
}

fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First run of digits and separators at least ten characters long.
///
/// Runs without a single digit (markdown rules, spacing) are skipped. Long
/// numeric identifiers and year ranges can still match.
fn extract_phone(text: &str) -> Option<String> {
    PHONE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|run| run.len() >= PHONE_MIN_LEN && run.bytes().any(|b| b.is_ascii_digit()))
        .map(str::to_string)
}

/// Value after the first `**Field**:` label in the document, up to end of line.
fn labelled_to_eol(lines: &[&str], field: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        LABEL.captures_iter(line).find_map(|caps| {
            let whole = caps.get(0)?;
            if !caps[1].eq_ignore_ascii_case(field) {
                return None;
            }
            let value = line[whole.end()..].trim();
            (!value.is_empty()).then(|| value.to_string())
        })
    })
}

/// `... field ...: value` within the first lines, case-insensitive.
fn unlabelled_near_top(lines: &[&str], field: &str) -> Option<String> {
    lines.iter().take(CONTACT_SCAN_LINES).find_map(|line| {
        let lower = line.to_ascii_lowercase();
        let at = lower.find(field)?;
        let colon = line[at..].find(':')? + at;
        let value = line[colon + 1..].trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

// ═══════════════════════════════════════════════════════════════════════
// Entry matchers
// ═══════════════════════════════════════════════════════════════════════

fn experience_entry(block: &Block<'_>) -> Option<ExperienceEntry> {
    let (company, title) = split_company_title(block.header?);
    if company.is_empty() {
        return None;
    }

    let mut entry = ExperienceEntry {
        company: company.to_string(),
        title: non_empty(title),
        ..Default::default()
    };
    // Bullet narrative is not captured; `description` stays unset.
    for line in block.body {
        for (label, value) in labelled_fields(line) {
            match label.as_str() {
                "location" => overwrite(&mut entry.location, value),
                "duration" => overwrite(&mut entry.duration, value),
                _ => {}
            }
        }
    }
    Some(entry)
}

fn education_entry(block: &Block<'_>) -> Option<EducationEntry> {
    let school = block.header?.trim();
    if school.is_empty() {
        return None;
    }

    let mut entry = EducationEntry {
        school: school.to_string(),
        ..Default::default()
    };

    for line in block.body {
        for (label, value) in labelled_fields(line) {
            match label.as_str() {
                "location" => overwrite(&mut entry.location, value),
                "duration" => overwrite(&mut entry.duration, value),
                "degree" => overwrite(&mut entry.degree, value),
                "field" => overwrite(&mut entry.field, value),
                _ => {}
            }
        }
    }
    Some(entry)
}

/// `Company | Title`, else `Company - Title`, else the whole header.
/// Splits once, so the title keeps any further separators.
fn split_company_title(header: &str) -> (&str, Option<&str>) {
    let header = header.trim();
    match header.split_once('|').or_else(|| header.split_once('-')) {
        Some((company, title)) => (company.trim(), Some(title.trim())),
        None => (header, None),
    }
}

fn overwrite(field: &mut Option<String>, value: &str) {
    if !value.is_empty() {
        *field = Some(value.to_string());
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ═══════════════════════════════════════════════════════════════════════
// Markdown primitives
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Heading<'a> {
    level: usize,
    text: &'a str,
}

/// ATX heading at the start of the line: 1–6 `#` then whitespace or end.
fn heading(line: &str) -> Option<Heading<'_>> {
    let line = line.trim_end();
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(Heading {
        level,
        text: rest.trim(),
    })
}

/// A level-3 entry inside a section. `header` is `None` for the lines
/// that precede the first level-3 heading.
#[derive(Debug)]
struct Block<'s> {
    header: Option<&'s str>,
    body: &'s [&'s str],
}

fn split_entries<'s>(section: &'s [&'s str]) -> Vec<Block<'s>> {
    let mut blocks = Vec::new();
    let mut header = None;
    let mut start = 0;

    for (i, line) in section.iter().enumerate() {
        if let Some(h) = heading(line).filter(|h| h.level == 3) {
            blocks.push(Block {
                header,
                body: &section[start..i],
            });
            header = Some(h.text);
            start = i + 1;
        }
    }
    blocks.push(Block {
        header,
        body: &section[start..],
    });
    blocks
}

/// Text of a `-` or `*` bullet, trimmed. `Some("")` for an empty bullet.
fn bullet(line: &str) -> Option<&str> {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('-').or_else(|| rest.strip_prefix('*'))?;
    if rest.is_empty() {
        return Some("");
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// `(label, value)` pairs on a metadata line; labels are lowercased.
/// `**A**: x | **B**: y` yields both pairs.
fn labelled_fields(line: &str) -> Vec<(String, &str)> {
    let spans: Vec<(String, usize, usize)> = LABEL
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((caps[1].to_lowercase(), whole.start(), whole.end()))
        })
        .collect();

    spans
        .iter()
        .enumerate()
        .map(|(i, (label, _, value_start))| {
            let value_end = spans.get(i + 1).map(|next| next.1).unwrap_or(line.len());
            let value = line[*value_start..value_end]
                .trim()
                .trim_end_matches('|')
                .trim_end();
            (label.clone(), value)
        })
        .collect()
}

/// `---`, `***`, `___` and spaced variants.
fn is_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|marker| compact.chars().all(|c| c == *marker))
}

/// Section body as plain text: bullet markers removed, surrounding blank
/// and rule lines dropped. `None` when nothing is left.
fn block_text(lines: &[&str]) -> Option<String> {
    let is_filler = |line: &&str| line.trim().is_empty() || is_rule(line);
    let first = lines.iter().position(|l| !is_filler(l))?;
    let last = lines.iter().rposition(|l| !is_filler(l))?;

    let text = lines[first..=last]
        .iter()
        .map(|line| match bullet(line) {
            Some(item) if !line.starts_with(char::is_whitespace) => item,
            _ => line.trim_end(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    non_empty(Some(text.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CV: &str = "# Marta Oliveira

## Contact Information
- **Location**: Rua das Flores 12, Porto, Portugal
- **Email**: marta.oliveira@example.org
- **Phone**: +351 912 345 678
- **Title**: Platform Engineering Lead

---

## Professional Summary

Engineering lead focused on developer platforms, reliability,
and pragmatic delivery.

---

## Core Skills

### Technical
- Rust
- Kubernetes (EKS, GKE)
- PostgreSQL

### Professional
- Mentoring
- Incident Command

### Languages
- Portuguese

---

## Professional Experience

### Fintech Norte | Staff Engineer - Platform
**Location**: Porto | **Duration**: Mar 2021 - Present

- Led migration to a shared deployment platform
- Introduced on-call runbooks

### Lusa Logistics - Backend Engineer
**Location**: Lisbon
**Duration**: Jan 2017 - Feb 2021

- Built route optimisation services

---

## Education

### University of Porto
**Degree**: MSc
**Field**: Computer Science
**Location**: Porto | **Duration**: 2012 - 2017

---

## Certifications

- CKA: Certified Kubernetes Administrator
- AWS Solutions Architect

## Projects

- tern: a tiny scheduler

## Languages

- Portuguese (Native)
- English (Fluent)
";

    #[test]
    fn contact_block_scenario() {
        let cv = parse(
            "# John Doe\n\n## Contact Information\n- **Location**: SF\n- **Title**: Engineer",
        );
        assert_eq!(
            cv.personal_info,
            PersonalInfo {
                name: Some("John Doe".into()),
                email: None,
                phone: None,
                location: Some("SF".into()),
                title: Some("Engineer".into()),
            }
        );
    }

    #[test]
    fn single_experience_entry_scenario() {
        let cv = parse(
            "## Experience\n### Tech Corp | Senior Engineer\n**Location**: SF | **Duration**: 2021-Present",
        );
        assert_eq!(
            cv.experience,
            vec![ExperienceEntry {
                company: "Tech Corp".into(),
                title: Some("Senior Engineer".into()),
                location: Some("SF".into()),
                duration: Some("2021-Present".into()),
                description: None,
            }]
        );
    }

    #[test]
    fn experience_bullets_are_not_captured() {
        let cv = parse(
            "## Experience\n### Tech Corp | Senior Engineer\n**Location**: SF | **Duration**: 2021-Present\n- Built the platform\n- Hired the team",
        );
        assert_eq!(cv.experience.len(), 1);
        let entry = &cv.experience[0];
        assert_eq!(entry.location.as_deref(), Some("SF"));
        assert_eq!(entry.duration.as_deref(), Some("2021-Present"));
        assert_eq!(entry.description, None);
    }

    #[test]
    fn technical_skills_scenario() {
        let cv = parse("## Core Skills\n### Technical\n- Python\n- Go");
        assert_eq!(cv.skills.technical, vec!["Python", "Go"]);
        assert!(cv.skills.soft.is_empty());
        assert!(cv.skills.languages.is_empty());
    }

    #[test]
    fn headingless_text_yields_empty_record() {
        let cv = parse("Random text");
        assert_eq!(cv, ParsedCv::default());
    }

    #[test]
    fn empty_input_yields_empty_record() {
        assert_eq!(parse(""), ParsedCv::default());
    }

    #[test]
    fn parse_file_missing_path_is_not_found() {
        let err = parse_file(Path::new("/nonexistent/jobhunt/cv.md")).unwrap_err();
        assert!(matches!(err, CvError::NotFound { .. }));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn parse_file_reads_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.md");
        std::fs::write(&path, "# Test User\n\n## Contact Information\n- **Title**: Test Role").unwrap();

        let cv = parse_file(&path).unwrap();
        assert_eq!(cv.personal_info.name.as_deref(), Some("Test User"));
        assert_eq!(cv.personal_info.title.as_deref(), Some("Test Role"));
    }

    #[test]
    fn full_sample_personal_info() {
        let info = parse(SAMPLE_CV).personal_info;
        assert_eq!(info.name.as_deref(), Some("Marta Oliveira"));
        assert_eq!(info.email.as_deref(), Some("marta.oliveira@example.org"));
        assert_eq!(info.phone.as_deref(), Some("+351 912 345 678"));
        assert_eq!(
            info.location.as_deref(),
            Some("Rua das Flores 12, Porto, Portugal")
        );
        assert_eq!(info.title.as_deref(), Some("Platform Engineering Lead"));
    }

    #[test]
    fn full_sample_free_text_sections() {
        let cv = parse(SAMPLE_CV);
        assert_eq!(
            cv.professional_summary.as_deref(),
            Some("Engineering lead focused on developer platforms, reliability,\nand pragmatic delivery.")
        );
        assert_eq!(
            cv.certifications.as_deref(),
            Some("CKA: Certified Kubernetes Administrator\nAWS Solutions Architect")
        );
        assert_eq!(cv.projects.as_deref(), Some("tern: a tiny scheduler"));
    }

    #[test]
    fn full_sample_skills_buckets() {
        let skills = parse(SAMPLE_CV).skills;
        assert_eq!(
            skills.technical,
            vec!["Rust", "Kubernetes (EKS, GKE)", "PostgreSQL"]
        );
        assert_eq!(skills.soft, vec!["Mentoring", "Incident Command"]);
        assert_eq!(skills.languages, vec!["Portuguese"]);
    }

    #[test]
    fn full_sample_experience_in_document_order() {
        let experience = parse(SAMPLE_CV).experience;
        let companies: Vec<&str> = experience.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["Fintech Norte", "Lusa Logistics"]);

        let first = &experience[0];
        assert_eq!(first.title.as_deref(), Some("Staff Engineer - Platform"));
        assert_eq!(first.location.as_deref(), Some("Porto"));
        assert_eq!(first.duration.as_deref(), Some("Mar 2021 - Present"));
        assert_eq!(first.description, None);

        let second = &experience[1];
        assert_eq!(second.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(second.location.as_deref(), Some("Lisbon"));
        assert_eq!(second.duration.as_deref(), Some("Jan 2017 - Feb 2021"));
    }

    #[test]
    fn full_sample_education() {
        let education = parse(SAMPLE_CV).education;
        assert_eq!(
            education,
            vec![EducationEntry {
                school: "University of Porto".into(),
                degree: Some("MSc".into()),
                field: Some("Computer Science".into()),
                duration: Some("2012 - 2017".into()),
                location: Some("Porto".into()),
            }]
        );
    }

    #[test]
    fn full_sample_languages_verbatim() {
        assert_eq!(
            parse(SAMPLE_CV).languages,
            vec!["Portuguese (Native)", "English (Fluent)"]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse(SAMPLE_CV), parse(SAMPLE_CV));
    }

    #[test]
    fn blank_experience_header_is_dropped() {
        let cv = parse(
            "## Experience\n###   \n**Location**: Nowhere\n### Acme\n**Duration**: 2020",
        );
        assert_eq!(cv.experience.len(), 1);
        assert_eq!(cv.experience[0].company, "Acme");
        assert_eq!(cv.experience[0].title, None);
        assert_eq!(cv.experience[0].duration.as_deref(), Some("2020"));
    }

    #[test]
    fn text_before_first_entry_is_dropped() {
        let cv = parse(
            "## Experience\nFreelance Studio\n**Location**: Berlin\n### Acme | Engineer\n\n## Education\nSelf-taught\n### TU Berlin",
        );
        assert_eq!(cv.experience.len(), 1);
        assert_eq!(cv.experience[0].company, "Acme");
        assert_eq!(cv.experience[0].location, None);
        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].school, "TU Berlin");
    }

    #[test]
    fn header_with_empty_company_is_dropped() {
        let cv = parse("## Experience\n### | Ghost Title\n- did things");
        assert!(cv.experience.is_empty());
    }

    #[test]
    fn many_experience_entries_keep_order() {
        let mut text = String::from("## Work Experience\n");
        for i in 0..12 {
            text.push_str(&format!("### Company {i} | Role {i}\n- item\n\n"));
        }
        let experience = parse(&text).experience;
        assert_eq!(experience.len(), 12);
        for (i, entry) in experience.iter().enumerate() {
            assert_eq!(entry.company, format!("Company {i}"));
            assert_eq!(entry.title.as_deref(), Some(format!("Role {i}").as_str()));
        }
    }

    #[test]
    fn experience_section_ends_at_next_level_two_heading() {
        let cv = parse("## Experience\n### Acme | Dev\n## Education\n### Uni of Somewhere");
        assert_eq!(cv.experience.len(), 1);
        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].school, "Uni of Somewhere");
    }

    #[test]
    fn education_header_is_not_split() {
        let cv = parse("## Education\n### Anglia College | Computer Science BSc");
        assert_eq!(cv.education[0].school, "Anglia College | Computer Science BSc");
    }

    #[test]
    fn skills_without_subsections_fall_into_soft() {
        let cv = parse("## Skills\n- Negotiation\n-   \n* Writing");
        assert_eq!(cv.skills.soft, vec!["Negotiation", "Writing"]);
        assert!(cv.skills.technical.is_empty());
    }

    #[test]
    fn ambiguous_skill_labels_fall_through_to_soft() {
        let cv = parse("## Key Skills\n### Tools & Platforms\n- Jira\n### Spoken Languages\n- French");
        assert_eq!(cv.skills.soft, vec!["Jira"]);
        assert_eq!(cv.skills.languages, vec!["French"]);
    }

    #[test]
    fn missing_sections_are_none_or_empty() {
        let cv = parse("# Solo Name\n\nJust a line.");
        assert_eq!(cv.personal_info.name.as_deref(), Some("Solo Name"));
        assert!(cv.professional_summary.is_none());
        assert!(cv.certifications.is_none());
        assert!(cv.projects.is_none());
        assert!(cv.skills.is_empty());
        assert!(cv.experience.is_empty());
        assert!(cv.education.is_empty());
        assert!(cv.languages.is_empty());
    }

    #[test]
    fn awards_heading_is_an_alternative_for_certifications() {
        let cv = parse("## Awards & Recognition\n- Hackathon winner 2019");
        assert_eq!(cv.certifications.as_deref(), Some("Hackathon winner 2019"));
    }

    #[test]
    fn empty_section_body_is_none() {
        let cv = parse("## Projects\n\n---\n\n## Languages\n- Basque");
        assert!(cv.projects.is_none());
        assert_eq!(cv.languages, vec!["Basque"]);
    }

    #[test]
    fn name_must_be_within_first_lines() {
        let mut text = "filler\n".repeat(NAME_SCAN_LINES);
        text.push_str("# Late Name\n");
        assert_eq!(extract_name(&CvDocument::new(&text).lines), None);
    }

    #[test]
    fn level_two_heading_is_not_a_name() {
        assert_eq!(extract_name(&["## Not A Name", "# Real Name"]), Some("Real Name".into()));
    }

    #[test]
    fn email_requires_tld() {
        assert_eq!(extract_email("mail me at dev@localhost today"), None);
        assert_eq!(
            extract_email("contact: a.b+jobs@mail.example.co.uk"),
            Some("a.b+jobs@mail.example.co.uk".into())
        );
    }

    #[test]
    fn phone_skips_digitless_runs() {
        assert_eq!(extract_phone("----------\n(555) 010-2030"), Some("(555) 010-2030".into()));
        assert_eq!(extract_phone("call 555-0100"), None);
    }

    #[test]
    fn phone_accepts_long_numeric_ids() {
        // Known limitation: any long enough numeric run matches.
        assert_eq!(extract_phone("Order 12345678901"), Some("12345678901".into()));
    }

    #[test]
    fn labelled_location_beats_unlabelled_line() {
        let doc = CvDocument::new("# X\nlocation: Up Top\n\n## Contact\n**Location**: Labelled");
        assert_eq!(doc.personal_info().location.as_deref(), Some("Labelled"));
    }

    #[test]
    fn unlabelled_title_fallback_in_first_lines() {
        let doc = CvDocument::new("# X\nJob Title: Data Wrangler\n");
        assert_eq!(doc.personal_info().title.as_deref(), Some("Data Wrangler"));
    }

    #[test]
    fn unlabelled_fallback_ignores_lines_past_limit() {
        let mut text = "# X\n".to_string();
        text.push_str(&"\n".repeat(CONTACT_SCAN_LINES));
        text.push_str("Location: Too Far\n");
        assert_eq!(CvDocument::new(&text).personal_info().location, None);
    }

    #[test]
    fn labelled_fields_split_on_pipes() {
        let fields = labelled_fields("**Location**: SF | **Duration:** 2021-Present");
        assert_eq!(
            fields,
            vec![
                ("location".to_string(), "SF"),
                ("duration".to_string(), "2021-Present"),
            ]
        );
        assert!(labelled_fields("- plain bullet").is_empty());
    }

    #[test]
    fn section_locator_is_case_insensitive_and_first_match() {
        let doc = CvDocument::new("## EDUCATION\nfirst\n## Education\nsecond");
        let section = doc.section(&EDUCATION_HEADING).unwrap();
        assert_eq!(section, &["first"]);
    }

    #[test]
    fn section_locator_keeps_blank_lines_and_subheadings() {
        let doc = CvDocument::new("## Projects\n\n### One\n\nbody\n# Top\nafter");
        let section = doc.section(&PROJECTS_HEADING).unwrap();
        assert_eq!(section, &["", "### One", "", "body"]);
        assert!(doc.section(&SKILLS_HEADING).is_none());
    }

    #[test]
    fn heading_requires_space_after_hashes() {
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("####### seven"), None);
        assert_eq!(heading("### Entry ").map(|h| (h.level, h.text)), Some((3, "Entry")));
        assert_eq!(heading("##").map(|h| (h.level, h.text)), Some((2, "")));
    }

    #[test]
    fn bullets_and_rules() {
        assert_eq!(bullet("- item "), Some("item"));
        assert_eq!(bullet("  * nested"), Some("nested"));
        assert_eq!(bullet("-"), Some(""));
        assert_eq!(bullet("---"), None);
        assert_eq!(bullet("**Bold**: x"), None);
        assert!(is_rule("---"));
        assert!(is_rule("* * *"));
        assert!(!is_rule("--"));
        assert!(!is_rule("-a-"));
    }

    #[test]
    fn crlf_input_is_handled() {
        let cv = parse("# Win User\r\n## Skills\r\n### Technical\r\n- C#\r\n");
        assert_eq!(cv.personal_info.name.as_deref(), Some("Win User"));
        assert_eq!(cv.skills.technical, vec!["C#"]);
    }
}
