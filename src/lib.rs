//! # Job Hunter
//!
//! A local-first job search tracker built around a markdown CV extraction
//! engine.
//!
//! A CV written in markdown is parsed into structured data (personal info,
//! skills, experience, education, languages), stored as a user profile, and
//! matched against job postings ingested from public sources. Applications,
//! interviews and offers are tracked in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐
//! │  CV (.md)   │──▶│  cv_parser  │──▶│          │
//! └─────────────┘   └─────────────┘   │          │
//! ┌─────────────┐   ┌─────────────┐   │  SQLite  │
//! │   Sources   │──▶│   ingest    │──▶│          │
//! │ GH / MSFT   │   │   (dedup)   │   │          │
//! └─────────────┘   └─────────────┘   └────┬─────┘
//!                                          │
//!                                    ┌─────┴─────┐
//!                                    │    CLI    │
//!                                    │ (jobhunt) │
//!                                    └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! jobhunt init
//! jobhunt parse ./cv.md --pretty
//! jobhunt profile upload ./cv.md --titles "Backend Engineer" --remote remote
//! jobhunt scrape all --keyword rust --keyword go
//! jobhunt apply 12
//! jobhunt stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cv_parser`] | Markdown CV extraction |
//! | [`models`] | Core data types |
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`profile`] | User profiles and preferences |
//! | [`traits`] | Job source capability and registry |
//! | [`source_github`] | GitHub Jobs style aggregator |
//! | [`source_microsoft`] | Microsoft careers portal |
//! | [`ingest`] | Scrape pipeline with deduplication |
//! | [`jobs`] | Stored job queries |
//! | [`tracker`] | Applications, interviews, offers |
//! | [`stats`] | Database statistics |
//! | [`export`] | JSON profile export |

pub mod config;
pub mod cv_parser;
pub mod db;
pub mod export;
pub mod html;
pub mod ingest;
pub mod jobs;
pub mod migrate;
pub mod models;
pub mod profile;
pub mod progress;
pub mod source_github;
pub mod source_microsoft;
pub mod sources;
pub mod stats;
pub mod tracker;
pub mod traits;
