//! # Job Hunter CLI (`jobhunt`)
//!
//! The `jobhunt` binary is the primary interface for Job Hunter. It provides
//! commands for database initialization, CV parsing, profile management, job
//! ingestion, and application tracking.
//!
//! ## Usage
//!
//! ```bash
//! jobhunt --config ./config/jobhunt.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jobhunt init` | Create the SQLite database and run schema migrations |
//! | `jobhunt parse <cv>` | Print the structured extraction of a markdown CV |
//! | `jobhunt profile upload <cv>` | Create or refresh a profile from a CV |
//! | `jobhunt sources` | List job sources and whether they are enabled |
//! | `jobhunt scrape <source>` | Fetch postings and store new ones |
//! | `jobhunt jobs list` | List stored jobs |
//! | `jobhunt apply <job>` | Record an application |
//! | `jobhunt applications list` | Show tracked applications |
//! | `jobhunt stats` | Database summary |
//! | `jobhunt export` | Dump a profile with its applications as JSON |
//!
//! ## Examples
//!
//! ```bash
//! jobhunt init
//! jobhunt profile upload ./cv.md --titles "Backend Engineer,Platform Engineer" --remote hybrid
//! jobhunt scrape github --keyword rust --max-pages 2
//! jobhunt apply 7 --method email --notes "referred by Ana"
//! jobhunt interview add 1 --at 2026-11-03T14:30 --type video
//! jobhunt offer add 1 --salary 85000 --benefit "remote stipend"
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use job_hunter::config;
use job_hunter::export;
use job_hunter::ingest;
use job_hunter::jobs::{self, JobFilter};
use job_hunter::migrate;
use job_hunter::models::{ApplicationStatus, ExperienceLevel, InterviewType, RemotePreference};
use job_hunter::profile::{self, PreferencesUpdate};
use job_hunter::progress::ProgressMode;
use job_hunter::sources;
use job_hunter::stats;
use job_hunter::tracker::{self, NewInterview, NewOffer};

/// Job Hunter CLI: a local-first job search tracker.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/jobhunt.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "jobhunt",
    about = "Job Hunter: a local-first job search tracker",
    version,
    long_about = "Job Hunter parses a markdown CV into a structured profile, ingests job \
    postings from public sources into SQLite, and tracks applications, interviews and offers."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/jobhunt.toml`; built-in defaults are used when
    /// that file does not exist. `DATABASE_URL` overrides the database path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it against an existing database is safe.
    Init,

    /// Parse a markdown CV and print the extraction as JSON.
    ///
    /// Does not touch the database.
    Parse {
        /// Path to the CV file.
        cv: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Manage user profiles.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// List job sources and their configuration.
    Sources,

    /// Fetch job postings from a source and store the new ones.
    ///
    /// Source format: `all`, `github`, or `microsoft`. Postings already
    /// stored (same source and source job id) are skipped.
    Scrape {
        /// Source to scrape: `all` or a source name.
        source: String,

        /// Search keyword. Repeat for several keywords.
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,

        /// Location filter passed to the source.
        #[arg(long)]
        location: Option<String>,

        /// Pages to fetch per keyword. Overrides `[scrape].max_pages`.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Fetch and parse one page per source without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Progress output on stderr. Defaults to `human` on a terminal, `off` otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Browse stored jobs.
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Apply to a stored job.
    Apply {
        /// Job id (see `jobhunt jobs list`).
        job_id: i64,

        /// Profile to apply with. Defaults to the first profile.
        #[arg(long)]
        user_id: Option<i64>,

        /// How the application was sent (e.g. `email`, `portal`).
        #[arg(long)]
        method: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Track applications.
    Applications {
        #[command(subcommand)]
        action: ApplicationsAction,
    },

    /// Schedule interviews.
    Interview {
        #[command(subcommand)]
        action: InterviewAction,
    },

    /// Record and decide offers.
    Offer {
        #[command(subcommand)]
        action: OfferAction,
    },

    /// Show database statistics.
    Stats,

    /// Export a profile with its applications as JSON.
    Export {
        #[arg(long)]
        user_id: Option<i64>,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create or refresh a profile from a CV.
    ///
    /// List flags accept repeated values or comma-separated lists.
    Upload {
        /// Path to the CV file.
        cv: PathBuf,

        /// Target job titles.
        #[arg(long)]
        titles: Vec<String>,

        /// Target industries.
        #[arg(long)]
        industries: Vec<String>,

        /// Preferred locations.
        #[arg(long)]
        locations: Vec<String>,

        #[arg(long)]
        salary_min: Option<f64>,

        #[arg(long)]
        salary_max: Option<f64>,

        /// One of: junior, mid, senior, lead.
        #[arg(long)]
        experience: Option<String>,

        /// One of: onsite, hybrid, remote.
        #[arg(long)]
        remote: Option<String>,

        /// Contract types (e.g. `full-time`, `contract`).
        #[arg(long)]
        contracts: Vec<String>,
    },

    /// Show a profile with its preferences and extracted skills.
    Show {
        /// Defaults to the first profile.
        #[arg(long)]
        user_id: Option<i64>,
    },

    /// List all profiles.
    List,
}

#[derive(Subcommand)]
enum JobsAction {
    /// List stored jobs, most recently posted first.
    List {
        #[arg(long)]
        source: Option<String>,

        /// Case-insensitive substring match on the company name.
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show one job with its full description.
    Show { id: i64 },
}

#[derive(Subcommand)]
enum ApplicationsAction {
    /// List applications, newest first.
    List {
        #[arg(long)]
        user_id: Option<i64>,

        /// Only applications in this status.
        #[arg(long)]
        status: Option<String>,
    },

    /// Show an application with its interviews and offers.
    Show { id: i64 },

    /// Move an application to a new status.
    Status {
        id: i64,

        /// One of: applied, reviewing, interview, rejected, offer, withdrawn.
        status: String,

        /// Appended to the application's notes.
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum InterviewAction {
    /// Schedule an interview for an application.
    Add {
        application_id: i64,

        /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM` (UTC).
        #[arg(long)]
        at: String,

        /// One of: phone, video, in-person.
        #[arg(long = "type")]
        interview_type: Option<String>,

        #[arg(long)]
        interviewer: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum OfferAction {
    /// Record an offer for an application.
    Add {
        application_id: i64,

        #[arg(long)]
        salary: Option<f64>,

        /// Start date, `YYYY-MM-DD`.
        #[arg(long)]
        start: Option<String>,

        /// Response deadline, `YYYY-MM-DD`.
        #[arg(long)]
        expires: Option<String>,

        /// A benefit line. Repeat for several.
        #[arg(long = "benefit")]
        benefits: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Accept a pending offer.
    Accept { id: i64 },

    /// Reject a pending offer.
    Reject { id: i64 },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Commands that don't require config
    match &cli.command {
        Commands::Parse { cv, pretty } => {
            return profile::run_parse(cv, *pretty);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "jobhunt", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let cfg = config::resolve_config(cli.config.as_deref())?;
    log::debug!("using database {}", cfg.db.path.display());

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Profile { action } => match action {
            ProfileAction::Upload {
                cv,
                titles,
                industries,
                locations,
                salary_min,
                salary_max,
                experience,
                remote,
                contracts,
            } => {
                let prefs = PreferencesUpdate {
                    target_titles: profile::non_empty_list(profile::parse_list_input(&titles)),
                    target_industries: profile::non_empty_list(profile::parse_list_input(
                        &industries,
                    )),
                    preferred_locations: profile::non_empty_list(profile::parse_list_input(
                        &locations,
                    )),
                    salary_min,
                    salary_max,
                    experience_level: experience
                        .map(|s| s.parse::<ExperienceLevel>())
                        .transpose()?,
                    remote_preference: remote
                        .map(|s| s.parse::<RemotePreference>())
                        .transpose()?,
                    contract_types: profile::non_empty_list(profile::parse_list_input(&contracts)),
                };
                profile::run_upload(&cfg, &cv, &prefs).await?;
            }
            ProfileAction::Show { user_id } => {
                profile::run_show(&cfg, user_id).await?;
            }
            ProfileAction::List => {
                profile::run_list(&cfg).await?;
            }
        },
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Scrape {
            source,
            keywords,
            location,
            max_pages,
            dry_run,
            progress,
        } => {
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_scrape(
                &cfg,
                &source,
                &keywords,
                location.as_deref(),
                max_pages,
                dry_run,
                progress,
            )
            .await?;
        }
        Commands::Jobs { action } => match action {
            JobsAction::List {
                source,
                company,
                limit,
            } => {
                let filter = JobFilter {
                    source,
                    company,
                    limit,
                };
                jobs::run_list(&cfg, &filter).await?;
            }
            JobsAction::Show { id } => {
                jobs::run_show(&cfg, id).await?;
            }
        },
        Commands::Apply {
            job_id,
            user_id,
            method,
            notes,
        } => {
            tracker::run_apply(&cfg, job_id, user_id, method.as_deref(), notes.as_deref())
                .await?;
        }
        Commands::Applications { action } => match action {
            ApplicationsAction::List { user_id, status } => {
                let status = status
                    .map(|s| s.parse::<ApplicationStatus>())
                    .transpose()?;
                tracker::run_list(&cfg, user_id, status).await?;
            }
            ApplicationsAction::Show { id } => {
                tracker::run_show(&cfg, id).await?;
            }
            ApplicationsAction::Status { id, status, notes } => {
                let status = status.parse::<ApplicationStatus>()?;
                tracker::run_status(&cfg, id, status, notes.as_deref()).await?;
            }
        },
        Commands::Interview { action } => match action {
            InterviewAction::Add {
                application_id,
                at,
                interview_type,
                interviewer,
                notes,
            } => {
                let interview = NewInterview {
                    scheduled_at: tracker::parse_when(&at)?,
                    interview_type: interview_type
                        .map(|s| s.parse::<InterviewType>())
                        .transpose()?,
                    interviewer_name: interviewer,
                    notes,
                };
                tracker::run_add_interview(&cfg, application_id, &interview).await?;
            }
        },
        Commands::Offer { action } => match action {
            OfferAction::Add {
                application_id,
                salary,
                start,
                expires,
                benefits,
                notes,
            } => {
                let offer = NewOffer {
                    salary,
                    benefits,
                    start_date: start.as_deref().map(tracker::parse_date).transpose()?,
                    expires_at: expires.as_deref().map(tracker::parse_date).transpose()?,
                    notes,
                };
                tracker::run_add_offer(&cfg, application_id, &offer).await?;
            }
            OfferAction::Accept { id } => {
                tracker::run_decide_offer(&cfg, id, true).await?;
            }
            OfferAction::Reject { id } => {
                tracker::run_decide_offer(&cfg, id, false).await?;
            }
        },
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Export { user_id, output } => {
            export::run_export(&cfg, user_id, output.as_deref()).await?;
        }
        Commands::Parse { .. } | Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
