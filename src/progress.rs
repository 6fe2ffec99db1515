//! Scrape progress reporting.
//!
//! Progress is emitted on **stderr** so stdout stays parseable for scripts.

use std::io::Write;

/// A single progress event for `jobhunt scrape`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrapeProgressEvent {
    /// A page request is about to be sent.
    Fetching {
        source: String,
        keyword: String,
        page: u32,
    },
    /// A page has been parsed and stored.
    Stored {
        source: String,
        keyword: String,
        page: u32,
        fetched: u64,
        inserted: u64,
    },
}

/// Reports scrape progress. Implementations write to stderr (human or JSON).
pub trait ScrapeProgressReporter: Send + Sync {
    fn report(&self, event: ScrapeProgressEvent);
}

/// Human-friendly progress: "scrape github 'rust' page 2  fetched 50, new 12".
pub struct StderrProgress;

impl StderrProgress {
    fn render(event: &ScrapeProgressEvent) -> String {
        match event {
            ScrapeProgressEvent::Fetching {
                source,
                keyword,
                page,
            } => format!("scrape {} '{}' page {}  fetching...\n", source, keyword, page),
            ScrapeProgressEvent::Stored {
                source,
                keyword,
                page,
                fetched,
                inserted,
            } => format!(
                "scrape {} '{}' page {}  fetched {}, new {}\n",
                source,
                keyword,
                page,
                format_number(*fetched),
                format_number(*inserted)
            ),
        }
    }
}

impl ScrapeProgressReporter for StderrProgress {
    fn report(&self, event: ScrapeProgressEvent) {
        let line = Self::render(&event);
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl JsonProgress {
    fn render(event: &ScrapeProgressEvent) -> serde_json::Value {
        match event {
            ScrapeProgressEvent::Fetching {
                source,
                keyword,
                page,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "keyword": keyword,
                "page": page,
                "phase": "fetching"
            }),
            ScrapeProgressEvent::Stored {
                source,
                keyword,
                page,
                fetched,
                inserted,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "keyword": keyword,
                "page": page,
                "phase": "stored",
                "fetched": fetched,
                "inserted": inserted
            }),
        }
    }
}

impl ScrapeProgressReporter for JsonProgress {
    fn report(&self, event: ScrapeProgressEvent) {
        if let Ok(line) = serde_json::to_string(&Self::render(&event)) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ScrapeProgressReporter for NoProgress {
    fn report(&self, _event: ScrapeProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ScrapeProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
