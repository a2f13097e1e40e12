//! Batch result reporting
//!
//! The core operations return outcome values; reporters turn them into
//! output. The console reporter prints one emoji status line per path, the
//! JSON reporter emits one object per path for scripting, and both feed the
//! summary that decides the exit code.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

/// Everything that can happen to one input path, across all operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Valid,
    Corrupt,
    Collision,
    RepackFailed,
    Created,
    CreateFailed,
    CleanupFailed,
    Renamed,
    Unchanged,
    Skipped,
    Error,
}

/// How an outcome counts in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn status(self) -> Status {
        match self {
            Self::Valid | Self::Created | Self::Renamed | Self::Unchanged => Status::Ok,
            Self::Skipped => Status::Skipped,
            Self::Corrupt
            | Self::Collision
            | Self::RepackFailed
            | Self::CreateFailed
            | Self::CleanupFailed
            | Self::Error => Status::Failed,
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            Self::Valid | Self::Created => "\u{2705}",          // ✅
            Self::Renamed => "\u{1F527}",                       // 🔧
            Self::Unchanged => "\u{23E9}",                      // ⏩
            Self::Collision | Self::CleanupFailed => "\u{26A0}\u{FE0F}", // ⚠️
            Self::Corrupt | Self::RepackFailed | Self::CreateFailed | Self::Skipped => {
                "\u{1F6D1}" // 🛑
            }
            Self::Error => "\u{2757}\u{FE0F}",                  // ❗️
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::Corrupt => "Corrupt",
            Self::Collision => "Collision",
            Self::RepackFailed => "Failed repack",
            Self::Created => "Created",
            Self::CreateFailed => "Failed creation",
            Self::CleanupFailed => "Failed cleanup",
            Self::Renamed => "Renamed",
            Self::Unchanged => "No change",
            Self::Skipped => "Skipped",
            Self::Error => "Error",
        }
    }
}

/// One line of the batch report
#[derive(Debug, Serialize)]
pub struct PathRecord {
    pub path: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PathRecord {
    pub fn new(path: &Path, outcome: Outcome) -> Self {
        Self {
            path: path.display().to_string(),
            outcome,
            final_path: None,
            detail: None,
        }
    }

    pub fn with_final_path(mut self, final_path: &Path) -> Self {
        self.final_path = Some(final_path.display().to_string());
        self
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }

    pub fn error(path: &Path, detail: String) -> Self {
        Self::new(path, Outcome::Error).with_detail(Some(detail))
    }
}

/// Per-batch tallies; drives the exit code
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub ok: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn tally(&mut self, record: &PathRecord) {
        match record.outcome.status() {
            Status::Ok => self.ok += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.failed + self.skipped
    }

    /// Nonzero when any input failed or could not be acted on
    pub fn exit_code(&self) -> u8 {
        if self.failed + self.skipped > 0 {
            1
        } else {
            0
        }
    }
}

/// Output sink for batch results
pub trait Reporter {
    fn record(&mut self, record: &PathRecord);
    fn summary(&mut self, summary: &BatchSummary);
}

/// Human-readable emoji status lines
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn record(&mut self, record: &PathRecord) {
        let mut line = format!(
            "{} {} \u{1F449} {}",
            record.outcome.glyph(),
            record.path,
            record.outcome.label()
        );
        if let Some(final_path) = &record.final_path {
            if final_path != &record.path {
                line.push_str(&format!(" \u{27A1}\u{FE0F} {}", final_path));
            }
        }
        if let Some(detail) = &record.detail {
            line.push_str(&format!(" ({})", detail));
        }
        let _ = writeln!(self.out, "{}", line);
    }

    fn summary(&mut self, summary: &BatchSummary) {
        let _ = writeln!(
            self.out,
            "\u{1F4CA} {} processed \u{1F449} {} ok, {} failed, {} skipped",
            summary.total(),
            summary.ok,
            summary.failed,
            summary.skipped
        );
    }
}

/// One JSON object per path, then a summary object
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn record(&mut self, record: &PathRecord) {
        if let Ok(json) = serde_json::to_string(record) {
            let _ = writeln!(self.out, "{}", json);
        }
    }

    fn summary(&mut self, summary: &BatchSummary) {
        let json = serde_json::json!({
            "total": summary.total(),
            "ok": summary.ok,
            "failed": summary.failed,
            "skipped": summary.skipped,
        });
        let _ = writeln!(self.out, "{}", json);
    }
}
