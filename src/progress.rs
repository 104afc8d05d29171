//! Scan progress reporting.
//!
//! `olm scan` reports how far a full scan has got after every batch.
//! Progress goes to **stderr** so stdout stays parseable for scripts.

use std::io::Write;

use orphan_links_core::models::ScanOutcome;

/// A single progress event for a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanProgressEvent {
    /// A batch finished; `scanned` documents so far out of `total`.
    Batch { scanned: u64, total: u64 },
    /// The scan is complete.
    Done { scanned: u64, orphans: u64 },
}

impl ScanProgressEvent {
    pub fn from_outcome(outcome: &ScanOutcome, scanned: usize) -> Self {
        ScanProgressEvent::Batch {
            scanned: scanned as u64,
            total: outcome.total_posts,
        }
    }
}

/// Reports scan progress. Implementations write to stderr (human or JSON).
pub trait ScanProgressReporter: Send + Sync {
    fn report(&self, event: ScanProgressEvent);
}

/// Human-friendly progress: "scan  1,200 / 5,000 documents".
pub struct StderrProgress;

impl ScanProgressReporter for StderrProgress {
    fn report(&self, event: ScanProgressEvent) {
        let line = match &event {
            ScanProgressEvent::Batch { scanned, total } => format!(
                "scan  {} / {} documents\n",
                format_number(*scanned),
                format_number(*total)
            ),
            ScanProgressEvent::Done { scanned, orphans } => format!(
                "scan  done  {} documents, {} orphans\n",
                format_number(*scanned),
                format_number(*orphans)
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// One JSON object per line on stderr.
pub struct JsonProgress;

impl ScanProgressReporter for JsonProgress {
    fn report(&self, event: ScanProgressEvent) {
        let obj = match &event {
            ScanProgressEvent::Batch { scanned, total } => serde_json::json!({
                "event": "progress",
                "phase": "scanning",
                "n": scanned,
                "total": total
            }),
            ScanProgressEvent::Done { scanned, orphans } => serde_json::json!({
                "event": "progress",
                "phase": "done",
                "n": scanned,
                "orphans": orphans
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

pub struct NoProgress;

impl ScanProgressReporter for NoProgress {
    fn report(&self, _event: ScanProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Progress mode for `olm scan`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Resolve the `--progress` flag; `None` falls back to the TTY default.
    pub fn from_flag(flag: Option<&str>) -> anyhow::Result<Self> {
        match flag {
            None => Ok(Self::default_for_tty()),
            Some("off") => Ok(ProgressMode::Off),
            Some("human") => Ok(ProgressMode::Human),
            Some("json") => Ok(ProgressMode::Json),
            Some(other) => anyhow::bail!(
                "unknown progress mode '{}' (expected off, human, or json)",
                other
            ),
        }
    }

    pub fn reporter(&self) -> Box<dyn ScanProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(12_345), "12,345");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn progress_flag_parsing() {
        assert_eq!(ProgressMode::from_flag(Some("json")).unwrap(), ProgressMode::Json);
        assert_eq!(ProgressMode::from_flag(Some("off")).unwrap(), ProgressMode::Off);
        assert!(ProgressMode::from_flag(Some("loud")).is_err());
    }

    #[test]
    fn batch_event_carries_running_total() {
        let outcome = ScanOutcome {
            completed: false,
            processed: 20,
            total_posts: 45,
        };
        assert_eq!(
            ScanProgressEvent::from_outcome(&outcome, 40),
            ScanProgressEvent::Batch {
                scanned: 40,
                total: 45
            }
        );
    }
}
