//! Core data models used throughout Orphan Links.
//!
//! Documents are owned by the host content system and reach the core as
//! read-only values. Everything else here is produced by the scanner or the
//! suggestion engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A published document as seen by the core.
///
/// `body` is plain text; markup and shortcodes are removed by the host
/// before the document reaches the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Unix timestamp (seconds).
    pub published_at: i64,
    /// Content type tag, e.g. `post` or `page`.
    pub doc_type: String,
    /// Absolute URL of the document.
    pub permalink: String,
}

/// Review state of a single suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
        }
    }

    /// Whether a reviewer may move a suggestion from `self` to `next`.
    ///
    /// Pending may go to accepted or rejected; accepted and rejected may only
    /// be reset to pending. Re-applying the current state is a no-op and is
    /// allowed.
    pub fn can_transition_to(&self, next: SuggestionStatus) -> bool {
        use SuggestionStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Accepted, Pending)
                | (Rejected, Pending)
                | (Pending, Pending)
                | (Accepted, Accepted)
                | (Rejected, Rejected)
        )
    }

    /// Every status that may move to `next`.
    pub fn allowed_predecessors(next: SuggestionStatus) -> Vec<SuggestionStatus> {
        use SuggestionStatus::*;
        [Pending, Accepted, Rejected]
            .into_iter()
            .filter(|s| s.can_transition_to(next))
            .collect()
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuggestionStatus {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuggestionStatus::Pending),
            "accepted" => Ok(SuggestionStatus::Accepted),
            "rejected" => Ok(SuggestionStatus::Rejected),
            other => Err(AnalysisError::InvalidStatus(other.to_string())),
        }
    }
}

/// Result of a conditional status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    NotFound,
    /// The suggestion exists but its status may not move to the requested one.
    NotAllowed { current: SuggestionStatus },
}

impl StatusUpdate {
    pub fn is_updated(&self) -> bool {
        matches!(self, StatusUpdate::Updated)
    }
}

/// Status filter for suggestion reads: one status, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(SuggestionStatus),
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: SuggestionStatus) -> bool {
        match self {
            StatusFilter::Only(s) => *s == status,
            StatusFilter::All => true,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(SuggestionStatus::Pending)
    }
}

impl FromStr for StatusFilter {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// A scored link opportunity found in a source document, before it is
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionCandidate {
    pub source_doc_id: i64,
    pub paragraph_index: usize,
    pub sentence_text: String,
    pub anchor_text: String,
    pub relevance_score: u8,
}

/// A persisted suggestion.
///
/// `id` is assigned by the repository and is only stable until the next
/// regeneration for the same target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub target_doc_id: i64,
    pub source_doc_id: i64,
    pub paragraph_index: usize,
    pub sentence_text: String,
    pub anchor_text: String,
    pub relevance_score: u8,
    pub status: SuggestionStatus,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// Inbound-link record written by the scanner, keyed by `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub doc_id: i64,
    pub link_count: u32,
    /// Unix timestamp (seconds) of the scan that produced this record.
    pub last_scanned: i64,
    pub is_orphan: bool,
}

impl PageRecord {
    pub fn new(doc_id: i64, link_count: u32, last_scanned: i64) -> Self {
        Self {
            doc_id,
            link_count,
            last_scanned,
            is_orphan: link_count == 0,
        }
    }
}

/// An orphan joined with its document.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanPage {
    pub doc: Document,
    pub link_count: u32,
    pub last_scanned: i64,
}

/// Result of one `scan_batch` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// True once the batch came back short, i.e. there is nothing left.
    pub completed: bool,
    pub processed: usize,
    /// Running total of documents of the configured types, for progress display.
    pub total_posts: u64,
}

/// Result of `SuggestionEngine::generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerateOutcome {
    Generated {
        success: bool,
        count: usize,
        suggestions: Vec<Suggestion>,
    },
    Failed {
        success: bool,
        message: String,
    },
}

impl GenerateOutcome {
    pub fn generated(suggestions: Vec<Suggestion>) -> Self {
        GenerateOutcome::Generated {
            success: true,
            count: suggestions.len(),
            suggestions,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        GenerateOutcome::Failed {
            success: false,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerateOutcome::Generated { .. })
    }

    /// The persisted suggestions, empty on failure.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            GenerateOutcome::Generated { suggestions, .. } => suggestions,
            GenerateOutcome::Failed { .. } => &[],
        }
    }
}

/// One row of the orphan report.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanReportRow {
    pub doc_id: i64,
    pub title: String,
    pub permalink: String,
    pub doc_type: String,
    pub published_at: i64,
    pub total_suggestions: u64,
    pub pending_suggestions: u64,
    pub accepted_suggestions: u64,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert_eq!(
            "accepted".parse::<SuggestionStatus>().unwrap(),
            SuggestionStatus::Accepted
        );
        assert!(matches!(
            "archived".parse::<SuggestionStatus>(),
            Err(AnalysisError::InvalidStatus(_))
        ));
    }

    #[test]
    fn filter_parses_all() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "rejected".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(SuggestionStatus::Rejected)
        );
        assert!("".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn transitions_always_allow_reset() {
        use SuggestionStatus::*;
        assert!(Accepted.can_transition_to(Pending));
        assert!(Rejected.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Accepted));
    }

    #[test]
    fn predecessors_exclude_the_other_decision() {
        use SuggestionStatus::*;
        assert_eq!(
            SuggestionStatus::allowed_predecessors(Rejected),
            vec![Pending, Rejected]
        );
        assert_eq!(
            SuggestionStatus::allowed_predecessors(Pending),
            vec![Pending, Accepted, Rejected]
        );
    }

    #[test]
    fn page_record_orphan_flag() {
        assert!(PageRecord::new(1, 0, 0).is_orphan);
        assert!(!PageRecord::new(1, 2, 0).is_orphan);
    }

    #[test]
    fn failed_outcome_serializes_flat() {
        let json = serde_json::to_value(GenerateOutcome::failed("No keywords found")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "No keywords found");
    }
}
