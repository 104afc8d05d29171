use thiserror::Error;

/// Domain failures reported by the analysis pipeline.
///
/// Storage failures are not represented here; they travel as
/// `anyhow::Error` from the ports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No keywords found for document {0}")]
    NoKeywords(i64),

    #[error("Invalid target document: {0}")]
    InvalidTarget(i64),

    #[error("Invalid status: '{0}'. Must be pending, accepted, or rejected.")]
    InvalidStatus(String),
}
