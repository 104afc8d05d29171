//! Analysis tuning parameters, decoupled from application config.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Settings consumed read-only by the scanner and the suggestion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Document types included in scans and candidate corpora.
    pub post_types: Vec<String>,
    /// Minimum relevance (0–100) for a sentence to become a suggestion.
    pub min_relevance_score: u8,
    /// Upper bound on suggestions kept per target.
    pub max_suggestions_per_page: usize,
    /// Default scan batch size.
    pub batch_size: usize,
    /// Skip candidate sources whose link density exceeds the threshold.
    pub exclude_high_link_density: bool,
    /// Link density threshold in percent (0–100).
    pub link_density_threshold: u8,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            post_types: vec!["post".to_string(), "page".to_string()],
            min_relevance_score: 50,
            max_suggestions_per_page: 10,
            batch_size: 20,
            exclude_high_link_density: true,
            link_density_threshold: 5,
        }
    }
}

impl AnalysisSettings {
    /// Check ranges. Called once when settings are loaded.
    pub fn validate(&self) -> Result<()> {
        if self.post_types.is_empty() || self.post_types.iter().any(|t| t.trim().is_empty()) {
            bail!("analysis.post_types must list at least one non-empty type");
        }
        if self.min_relevance_score > 100 {
            bail!("analysis.min_relevance_score must be in [0, 100]");
        }
        if self.max_suggestions_per_page == 0 {
            bail!("analysis.max_suggestions_per_page must be >= 1");
        }
        if self.batch_size == 0 {
            bail!("analysis.batch_size must be >= 1");
        }
        if self.link_density_threshold > 100 {
            bail!("analysis.link_density_threshold must be in [0, 100]");
        }
        Ok(())
    }
}
