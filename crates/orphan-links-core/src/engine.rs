//! Suggestion generation for orphaned documents.
//!
//! # Algorithm
//!
//! 1. Extract the target's keywords; fail with `NoKeywords` when there are none.
//! 2. Load every published candidate of the configured types except the target.
//! 3. Skip candidates that already link to the target, and (when enabled)
//!    candidates whose link density exceeds the threshold.
//! 4. Split each candidate into paragraphs and sentences and score every
//!    sentence against the target.
//! 5. Keep sentences with `score > 0` and `score >= min_relevance_score`.
//! 6. Stable-sort by score (descending) so ties stay in discovery order
//!    (document, then paragraph, then sentence).
//! 7. Truncate to `max_suggestions_per_page` and atomically replace the
//!    target's stored suggestion set.
//!
//! Generation for one target is serialized through a per-target async lock,
//! so two concurrent runs for the same target cannot interleave their
//! replace steps. Different targets proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::keywords::extract_keywords;
use crate::links::{link_density, LinkTarget};
use crate::models::{
    Document, GenerateOutcome, StatusFilter, StatusUpdate, Suggestion, SuggestionCandidate,
    SuggestionStatus,
};
use crate::relevance::score_sentence;
use crate::segment::{split_paragraphs, split_sentences};
use crate::settings::AnalysisSettings;
use crate::store::{ContentSource, LinkRepository};

/// Single-writer gate keyed by target document id.
#[derive(Default)]
struct TargetLocks {
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl TargetLocks {
    fn handle(&self, target_doc_id: i64) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| anyhow!("target lock table poisoned"))?;
        Ok(locks.entry(target_doc_id).or_default().clone())
    }

    /// Drop the entry for `target_doc_id` unless another caller holds or
    /// waits on it. `gate` is the caller's own handle.
    fn release(&self, target_doc_id: i64, gate: Arc<tokio::sync::Mutex<()>>) -> Result<()> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| anyhow!("target lock table poisoned"))?;
        // One reference in the table, one in `gate`.
        if Arc::strong_count(&gate) == 2 {
            locks.remove(&target_doc_id);
        }
        Ok(())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Finds, ranks, and persists link suggestions for target documents.
pub struct SuggestionEngine<C, R> {
    content: Arc<C>,
    repo: Arc<R>,
    settings: AnalysisSettings,
    locks: TargetLocks,
}

impl<C: ContentSource, R: LinkRepository> SuggestionEngine<C, R> {
    pub fn new(content: Arc<C>, repo: Arc<R>, settings: AnalysisSettings) -> Self {
        Self {
            content,
            repo,
            settings,
            locks: TargetLocks::default(),
        }
    }

    /// Regenerate the suggestion set for `target_doc_id`.
    ///
    /// Domain failures (unknown target, no keywords) come back as
    /// [`GenerateOutcome::Failed`] and leave the stored set untouched.
    /// Storage failures are returned as `Err`.
    pub async fn generate(&self, target_doc_id: i64) -> Result<GenerateOutcome> {
        let gate = self.locks.handle(target_doc_id)?;
        let outcome = {
            let _guard = gate.lock().await;
            self.generate_locked(target_doc_id).await
        };
        self.locks.release(target_doc_id, gate)?;
        outcome
    }

    async fn generate_locked(&self, target_doc_id: i64) -> Result<GenerateOutcome> {
        let target = match self.content.get_document(target_doc_id).await? {
            Some(doc) => doc,
            None => {
                let err = AnalysisError::InvalidTarget(target_doc_id);
                warn!(target_doc_id, "{}", err);
                return Ok(GenerateOutcome::failed(err.to_string()));
            }
        };

        let keywords = extract_keywords(&target.title, &target.body);
        if keywords.is_empty() {
            let err = AnalysisError::NoKeywords(target_doc_id);
            info!(target_doc_id, "{}", err);
            return Ok(GenerateOutcome::failed(err.to_string()));
        }
        debug!(target_doc_id, ?keywords, "target keywords");

        let permalink = self
            .content
            .permalink_of(target_doc_id)
            .await?
            .unwrap_or_else(|| target.permalink.clone());
        let link_target = LinkTarget::new(&permalink, self.content.site_root());

        let candidates = self
            .content
            .list_published(&self.settings.post_types, None, 0)
            .await?;

        let mut found: Vec<SuggestionCandidate> = Vec::new();
        let mut skipped_linked = 0usize;
        let mut skipped_dense = 0usize;

        for source in candidates.iter().filter(|d| d.id != target_doc_id) {
            if link_target.is_linked_from(&source.body) {
                skipped_linked += 1;
                continue;
            }
            if self.settings.exclude_high_link_density
                && link_density(&source.body) > f64::from(self.settings.link_density_threshold)
            {
                skipped_dense += 1;
                continue;
            }
            found.extend(find_opportunities(
                source,
                &keywords,
                &target.title,
                self.settings.min_relevance_score,
            ));
        }

        let ranked = rank_candidates(found, self.settings.max_suggestions_per_page);
        let now = Utc::now().timestamp();
        let stored = self
            .repo
            .replace_suggestions(target_doc_id, &ranked, now)
            .await?;

        info!(
            target_doc_id,
            count = stored.len(),
            skipped_linked,
            skipped_dense,
            "generated suggestions"
        );
        Ok(GenerateOutcome::generated(stored))
    }

    /// Stored suggestions for a target, highest score first.
    pub async fn suggestions(
        &self,
        target_doc_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Suggestion>> {
        self.repo.suggestions_for(target_doc_id, filter).await
    }

    pub async fn count_suggestions(&self, target_doc_id: i64, filter: StatusFilter) -> Result<u64> {
        self.repo.count_suggestions(target_doc_id, filter).await
    }

    /// Move a suggestion to `status` if its current status allows it.
    ///
    /// The transition check happens inside the repository's conditional
    /// write, so two concurrent reviews cannot both succeed with
    /// conflicting decisions.
    pub async fn update_status(
        &self,
        suggestion_id: i64,
        status: SuggestionStatus,
    ) -> Result<StatusUpdate> {
        let allowed = SuggestionStatus::allowed_predecessors(status);
        let result = self
            .repo
            .set_suggestion_status(suggestion_id, &allowed, status)
            .await?;
        match result {
            StatusUpdate::Updated => {
                debug!(suggestion_id, to = %status, "suggestion status updated");
            }
            StatusUpdate::NotFound => {
                debug!(suggestion_id, "status update for unknown suggestion");
            }
            StatusUpdate::NotAllowed { current } => {
                warn!(
                    suggestion_id,
                    from = %current,
                    to = %status,
                    "status transition not allowed"
                );
            }
        }
        Ok(result)
    }

    /// Like [`update_status`](Self::update_status), parsing the status from
    /// text. Unknown statuses fail with [`AnalysisError::InvalidStatus`].
    pub async fn update_status_str(
        &self,
        suggestion_id: i64,
        status: &str,
    ) -> Result<StatusUpdate> {
        let status: SuggestionStatus = status.parse()?;
        self.update_status(suggestion_id, status).await
    }
}

/// Score every sentence of `source` against the target and keep those that
/// clear the threshold, in discovery order.
pub fn find_opportunities(
    source: &Document,
    keywords: &[String],
    target_title: &str,
    min_relevance_score: u8,
) -> Vec<SuggestionCandidate> {
    let mut out = Vec::new();
    for paragraph in split_paragraphs(&source.body) {
        for sentence in split_sentences(paragraph.text) {
            let relevance = score_sentence(sentence, keywords, target_title);
            if relevance.score == 0 || relevance.score < min_relevance_score {
                continue;
            }
            out.push(SuggestionCandidate {
                source_doc_id: source.id,
                paragraph_index: paragraph.index,
                sentence_text: sentence.trim().to_string(),
                anchor_text: relevance.anchor_text,
                relevance_score: relevance.score,
            });
        }
    }
    out
}

/// Sort by descending score, keeping discovery order among ties, and keep
/// the first `limit`.
pub fn rank_candidates(
    mut candidates: Vec<SuggestionCandidate>,
    limit: usize,
) -> Vec<SuggestionCandidate> {
    candidates.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    candidates.truncate(limit);
    candidates
}
