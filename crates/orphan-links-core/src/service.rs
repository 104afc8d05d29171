//! One entry point per use case.
//!
//! [`LinkService`] wires the scanner, the suggestion engine, and the orphan
//! index to a shared content source and repository. Frontends (CLI, HTTP)
//! construct one and call its operations with plain data.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::engine::SuggestionEngine;
use crate::models::{
    GenerateOutcome, OrphanPage, OrphanReportRow, ScanOutcome, StatusFilter, StatusUpdate,
    Suggestion, SuggestionStatus,
};
use crate::orphans::OrphanIndex;
use crate::scanner::OrphanScanner;
use crate::settings::AnalysisSettings;
use crate::store::{ContentSource, LinkRepository};

pub struct LinkService<C, R> {
    settings: AnalysisSettings,
    scanner: OrphanScanner<C, R>,
    engine: SuggestionEngine<C, R>,
    orphans: OrphanIndex<C, R>,
}

impl<C: ContentSource, R: LinkRepository> LinkService<C, R> {
    pub fn new(content: Arc<C>, repo: Arc<R>, settings: AnalysisSettings) -> Self {
        Self {
            scanner: OrphanScanner::new(content.clone(), repo.clone(), settings.clone()),
            engine: SuggestionEngine::new(content.clone(), repo.clone(), settings.clone()),
            orphans: OrphanIndex::new(content, repo),
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// `ScanBatch(batchSize > 0, offset >= 0)`.
    pub async fn scan_batch(&self, batch_size: usize, offset: usize) -> Result<ScanOutcome> {
        if batch_size == 0 {
            bail!("batch_size must be > 0");
        }
        self.scanner.scan_batch(batch_size, offset).await
    }

    /// Scan everything in batches, reporting after each one.
    pub async fn scan_all<F>(&self, batch_size: Option<usize>, on_batch: F) -> Result<usize>
    where
        F: FnMut(&ScanOutcome, usize),
    {
        let batch_size = batch_size.unwrap_or(self.settings.batch_size);
        if batch_size == 0 {
            bail!("batch_size must be > 0");
        }
        self.scanner.scan_all(batch_size, on_batch).await
    }

    pub async fn generate_suggestions(&self, target_doc_id: i64) -> Result<GenerateOutcome> {
        self.engine.generate(target_doc_id).await
    }

    pub async fn update_suggestion_status(
        &self,
        suggestion_id: i64,
        status: SuggestionStatus,
    ) -> Result<StatusUpdate> {
        self.engine.update_status(suggestion_id, status).await
    }

    /// Parses `status`; unknown values fail with `InvalidStatus` and change nothing.
    pub async fn update_suggestion_status_str(
        &self,
        suggestion_id: i64,
        status: &str,
    ) -> Result<StatusUpdate> {
        self.engine.update_status_str(suggestion_id, status).await
    }

    pub async fn get_suggestions(
        &self,
        target_doc_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Suggestion>> {
        self.engine.suggestions(target_doc_id, filter).await
    }

    pub async fn count_suggestions(&self, target_doc_id: i64, filter: StatusFilter) -> Result<u64> {
        self.engine.count_suggestions(target_doc_id, filter).await
    }

    pub async fn get_orphans(&self, limit: usize, offset: usize) -> Result<Vec<OrphanPage>> {
        self.orphans.list(limit, offset).await
    }

    pub async fn count_orphans(&self) -> Result<u64> {
        self.orphans.count().await
    }

    pub async fn build_report(&self, limit: usize) -> Result<Vec<OrphanReportRow>> {
        self.orphans.report(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::store::memory::{InMemoryContent, InMemoryRepository};

    fn doc(id: i64, title: &str, body: &str) -> Document {
        Document {
            id,
            title: title.to_string(),
            body: body.to_string(),
            published_at: id,
            doc_type: "post".to_string(),
            permalink: format!("https://example.com/p/{}/", id),
        }
    }

    fn service() -> LinkService<InMemoryContent, InMemoryRepository> {
        let content = InMemoryContent::new("https://example.com").with_documents(vec![
            doc(1, "Pour Over Basics", "Pour over coffee needs a gooseneck kettle."),
            doc(2, "Kettles", "A gooseneck kettle helps with pour over basics."),
            doc(3, "Hub", "Start at /p/2/ for kettles."),
        ]);
        LinkService::new(
            Arc::new(content),
            Arc::new(InMemoryRepository::new()),
            AnalysisSettings {
                exclude_high_link_density: false,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn scan_then_suggest_for_orphans() {
        let svc = service();
        let scanned = svc.scan_all(Some(2), |_, _| {}).await.unwrap();
        assert_eq!(scanned, 3);

        let orphans: Vec<i64> = svc
            .get_orphans(10, 0)
            .await
            .unwrap()
            .iter()
            .map(|o| o.doc.id)
            .collect();
        assert_eq!(orphans, vec![3, 1]);
        assert_eq!(svc.count_orphans().await.unwrap(), 2);

        let outcome = svc.generate_suggestions(1).await.unwrap();
        let suggestions = outcome.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source_doc_id, 2);
        assert_eq!(suggestions[0].anchor_text, "Pour Over Basics");
        assert_eq!(
            svc.count_suggestions(1, StatusFilter::default()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let svc = service();
        assert!(svc.scan_batch(0, 0).await.is_err());
    }

    #[tokio::test]
    async fn invalid_status_changes_nothing() {
        let svc = service();
        let outcome = svc.generate_suggestions(1).await.unwrap();
        let id = outcome.suggestions()[0].id;
        assert!(svc.update_suggestion_status_str(id, "done").await.is_err());
        let pending = svc
            .get_suggestions(1, StatusFilter::Only(SuggestionStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }
}
