//! Orphan detection by inbound-link counting.
//!
//! The scanner works in caller-driven batches: each [`OrphanScanner::scan_batch`]
//! call fetches one page of published documents, counts how many other
//! published documents mention each one's permalink, and upserts a
//! [`PageRecord`] per document. No state is kept between calls, so a
//! scan can be abandoned or resumed at any offset. A document scanned twice
//! simply overwrites its record.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use crate::links::LinkTarget;
use crate::models::{Document, PageRecord, ScanOutcome};
use crate::settings::AnalysisSettings;
use crate::store::{ContentSource, LinkRepository};

/// Stateless batch scanner over a content source.
pub struct OrphanScanner<C, R> {
    content: Arc<C>,
    repo: Arc<R>,
    settings: AnalysisSettings,
}

impl<C: ContentSource, R: LinkRepository> OrphanScanner<C, R> {
    pub fn new(content: Arc<C>, repo: Arc<R>, settings: AnalysisSettings) -> Self {
        Self {
            content,
            repo,
            settings,
        }
    }

    /// Scan one batch of `batch_size` documents starting at `offset`.
    ///
    /// An empty page means the scan is over and returns
    /// `{completed: true, processed: 0}` right away.
    pub async fn scan_batch(&self, batch_size: usize, offset: usize) -> Result<ScanOutcome> {
        let types = &self.settings.post_types;
        let batch = self
            .content
            .list_published(types, Some(batch_size), offset)
            .await?;

        if batch.is_empty() {
            debug!(offset, "scan batch empty, nothing left to scan");
            return Ok(ScanOutcome {
                completed: true,
                processed: 0,
                total_posts: self.content.count_published(types).await?,
            });
        }

        let corpus = self.content.list_published(types, None, 0).await?;
        let site_root = self.content.site_root().to_string();
        let now = Utc::now().timestamp();

        let mut processed = 0;
        for doc in &batch {
            let link_count = count_inbound_links(doc, &corpus, &site_root);
            let record = PageRecord::new(doc.id, link_count, now);
            debug!(
                doc_id = doc.id,
                link_count,
                orphan = record.is_orphan,
                "scanned document"
            );
            self.repo.upsert_page_record(&record).await?;
            processed += 1;
        }

        let total_posts = self.content.count_published(types).await?;
        info!(offset, processed, total_posts, "scan batch finished");

        Ok(ScanOutcome {
            completed: batch.len() < batch_size,
            processed,
            total_posts,
        })
    }

    /// Drive `scan_batch` from offset 0 until it reports completion,
    /// calling `on_batch` after every batch.
    pub async fn scan_all<F>(&self, batch_size: usize, mut on_batch: F) -> Result<usize>
    where
        F: FnMut(&ScanOutcome, usize),
    {
        let batch_size = batch_size.max(1);
        let mut offset = 0;
        let mut scanned = 0;
        loop {
            let outcome = self.scan_batch(batch_size, offset).await?;
            scanned += outcome.processed;
            on_batch(&outcome, scanned);
            if outcome.completed {
                break;
            }
            offset += batch_size;
        }
        Ok(scanned)
    }
}

/// Number of distinct documents in `corpus`, other than `doc` itself, whose
/// body mentions `doc`'s absolute or site-relative permalink.
pub fn count_inbound_links(doc: &Document, corpus: &[Document], site_root: &str) -> u32 {
    let target = LinkTarget::new(&doc.permalink, site_root);
    corpus
        .iter()
        .filter(|other| other.id != doc.id && target.is_linked_from(&other.body))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{InMemoryContent, InMemoryRepository};

    const SITE: &str = "https://example.com";

    fn doc(id: i64, doc_type: &str, body: &str) -> Document {
        Document {
            id,
            title: format!("Doc {}", id),
            body: body.to_string(),
            published_at: 1_700_000_000 + id,
            doc_type: doc_type.to_string(),
            permalink: format!("{}/doc-{}/", SITE, id),
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc(1, "post", "Start with https://example.com/doc-2/ and /doc-3/."),
            doc(2, "post", "See /doc-3/ as well as /doc-3/ again."),
            doc(3, "page", "Back to https://example.com/doc-1/."),
            doc(4, "post", "I link to myself: /doc-4/"),
            doc(5, "attachment", "Links to /doc-4/ do not count."),
        ]
    }

    fn scanner(
        docs: Vec<Document>,
    ) -> (
        OrphanScanner<InMemoryContent, InMemoryRepository>,
        Arc<InMemoryRepository>,
    ) {
        let content = Arc::new(InMemoryContent::new(SITE).with_documents(docs));
        let repo = Arc::new(InMemoryRepository::new());
        (
            OrphanScanner::new(content, repo.clone(), AnalysisSettings::default()),
            repo,
        )
    }

    #[test]
    fn counts_distinct_linking_documents() {
        let docs = corpus();
        assert_eq!(count_inbound_links(&docs[2], &docs, SITE), 2);
        assert_eq!(count_inbound_links(&docs[0], &docs, SITE), 1);
    }

    #[test]
    fn self_links_do_not_count() {
        let docs = corpus();
        assert_eq!(count_inbound_links(&docs[3], &docs, SITE), 1);
        let published: Vec<Document> = docs.into_iter().filter(|d| d.doc_type != "attachment").collect();
        assert_eq!(count_inbound_links(&published[3], &published, SITE), 0);
    }

    #[tokio::test]
    async fn batch_reports_completion_when_short() {
        let (scanner, repo) = scanner(corpus());
        let first = scanner.scan_batch(3, 0).await.unwrap();
        assert_eq!(
            first,
            ScanOutcome {
                completed: false,
                processed: 3,
                total_posts: 4
            }
        );
        let second = scanner.scan_batch(3, 3).await.unwrap();
        assert!(second.completed);
        assert_eq!(second.processed, 1);

        let orphans: Vec<i64> = repo
            .page_records(true)
            .await
            .unwrap()
            .iter()
            .map(|r| r.doc_id)
            .collect();
        assert_eq!(orphans, vec![4]);
    }

    #[tokio::test]
    async fn empty_batch_is_terminal() {
        let (scanner, _) = scanner(corpus());
        let outcome = scanner.scan_batch(10, 100).await.unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.processed, 0);
    }

    #[tokio::test]
    async fn rescanning_overwrites_records() {
        let (scanner, repo) = scanner(corpus());
        scanner.scan_batch(10, 0).await.unwrap();
        scanner.scan_batch(10, 0).await.unwrap();
        assert_eq!(repo.page_records(false).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn scan_all_visits_every_document_once() {
        let docs: Vec<Document> = (1..=23).map(|i| doc(i, "post", "")).collect();
        let (scanner, repo) = scanner(docs);
        let mut batches = 0;
        let scanned = scanner
            .scan_all(5, |_, _| batches += 1)
            .await
            .unwrap();
        assert_eq!(scanned, 23);
        assert_eq!(batches, 5);
        assert_eq!(repo.page_records(true).await.unwrap().len(), 23);
    }

    #[tokio::test]
    async fn exact_multiple_needs_one_extra_call() {
        let docs: Vec<Document> = (1..=10).map(|i| doc(i, "post", "")).collect();
        let (scanner, _) = scanner(docs);
        let mut outcomes = Vec::new();
        let scanned = scanner
            .scan_all(5, |o, _| outcomes.push(o.clone()))
            .await
            .unwrap();
        assert_eq!(scanned, 10);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2].processed, 0);
        assert!(outcomes[2].completed);
    }
}
