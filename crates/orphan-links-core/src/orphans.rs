//! Orphan listing and reporting.
//!
//! Joins the scanner's [`PageRecord`](crate::models::PageRecord)s with the
//! host's documents. Records whose document is no longer published are
//! left out, so counts and listings always agree.

use std::sync::Arc;

use anyhow::Result;

use crate::models::{OrphanPage, OrphanReportRow, StatusFilter, SuggestionStatus};
use crate::store::{ContentSource, LinkRepository};

/// Default number of rows in an orphan report.
pub const DEFAULT_REPORT_LIMIT: usize = 1000;

const HAS_SUGGESTIONS: &str = "Has Suggestions";
const NEEDS_ANALYSIS: &str = "Needs Analysis";

pub struct OrphanIndex<C, R> {
    content: Arc<C>,
    repo: Arc<R>,
}

impl<C: ContentSource, R: LinkRepository> OrphanIndex<C, R> {
    pub fn new(content: Arc<C>, repo: Arc<R>) -> Self {
        Self { content, repo }
    }

    async fn resolved(&self) -> Result<Vec<OrphanPage>> {
        let mut pages = Vec::new();
        for record in self.repo.page_records(true).await? {
            if let Some(doc) = self.content.get_document(record.doc_id).await? {
                pages.push(OrphanPage {
                    doc,
                    link_count: record.link_count,
                    last_scanned: record.last_scanned,
                });
            }
        }
        // Newest first, ties by id.
        pages.sort_by(|a, b| {
            b.doc
                .published_at
                .cmp(&a.doc.published_at)
                .then(a.doc.id.cmp(&b.doc.id))
        });
        Ok(pages)
    }

    /// A page of orphans, newest first.
    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<OrphanPage>> {
        Ok(self
            .resolved()
            .await?
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.resolved().await?.len() as u64)
    }

    /// Per-orphan suggestion counts with a review status label.
    pub async fn report(&self, limit: usize) -> Result<Vec<OrphanReportRow>> {
        let mut rows = Vec::new();
        for page in self.list(limit, 0).await? {
            let id = page.doc.id;
            let total = self.repo.count_suggestions(id, StatusFilter::All).await?;
            let pending = self
                .repo
                .count_suggestions(id, StatusFilter::Only(SuggestionStatus::Pending))
                .await?;
            let accepted = self
                .repo
                .count_suggestions(id, StatusFilter::Only(SuggestionStatus::Accepted))
                .await?;
            let permalink = self
                .content
                .permalink_of(id)
                .await?
                .unwrap_or_else(|| page.doc.permalink.clone());

            rows.push(OrphanReportRow {
                doc_id: id,
                title: page.doc.title,
                permalink,
                doc_type: page.doc.doc_type,
                published_at: page.doc.published_at,
                total_suggestions: total,
                pending_suggestions: pending,
                accepted_suggestions: accepted,
                status: if pending > 0 {
                    HAS_SUGGESTIONS
                } else {
                    NEEDS_ANALYSIS
                }
                .to_string(),
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, PageRecord, SuggestionCandidate};
    use crate::store::memory::{InMemoryContent, InMemoryRepository};

    fn doc(id: i64, published_at: i64) -> Document {
        Document {
            id,
            title: format!("Doc {}", id),
            body: String::new(),
            published_at,
            doc_type: "post".to_string(),
            permalink: format!("https://example.com/doc-{}/", id),
        }
    }

    async fn fixture() -> (OrphanIndex<InMemoryContent, InMemoryRepository>, Arc<InMemoryContent>, Arc<InMemoryRepository>) {
        let content = Arc::new(InMemoryContent::new("https://example.com").with_documents(vec![
            doc(1, 100),
            doc(2, 300),
            doc(3, 200),
            doc(4, 300),
        ]));
        let repo = Arc::new(InMemoryRepository::new());
        for (id, links) in [(1, 0), (2, 0), (3, 2), (4, 0)] {
            repo.upsert_page_record(&PageRecord::new(id, links, 0))
                .await
                .unwrap();
        }
        (
            OrphanIndex::new(content.clone(), repo.clone()),
            content,
            repo,
        )
    }

    #[tokio::test]
    async fn lists_newest_first_with_paging() {
        let (index, _, _) = fixture().await;
        let ids: Vec<i64> = index.list(10, 0).await.unwrap().iter().map(|p| p.doc.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
        let ids: Vec<i64> = index.list(1, 1).await.unwrap().iter().map(|p| p.doc.id).collect();
        assert_eq!(ids, vec![4]);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unpublished_orphans_are_hidden() {
        let (index, content, _) = fixture().await;
        content.remove(2).unwrap();
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn report_labels_by_pending_count() {
        let (index, _, repo) = fixture().await;
        let candidate = SuggestionCandidate {
            source_doc_id: 3,
            paragraph_index: 0,
            sentence_text: "s".to_string(),
            anchor_text: "a".to_string(),
            relevance_score: 80,
        };
        repo.replace_suggestions(4, &[candidate.clone(), candidate], 0)
            .await
            .unwrap();

        let rows = index.report(DEFAULT_REPORT_LIMIT).await.unwrap();
        assert_eq!(rows.len(), 3);
        let row4 = rows.iter().find(|r| r.doc_id == 4).unwrap();
        assert_eq!(row4.total_suggestions, 2);
        assert_eq!(row4.pending_suggestions, 2);
        assert_eq!(row4.status, "Has Suggestions");
        let row1 = rows.iter().find(|r| r.doc_id == 1).unwrap();
        assert_eq!(row1.status, "Needs Analysis");
        assert_eq!(row1.permalink, "https://example.com/doc-1/");
    }
}
