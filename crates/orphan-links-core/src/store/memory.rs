//! In-memory [`ContentSource`] and [`LinkRepository`] implementations for
//! testing and embedding.
//!
//! Uses `BTreeMap` and `Vec` behind `std::sync::RwLock` for thread safety.
//! Every document held by [`InMemoryContent`] counts as published.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{
    Document, PageRecord, StatusFilter, StatusUpdate, Suggestion, SuggestionCandidate,
    SuggestionStatus,
};

use super::{sort_suggestions, ContentSource, LinkRepository};

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

/// In-memory content corpus keyed by document id.
pub struct InMemoryContent {
    site_root: String,
    docs: RwLock<BTreeMap<i64, Document>>,
}

impl InMemoryContent {
    pub fn new(site_root: impl Into<String>) -> Self {
        Self {
            site_root: site_root.into(),
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder-style bulk insert.
    pub fn with_documents(self, docs: impl IntoIterator<Item = Document>) -> Self {
        if let Ok(mut map) = self.docs.write() {
            for doc in docs {
                map.insert(doc.id, doc);
            }
        }
        self
    }

    /// Insert or replace a document.
    pub fn insert(&self, doc: Document) -> Result<()> {
        self.docs.write().map_err(poisoned)?.insert(doc.id, doc);
        Ok(())
    }

    /// Remove a document, e.g. to model unpublishing.
    pub fn remove(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.docs.write().map_err(poisoned)?.remove(&id))
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn list_published(
        &self,
        types: &[String],
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Document>> {
        let docs = self.docs.read().map_err(poisoned)?;
        let iter = docs
            .values()
            .filter(|d| types.iter().any(|t| *t == d.doc_type))
            .skip(offset)
            .cloned();
        Ok(match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        })
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        Ok(self.docs.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn permalink_of(&self, id: i64) -> Result<Option<String>> {
        Ok(self
            .docs
            .read()
            .map_err(poisoned)?
            .get(&id)
            .map(|d| d.permalink.clone()))
    }

    fn site_root(&self) -> &str {
        &self.site_root
    }

    async fn count_published(&self, types: &[String]) -> Result<u64> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .values()
            .filter(|d| types.iter().any(|t| *t == d.doc_type))
            .count() as u64)
    }
}

/// In-memory link-record and suggestion store.
pub struct InMemoryRepository {
    pages: RwLock<BTreeMap<i64, PageRecord>>,
    suggestions: RwLock<Vec<Suggestion>>,
    next_id: RwLock<i64>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(BTreeMap::new()),
            suggestions: RwLock::new(Vec::new()),
            next_id: RwLock::new(1),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for InMemoryRepository {
    async fn upsert_page_record(&self, record: &PageRecord) -> Result<()> {
        self.pages
            .write()
            .map_err(poisoned)?
            .insert(record.doc_id, record.clone());
        Ok(())
    }

    async fn page_records(&self, orphans_only: bool) -> Result<Vec<PageRecord>> {
        let pages = self.pages.read().map_err(poisoned)?;
        Ok(pages
            .values()
            .filter(|r| !orphans_only || r.is_orphan)
            .cloned()
            .collect())
    }

    async fn replace_suggestions(
        &self,
        target_doc_id: i64,
        candidates: &[SuggestionCandidate],
        created_at: i64,
    ) -> Result<Vec<Suggestion>> {
        // Both locks are held for the whole swap so readers never observe a
        // half-replaced set.
        let mut stored = self.suggestions.write().map_err(poisoned)?;
        let mut next_id = self.next_id.write().map_err(poisoned)?;

        stored.retain(|s| s.target_doc_id != target_doc_id);
        let mut inserted = Vec::with_capacity(candidates.len());
        for c in candidates {
            let suggestion = Suggestion {
                id: *next_id,
                target_doc_id,
                source_doc_id: c.source_doc_id,
                paragraph_index: c.paragraph_index,
                sentence_text: c.sentence_text.clone(),
                anchor_text: c.anchor_text.clone(),
                relevance_score: c.relevance_score,
                status: SuggestionStatus::Pending,
                created_at,
            };
            *next_id += 1;
            stored.push(suggestion.clone());
            inserted.push(suggestion);
        }
        Ok(inserted)
    }

    async fn suggestions_for(
        &self,
        target_doc_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Suggestion>> {
        let stored = self.suggestions.read().map_err(poisoned)?;
        let mut out: Vec<Suggestion> = stored
            .iter()
            .filter(|s| s.target_doc_id == target_doc_id && filter.matches(s.status))
            .cloned()
            .collect();
        sort_suggestions(&mut out);
        Ok(out)
    }

    async fn get_suggestion(&self, id: i64) -> Result<Option<Suggestion>> {
        let stored = self.suggestions.read().map_err(poisoned)?;
        Ok(stored.iter().find(|s| s.id == id).cloned())
    }

    async fn set_suggestion_status(
        &self,
        id: i64,
        allowed_from: &[SuggestionStatus],
        status: SuggestionStatus,
    ) -> Result<StatusUpdate> {
        let mut stored = self.suggestions.write().map_err(poisoned)?;
        match stored.iter_mut().find(|s| s.id == id) {
            Some(s) if allowed_from.contains(&s.status) => {
                s.status = status;
                Ok(StatusUpdate::Updated)
            }
            Some(s) => Ok(StatusUpdate::NotAllowed { current: s.status }),
            None => Ok(StatusUpdate::NotFound),
        }
    }

    async fn count_suggestions(&self, target_doc_id: i64, filter: StatusFilter) -> Result<u64> {
        let stored = self.suggestions.read().map_err(poisoned)?;
        Ok(stored
            .iter()
            .filter(|s| s.target_doc_id == target_doc_id && filter.matches(s.status))
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, doc_type: &str) -> Document {
        Document {
            id,
            title: format!("Doc {}", id),
            body: String::new(),
            published_at: id,
            doc_type: doc_type.to_string(),
            permalink: format!("https://example.com/doc-{}/", id),
        }
    }

    fn candidate(source: i64, score: u8) -> SuggestionCandidate {
        SuggestionCandidate {
            source_doc_id: source,
            paragraph_index: 0,
            sentence_text: "s".to_string(),
            anchor_text: "a".to_string(),
            relevance_score: score,
        }
    }

    #[tokio::test]
    async fn lists_by_type_in_id_order() {
        let content = InMemoryContent::new("https://example.com").with_documents(vec![
            doc(3, "post"),
            doc(1, "page"),
            doc(2, "attachment"),
            doc(4, "post"),
        ]);
        let types = vec!["post".to_string(), "page".to_string()];
        let ids: Vec<i64> = content
            .list_published(&types, Some(2), 1)
            .await
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(content.count_published(&types).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn page_records_upsert_by_doc_id() {
        let repo = InMemoryRepository::new();
        repo.upsert_page_record(&PageRecord::new(7, 0, 1)).await.unwrap();
        repo.upsert_page_record(&PageRecord::new(7, 3, 2)).await.unwrap();
        let all = repo.page_records(false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].link_count, 3);
        assert!(repo.page_records(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_swaps_only_the_target_set() {
        let repo = InMemoryRepository::new();
        repo.replace_suggestions(1, &[candidate(2, 60), candidate(3, 90)], 10)
            .await
            .unwrap();
        repo.replace_suggestions(5, &[candidate(2, 70)], 10).await.unwrap();
        let second = repo
            .replace_suggestions(1, &[candidate(4, 80)], 20)
            .await
            .unwrap();

        let for_one = repo.suggestions_for(1, StatusFilter::All).await.unwrap();
        assert_eq!(for_one, second);
        assert_eq!(repo.count_suggestions(5, StatusFilter::All).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn reads_sort_by_score_then_id() {
        let repo = InMemoryRepository::new();
        repo.replace_suggestions(1, &[candidate(2, 60), candidate(3, 90), candidate(4, 60)], 0)
            .await
            .unwrap();
        let scores: Vec<(u8, i64)> = repo
            .suggestions_for(1, StatusFilter::All)
            .await
            .unwrap()
            .iter()
            .map(|s| (s.relevance_score, s.source_doc_id))
            .collect();
        assert_eq!(scores, vec![(90, 3), (60, 2), (60, 4)]);
    }

    #[tokio::test]
    async fn status_update_and_filter() {
        let repo = InMemoryRepository::new();
        let stored = repo
            .replace_suggestions(1, &[candidate(2, 60), candidate(3, 90)], 0)
            .await
            .unwrap();
        let any = [
            SuggestionStatus::Pending,
            SuggestionStatus::Accepted,
            SuggestionStatus::Rejected,
        ];
        assert_eq!(
            repo.set_suggestion_status(stored[0].id, &any, SuggestionStatus::Accepted)
                .await
                .unwrap(),
            StatusUpdate::Updated
        );
        assert_eq!(
            repo.set_suggestion_status(999, &any, SuggestionStatus::Accepted)
                .await
                .unwrap(),
            StatusUpdate::NotFound
        );
        assert_eq!(
            repo.set_suggestion_status(
                stored[0].id,
                &[SuggestionStatus::Pending],
                SuggestionStatus::Rejected
            )
            .await
            .unwrap(),
            StatusUpdate::NotAllowed {
                current: SuggestionStatus::Accepted
            }
        );
        let pending = repo
            .suggestions_for(1, StatusFilter::Only(SuggestionStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].source_doc_id, 3);
    }
}
