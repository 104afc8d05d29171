//! Storage abstraction for Orphan Links.
//!
//! The core talks to the outside world through two narrow ports:
//!
//! - [`ContentSource`]: read-only access to the host's published documents.
//! - [`LinkRepository`]: the core's own state: inbound-link records and
//!   suggestion sets.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//! Schema provisioning is the implementation's concern, never the core's.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    Document, PageRecord, StatusFilter, StatusUpdate, Suggestion, SuggestionCandidate,
    SuggestionStatus,
};

/// Read-only view of the host content system.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_published`](ContentSource::list_published) | Page through published documents by id |
/// | [`get_document`](ContentSource::get_document) | Look up one document |
/// | [`permalink_of`](ContentSource::permalink_of) | Absolute URL of a document |
/// | [`site_root`](ContentSource::site_root) | URL prefix used for relative permalinks |
/// | [`count_published`](ContentSource::count_published) | Total published documents of some types |
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Published documents of `types`, ascending by id, starting at `offset`.
    /// `limit = None` returns everything from `offset` on.
    async fn list_published(
        &self,
        types: &[String],
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Document>>;

    /// A published document by id.
    async fn get_document(&self, id: i64) -> Result<Option<Document>>;

    /// Absolute permalink of a document, if it exists.
    async fn permalink_of(&self, id: i64) -> Result<Option<String>>;

    fn site_root(&self) -> &str;

    async fn count_published(&self, types: &[String]) -> Result<u64>;
}

/// Persistence for scan results and suggestions.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_page_record`](LinkRepository::upsert_page_record) | Insert or replace a link-count record by doc id |
/// | [`page_records`](LinkRepository::page_records) | All records, optionally orphans only |
/// | [`replace_suggestions`](LinkRepository::replace_suggestions) | Atomically swap a target's suggestion set |
/// | [`suggestions_for`](LinkRepository::suggestions_for) | Read a target's suggestions |
/// | [`get_suggestion`](LinkRepository::get_suggestion) | Read one suggestion |
/// | [`set_suggestion_status`](LinkRepository::set_suggestion_status) | Conditionally change a suggestion's status |
/// | [`count_suggestions`](LinkRepository::count_suggestions) | Count a target's suggestions |
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Insert or replace the record for `record.doc_id`. Never duplicates.
    async fn upsert_page_record(&self, record: &PageRecord) -> Result<()>;

    async fn page_records(&self, orphans_only: bool) -> Result<Vec<PageRecord>>;

    /// Delete every suggestion for `target_doc_id` and insert `candidates`
    /// with status pending, in one atomic step. Returns the stored rows in
    /// the order of `candidates`.
    async fn replace_suggestions(
        &self,
        target_doc_id: i64,
        candidates: &[SuggestionCandidate],
        created_at: i64,
    ) -> Result<Vec<Suggestion>>;

    /// Suggestions for a target, highest score first, ties by id.
    async fn suggestions_for(
        &self,
        target_doc_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Suggestion>>;

    async fn get_suggestion(&self, id: i64) -> Result<Option<Suggestion>>;

    /// Set `status` only when the current status is one of `allowed_from`.
    /// The check and the write are a single atomic step.
    async fn set_suggestion_status(
        &self,
        id: i64,
        allowed_from: &[SuggestionStatus],
        status: SuggestionStatus,
    ) -> Result<StatusUpdate>;

    async fn count_suggestions(&self, target_doc_id: i64, filter: StatusFilter) -> Result<u64>;
}

/// Order suggestions by descending score, then ascending id.
pub fn sort_suggestions(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(|a, b| {
        b.relevance_score
            .cmp(&a.relevance_score)
            .then(a.id.cmp(&b.id))
    });
}
