//! SQLite-backed [`ContentSource`] and [`LinkRepository`].
//!
//! One pool serves both ports: the `documents` table stands in for the host
//! content system, `link_pages` and `link_suggestions` hold analysis state.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use orphan_links_core::models::{
    Document, PageRecord, StatusFilter, StatusUpdate, Suggestion, SuggestionCandidate,
    SuggestionStatus,
};
use orphan_links_core::store::{sort_suggestions, ContentSource, LinkRepository};

/// Publication state the content port treats as visible.
pub const PUBLISHED: &str = "publish";

pub struct SqliteStore {
    pool: SqlitePool,
    site_root: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, site_root: impl Into<String>) -> Self {
        Self {
            pool,
            site_root: site_root.into(),
        }
    }

    /// Insert or replace a document by id. Used by `olm import`.
    pub async fn upsert_document(&self, doc: &Document, status: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, title, body, doc_type, status, published_at, permalink)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                doc_type = excluded.doc_type,
                status = excluded.status,
                published_at = excluded.published_at,
                permalink = excluded.permalink
            "#,
        )
        .bind(doc.id)
        .bind(&doc.title)
        .bind(&doc.body)
        .bind(&doc.doc_type)
        .bind(status)
        .bind(doc.published_at)
        .bind(&doc.permalink)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn document_from_row(row: &SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        published_at: row.get("published_at"),
        doc_type: row.get("doc_type"),
        permalink: row.get("permalink"),
    }
}

fn page_record_from_row(row: &SqliteRow) -> PageRecord {
    let link_count: i64 = row.get("link_count");
    let is_orphan: i64 = row.get("is_orphan");
    PageRecord {
        doc_id: row.get("doc_id"),
        link_count: u32::try_from(link_count.max(0)).unwrap_or(u32::MAX),
        last_scanned: row.get("last_scanned"),
        is_orphan: is_orphan != 0,
    }
}

fn suggestion_from_row(row: &SqliteRow) -> Result<Suggestion> {
    let paragraph_index: i64 = row.get("paragraph_index");
    let score: i64 = row.get("relevance_score");
    let status: String = row.get("status");
    Ok(Suggestion {
        id: row.get("id"),
        target_doc_id: row.get("target_doc_id"),
        source_doc_id: row.get("source_doc_id"),
        paragraph_index: usize::try_from(paragraph_index.max(0)).unwrap_or(usize::MAX),
        sentence_text: row.get("sentence_text"),
        anchor_text: row.get("anchor_text"),
        relevance_score: score.clamp(0, 100) as u8,
        status: status.parse::<SuggestionStatus>()?,
        created_at: row.get("created_at"),
    })
}

const SUGGESTION_COLUMNS: &str = "id, target_doc_id, source_doc_id, paragraph_index, \
     sentence_text, anchor_text, relevance_score, status, created_at";

#[async_trait]
impl ContentSource for SqliteStore {
    async fn list_published(
        &self,
        types: &[String],
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Document>> {
        if types.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, title, body, doc_type, published_at, permalink FROM documents \
             WHERE status = ? AND doc_type IN ({}) ORDER BY id ASC LIMIT ? OFFSET ?",
            placeholders(types.len())
        );

        let mut query = sqlx::query(&sql).bind(PUBLISHED);
        for t in types {
            query = query.bind(t.as_str());
        }
        // SQLite reads a negative LIMIT as "no limit".
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = query
            .bind(limit)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn get_document(&self, id: i64) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, title, body, doc_type, published_at, permalink FROM documents \
             WHERE id = ? AND status = ?",
        )
        .bind(id)
        .bind(PUBLISHED)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(document_from_row))
    }

    async fn permalink_of(&self, id: i64) -> Result<Option<String>> {
        let permalink: Option<String> =
            sqlx::query_scalar("SELECT permalink FROM documents WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(permalink)
    }

    fn site_root(&self) -> &str {
        &self.site_root
    }

    async fn count_published(&self, types: &[String]) -> Result<u64> {
        if types.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM documents WHERE status = ? AND doc_type IN ({})",
            placeholders(types.len())
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(PUBLISHED);
        for t in types {
            query = query.bind(t.as_str());
        }
        let count = query.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl LinkRepository for SqliteStore {
    async fn upsert_page_record(&self, record: &PageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO link_pages (doc_id, link_count, last_scanned, is_orphan)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(doc_id) DO UPDATE SET
                link_count = excluded.link_count,
                last_scanned = excluded.last_scanned,
                is_orphan = excluded.is_orphan
            "#,
        )
        .bind(record.doc_id)
        .bind(record.link_count as i64)
        .bind(record.last_scanned)
        .bind(record.is_orphan as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn page_records(&self, orphans_only: bool) -> Result<Vec<PageRecord>> {
        let sql = if orphans_only {
            "SELECT doc_id, link_count, last_scanned, is_orphan FROM link_pages \
             WHERE is_orphan = 1 ORDER BY doc_id ASC"
        } else {
            "SELECT doc_id, link_count, last_scanned, is_orphan FROM link_pages ORDER BY doc_id ASC"
        };
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(page_record_from_row).collect())
    }

    async fn replace_suggestions(
        &self,
        target_doc_id: i64,
        candidates: &[SuggestionCandidate],
        created_at: i64,
    ) -> Result<Vec<Suggestion>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM link_suggestions WHERE target_doc_id = ?")
            .bind(target_doc_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(candidates.len());
        for c in candidates {
            let result = sqlx::query(
                r#"
                INSERT INTO link_suggestions (target_doc_id, source_doc_id, paragraph_index,
                                              sentence_text, anchor_text, relevance_score,
                                              status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(target_doc_id)
            .bind(c.source_doc_id)
            .bind(c.paragraph_index as i64)
            .bind(&c.sentence_text)
            .bind(&c.anchor_text)
            .bind(c.relevance_score as i64)
            .bind(SuggestionStatus::Pending.as_str())
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

            stored.push(Suggestion {
                id: result.last_insert_rowid(),
                target_doc_id,
                source_doc_id: c.source_doc_id,
                paragraph_index: c.paragraph_index,
                sentence_text: c.sentence_text.clone(),
                anchor_text: c.anchor_text.clone(),
                relevance_score: c.relevance_score,
                status: SuggestionStatus::Pending,
                created_at,
            });
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn suggestions_for(
        &self,
        target_doc_id: i64,
        filter: StatusFilter,
    ) -> Result<Vec<Suggestion>> {
        let sql = match filter {
            StatusFilter::All => format!(
                "SELECT {} FROM link_suggestions WHERE target_doc_id = ?",
                SUGGESTION_COLUMNS
            ),
            StatusFilter::Only(_) => format!(
                "SELECT {} FROM link_suggestions WHERE target_doc_id = ? AND status = ?",
                SUGGESTION_COLUMNS
            ),
        };
        let mut query = sqlx::query(&sql).bind(target_doc_id);
        if let StatusFilter::Only(status) = filter {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut suggestions = rows
            .iter()
            .map(suggestion_from_row)
            .collect::<Result<Vec<_>>>()?;
        sort_suggestions(&mut suggestions);
        Ok(suggestions)
    }

    async fn get_suggestion(&self, id: i64) -> Result<Option<Suggestion>> {
        let sql = format!(
            "SELECT {} FROM link_suggestions WHERE id = ?",
            SUGGESTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(suggestion_from_row).transpose()
    }

    async fn set_suggestion_status(
        &self,
        id: i64,
        allowed_from: &[SuggestionStatus],
        status: SuggestionStatus,
    ) -> Result<StatusUpdate> {
        if !allowed_from.is_empty() {
            let placeholders = vec!["?"; allowed_from.len()].join(", ");
            let sql = format!(
                "UPDATE link_suggestions SET status = ? WHERE id = ? AND status IN ({})",
                placeholders
            );
            let mut query = sqlx::query(&sql).bind(status.as_str()).bind(id);
            for from in allowed_from {
                query = query.bind(from.as_str());
            }
            if query.execute(&self.pool).await?.rows_affected() > 0 {
                return Ok(StatusUpdate::Updated);
            }
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM link_suggestions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(match current {
            None => StatusUpdate::NotFound,
            Some(current) => StatusUpdate::NotAllowed {
                current: current.parse()?,
            },
        })
    }

    async fn count_suggestions(&self, target_doc_id: i64, filter: StatusFilter) -> Result<u64> {
        let count: i64 = match filter {
            StatusFilter::All => {
                sqlx::query_scalar("SELECT COUNT(*) FROM link_suggestions WHERE target_doc_id = ?")
                    .bind(target_doc_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            StatusFilter::Only(status) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM link_suggestions WHERE target_doc_id = ? AND status = ?",
                )
                .bind(target_doc_id)
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(count.max(0) as u64)
    }
}
