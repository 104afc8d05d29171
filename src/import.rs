//! Document import (`olm import <file.json>`).
//!
//! Loads a JSON array of host documents into the `documents` table so the
//! scanner and the suggestion engine have a corpus to work on:
//!
//! ```json
//! [
//!   {
//!     "id": 12,
//!     "title": "Garden Irrigation Tips",
//!     "body": "Plain text body...",
//!     "type": "post",
//!     "status": "publish",
//!     "published_at": "2024-03-01 09:30:00",
//!     "permalink": "https://example.com/garden-irrigation-tips/"
//!   }
//! ]
//! ```
//!
//! `type` defaults to `post` and `status` to `publish`. `published_at` is
//! either a Unix timestamp, an RFC 3339 string, or `YYYY-MM-DD HH:MM:SS`
//! (UTC). Existing documents with the same id are replaced.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use orphan_links_core::models::Document;

use crate::sqlite_store::{SqliteStore, PUBLISHED};

#[derive(Debug, Deserialize)]
pub struct ImportedDocument {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default = "default_type")]
    pub doc_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub published_at: Timestamp,
    pub permalink: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Text(String),
}

impl Timestamp {
    pub fn to_unix(&self) -> Result<i64> {
        match self {
            Timestamp::Unix(ts) => Ok(*ts),
            Timestamp::Text(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Ok(dt.timestamp());
                }
                let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .with_context(|| format!("Unrecognised published_at: '{}'", s))?;
                Ok(naive.and_utc().timestamp())
            }
        }
    }
}

fn default_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    PUBLISHED.to_string()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub published: usize,
}

/// Parse the import file contents.
pub fn parse_documents(content: &str) -> Result<Vec<ImportedDocument>> {
    let docs: Vec<ImportedDocument> =
        serde_json::from_str(content).with_context(|| "Import file must be a JSON array of documents")?;
    for d in &docs {
        if d.permalink.trim().is_empty() {
            bail!("document {} has an empty permalink", d.id);
        }
    }
    Ok(docs)
}

/// Upsert every document into the store.
pub async fn import_documents(store: &SqliteStore, docs: &[ImportedDocument]) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    for d in docs {
        let doc = Document {
            id: d.id,
            title: d.title.clone(),
            body: d.body.clone(),
            published_at: d.published_at.to_unix()?,
            doc_type: d.doc_type.clone(),
            permalink: d.permalink.clone(),
        };
        store.upsert_document(&doc, &d.status).await?;
        summary.imported += 1;
        if d.status == PUBLISHED {
            summary.published += 1;
        } else {
            warn!(doc_id = d.id, status = %d.status, "imported unpublished document");
        }
    }
    info!(
        imported = summary.imported,
        published = summary.published,
        "import finished"
    );
    Ok(summary)
}

/// Read `path` and import it.
pub async fn run_import(store: &SqliteStore, path: &Path) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let docs = parse_documents(&content)?;
    import_documents(store, &docs).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_timestamps() {
        let docs = parse_documents(
            r#"[
                {"id": 1, "title": "A", "published_at": 1700000000, "permalink": "https://x.test/a/"},
                {"id": 2, "type": "page", "status": "draft", "published_at": "2024-03-01 09:30:00",
                 "permalink": "https://x.test/b/"},
                {"id": 3, "published_at": "2024-03-01T09:30:00Z", "permalink": "https://x.test/c/"}
            ]"#,
        )
        .unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].doc_type, "post");
        assert_eq!(docs[0].status, "publish");
        assert_eq!(docs[0].published_at.to_unix().unwrap(), 1_700_000_000);
        assert_eq!(docs[1].doc_type, "page");
        assert_eq!(
            docs[1].published_at.to_unix().unwrap(),
            docs[2].published_at.to_unix().unwrap()
        );
    }

    #[test]
    fn rejects_empty_permalink() {
        let err = parse_documents(r#"[{"id": 1, "published_at": 0, "permalink": " "}]"#);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_bad_date() {
        let docs =
            parse_documents(r#"[{"id": 1, "published_at": "yesterday", "permalink": "/a/"}]"#)
                .unwrap();
        assert!(docs[0].published_at.to_unix().is_err());
    }
}
