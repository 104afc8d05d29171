//! Database schema migrations (idempotent).
//!
//! | Table | Contents |
//! |-------|----------|
//! | `documents` | Host content mirror read through `ContentSource` |
//! | `link_pages` | One inbound-link record per scanned document |
//! | `link_suggestions` | Current suggestion set per target document |

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create all tables and indexes on an open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL DEFAULT '',
            doc_type TEXT NOT NULL DEFAULT 'post',
            status TEXT NOT NULL DEFAULT 'publish',
            published_at INTEGER NOT NULL,
            permalink TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS link_pages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            doc_id INTEGER NOT NULL UNIQUE,
            link_count INTEGER NOT NULL DEFAULT 0,
            last_scanned INTEGER NOT NULL,
            is_orphan INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS link_suggestions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            target_doc_id INTEGER NOT NULL,
            source_doc_id INTEGER NOT NULL,
            paragraph_index INTEGER NOT NULL DEFAULT 0,
            sentence_text TEXT NOT NULL,
            anchor_text TEXT NOT NULL,
            relevance_score INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_type_status ON documents(doc_type, status)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_link_pages_orphan ON link_pages(is_orphan)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_suggestions_target ON link_suggestions(target_doc_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_suggestions_status ON link_suggestions(status)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_suggestions_score ON link_suggestions(relevance_score DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
