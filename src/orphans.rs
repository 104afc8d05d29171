//! Orphan commands: `olm orphans` and `olm report`.

use anyhow::Result;

use crate::app;
use crate::config::Config;

pub async fn run_orphans(
    config: &Config,
    limit: usize,
    offset: usize,
    count_only: bool,
    json: bool,
) -> Result<()> {
    let service = app::open(config).await?;

    if count_only {
        println!("{}", service.count_orphans().await?);
        return Ok(());
    }

    let orphans = service.get_orphans(limit, offset).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&orphans)?);
        return Ok(());
    }

    if orphans.is_empty() {
        println!("No orphaned documents.");
        return Ok(());
    }
    for o in &orphans {
        let published = chrono::DateTime::from_timestamp(o.doc.published_at, 0)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| o.doc.published_at.to_string());
        println!(
            "{:>6}  {}  {:<6} {}",
            o.doc.id, published, o.doc.doc_type, o.doc.title
        );
        println!("        {}", o.doc.permalink);
    }
    Ok(())
}

/// Print the orphan report as JSON.
pub async fn run_report(config: &Config, limit: usize) -> Result<()> {
    let service = app::open(config).await?;
    let rows = service.build_report(limit).await?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
