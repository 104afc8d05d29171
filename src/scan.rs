//! `olm scan`: recount inbound links and refresh orphan records.

use anyhow::Result;

use crate::app;
use crate::config::Config;
use crate::progress::{ProgressMode, ScanProgressEvent};

/// Scan the whole corpus, or a single batch when `offset` is given.
pub async fn run_scan(
    config: &Config,
    batch_size: Option<usize>,
    offset: Option<usize>,
    progress: ProgressMode,
) -> Result<()> {
    let service = app::open(config).await?;

    if let Some(offset) = offset {
        let batch_size = batch_size.unwrap_or(service.settings().batch_size);
        let outcome = service.scan_batch(batch_size, offset).await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let reporter = progress.reporter();
    let scanned = service
        .scan_all(batch_size, |outcome, scanned| {
            reporter.report(ScanProgressEvent::from_outcome(outcome, scanned));
        })
        .await?;
    let orphans = service.count_orphans().await?;
    reporter.report(ScanProgressEvent::Done {
        scanned: scanned as u64,
        orphans,
    });

    println!("Scanned {} documents. {} orphaned.", scanned, orphans);
    Ok(())
}
