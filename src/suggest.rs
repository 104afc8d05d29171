//! Suggestion commands: `olm suggest`, `olm suggestions`, `olm review`.

use anyhow::{bail, Result};
use orphan_links_core::models::{GenerateOutcome, StatusFilter, StatusUpdate, Suggestion};

use crate::app;
use crate::config::Config;

/// Generate suggestions for `target` and print them.
pub async fn run_generate(config: &Config, target: i64, json: bool) -> Result<()> {
    let service = app::open(config).await?;
    let outcome = service.generate_suggestions(target).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        GenerateOutcome::Generated {
            count, suggestions, ..
        } => {
            println!("Generated {} suggestion(s) for document {}.", count, target);
            print_suggestions(&suggestions);
            Ok(())
        }
        GenerateOutcome::Failed { message, .. } => bail!(message),
    }
}

/// List stored suggestions for `target`. `status` is a status name or `all`.
pub async fn run_list(config: &Config, target: i64, status: &str, json: bool) -> Result<()> {
    let filter: StatusFilter = status.parse()?;
    let service = app::open(config).await?;
    let suggestions = service.get_suggestions(target, filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        println!("No suggestions.");
    } else {
        print_suggestions(&suggestions);
    }
    Ok(())
}

/// Set the status of one suggestion.
pub async fn run_review(config: &Config, suggestion_id: i64, status: &str) -> Result<()> {
    let service = app::open(config).await?;
    match service
        .update_suggestion_status_str(suggestion_id, status)
        .await?
    {
        StatusUpdate::Updated => {}
        StatusUpdate::NotFound => bail!("suggestion {} not found", suggestion_id),
        StatusUpdate::NotAllowed { current } => bail!(
            "suggestion {} is {} and cannot move to '{}'",
            suggestion_id,
            current,
            status
        ),
    }
    println!("Suggestion {} marked {}.", suggestion_id, status);
    Ok(())
}

fn print_suggestions(suggestions: &[Suggestion]) {
    for s in suggestions {
        println!(
            "#{:<5} [{:>3}] {:<8} from doc {} (paragraph {})",
            s.id, s.relevance_score, s.status.as_str(), s.source_doc_id, s.paragraph_index
        );
        println!("       anchor: {}", s.anchor_text);
        println!("       {}", s.sentence_text);
    }
}
