//! Implementation of the `tack rank` command.

use super::engine::open_engine;
use crate::analysis::Exclusion;
use super::require_workspace;
use crate::cli::RankArgs;
use crate::error::{Result, TackError};
use serde_json::json;

pub async fn cmd_rank(args: RankArgs) -> Result<()> {
    let ctx = require_workspace()?;
    let engine = open_engine(&ctx, "rank")?;

    let preview = engine.coordinator.preview(&args.agent).await?;

    if args.json {
        let excluded: Vec<_> = preview
            .excluded
            .iter()
            .map(|e| json!({ "task": e.task_id, "reason": e.reason }))
            .collect();
        let value = json!({ "ranking": preview.ranking, "excluded": excluded });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| TackError::UserError(format!("failed to render JSON: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("Ranking for {} ({} mode)", args.agent, preview.ranking.mode);
    if let Some(reason) = &preview.ranking.fallback_reason {
        println!("  fallback: {}", reason);
    }
    println!();

    let Some(best) = preview.ranking.best() else {
        println!("  no eligible tasks");
        return print_excluded(&preview.excluded);
    };

    println!(
        "  {:<16} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "TASK", "SCORE", "DEP", "SUIT", "IMPACT", "SKILL"
    );
    for r in &preview.ranking.ranked {
        println!(
            "  {:<16} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
            r.task_id, r.combined, r.dependency, r.suitability, r.impact, r.skill_overlap
        );
    }
    println!();
    println!("  next pick: {}", best.task_id);

    print_excluded(&preview.excluded)
}

fn print_excluded(excluded: &[Exclusion]) -> Result<()> {
    if !excluded.is_empty() {
        println!();
        println!("Held back:");
        for e in excluded {
            println!("  {}: {}", e.task_id, e.reason);
        }
    }
    Ok(())
}
