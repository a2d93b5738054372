//! Status command implementation

use std::io::Write;

use anyhow::Result;

use simulateai_badges::CategoryProgress;
use simulateai_badges::store::StateStore;
use simulateai_badges::BadgeEngine;

use super::Context;

/// Show the learner's progress
pub fn status_command(ctx: &Context, category: Option<&str>) -> Result<()> {
    let mut engine = ctx.open_engine()?;
    let mut out = std::io::stdout().lock();
    write_status(&engine, category, &mut out)?;
    if let Some(warning) = engine.take_storage_warning() {
        eprintln!("warning: {}", warning.message);
    }
    Ok(())
}

/// Print progress for one category or all of them
pub fn write_status<S: StateStore, W: Write>(
    engine: &BadgeEngine<S>,
    category: Option<&str>,
    out: &mut W,
) -> Result<()> {
    let rows = match category {
        Some(id) => vec![engine.progress(id)?],
        None => engine.overview(),
    };

    writeln!(out, "Progress for {}:\n", engine.learner())?;
    for progress in &rows {
        write_progress(progress, out)?;
    }

    let pending = engine.pending_reveals();
    if !pending.is_empty() {
        writeln!(
            out,
            "{} badge(s) waiting for reflection on {} scenario(s)",
            pending.pending_badge_count(),
            pending.len()
        )?;
    }
    Ok(())
}

fn write_progress<W: Write>(progress: &CategoryProgress, out: &mut W) -> Result<()> {
    match (progress.total_scenarios, progress.percent) {
        (Some(total), Some(pct)) => writeln!(
            out,
            "  {} [{}]: {}/{} ({}%)",
            progress.title, progress.category, progress.completed, total, pct
        )?,
        _ => writeln!(
            out,
            "  {} [{}]: {} completed",
            progress.title, progress.category, progress.completed
        )?,
    }

    for tier in &progress.unlocked_tiers {
        writeln!(out, "    {} {}", tier.icon, tier.title)?;
    }
    if let (Some(next), Some(remaining)) = (&progress.next_tier, progress.remaining_to_next) {
        writeln!(out, "    next: {} in {} more", next.title, remaining)?;
    }
    writeln!(out)?;
    Ok(())
}
