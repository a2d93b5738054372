//! Session command implementation
//!
//! Drives one engine session from line commands, standing in for the UI
//! that would normally raise the completion and reflection signals.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use simulateai_badges::store::StateStore;
use simulateai_badges::BadgeEngine;

use super::status::write_status;
use super::Context;

/// Run a session reading commands from stdin
pub fn session_command(ctx: &Context) -> Result<()> {
    let mut engine = ctx.open_engine()?;
    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    run_session(&mut engine, stdin, &mut stdout)
}

/// Process commands until `end` or end of input, then end the session
pub fn run_session<S: StateStore, R: BufRead, W: Write>(
    engine: &mut BadgeEngine<S>,
    input: R,
    out: &mut W,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            [] => {}
            [first, ..] if first.starts_with('#') => {}
            ["complete", category, scenario] => match engine.on_scenario_completed(category, scenario) {
                Ok(report) => {
                    if report.is_new_completion {
                        writeln!(
                            out,
                            "Completed {} ({} in {})",
                            report.scenario, report.new_count, report.category
                        )?;
                    } else {
                        writeln!(out, "Already completed {}", report.scenario)?;
                    }
                    if !report.newly_unlocked.is_empty() {
                        writeln!(
                            out,
                            "  {} badge(s) waiting for reflection",
                            report.newly_unlocked.len()
                        )?;
                    }
                    if let Some(evicted) = report.evicted {
                        writeln!(
                            out,
                            "  dropped {} unrevealed badge(s) from {}",
                            evicted.badges.len(),
                            evicted.scenario
                        )?;
                    }
                }
                Err(err) => writeln!(out, "error: {}", err)?,
            },
            ["reflect", scenario] => match engine.on_reflection_completed(scenario) {
                Ok(badges) if badges.is_empty() => writeln!(out, "No new badges")?,
                Ok(badges) => {
                    for badge in badges {
                        writeln!(
                            out,
                            "{} Badge earned: {} ({})",
                            badge.tier.icon,
                            badge.title(),
                            badge.category
                        )?;
                    }
                }
                Err(err) => writeln!(out, "error: {}", err)?,
            },
            ["expire", scenario] => match engine.expire_pending(scenario) {
                Ok(count) => writeln!(out, "Discarded {} badge(s)", count)?,
                Err(err) => writeln!(out, "error: {}", err)?,
            },
            ["status"] => write_status(engine, None, out)?,
            ["end"] | ["quit"] => break,
            _ => writeln!(out, "error: unknown command: {}", line.trim())?,
        }

        if let Some(warning) = engine.take_storage_warning() {
            writeln!(out, "warning: {}", warning.message)?;
        }
    }

    let discarded = engine.end_session();
    debug!(discarded, "Session input finished");
    if discarded > 0 {
        writeln!(out, "Session ended, {} unrevealed badge(s) discarded", discarded)?;
    }
    if let Some(warning) = engine.take_storage_warning() {
        writeln!(out, "warning: {}", warning.message)?;
    }
    Ok(())
}
