//! Reset command implementation

use anyhow::{Result, bail};

use super::Context;

/// Reset one category or all of the learner's progress
pub fn reset_command(ctx: &Context, category: Option<&str>) -> Result<()> {
    let mut engine = ctx.open_engine()?;

    match category {
        Some(id) => {
            engine.reset_category(id)?;
            println!("Reset progress in {} for {}", id, engine.learner());
        }
        None => {
            engine.reset_all();
            println!("Reset all progress for {}", engine.learner());
        }
    }

    if let Some(warning) = engine.take_storage_warning() {
        bail!("{}", warning.message);
    }
    Ok(())
}
