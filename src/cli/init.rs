//! Init command implementation

use anyhow::Result;
use tracing::info;

use simulateai_badges::config::Config;

use super::Context;

/// Write the default badge configuration
pub fn init_command(ctx: &Context, force: bool) -> Result<()> {
    let path = ctx.config_path();

    if Config::write_default(&path, force)? {
        println!("Created {}", path.display());
        println!("\nEdit the [[category]] entries to match your scenarios.");
    } else {
        info!(path = %path.display(), "Config already exists");
        println!(
            "Config already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Ok(())
}
