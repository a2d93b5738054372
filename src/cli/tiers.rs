//! Tiers command implementation

use anyhow::Result;

use super::Context;

/// List configured categories and their tiers
pub fn tiers_command(ctx: &Context) -> Result<()> {
    let (_, catalog) = ctx.load()?;

    if catalog.is_empty() {
        println!("No categories configured.");
        return Ok(());
    }

    for category in catalog.categories() {
        match category.total_scenarios {
            Some(total) => println!("{} [{}] - {} scenarios", category.title, category.id, total),
            None => println!("{} [{}]", category.title, category.id),
        }

        for tier in category.tiers() {
            println!("  {} {:>3}  {}", tier.icon, tier.requirement, tier.title);
            if let Some(desc) = &tier.description {
                println!("         {}", desc);
            }
        }
        println!();
    }

    Ok(())
}
