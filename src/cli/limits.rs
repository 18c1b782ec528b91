//! Limits command - show or edit static-analysis.properties

use anyhow::Result;
use console::style;

use qualigate::budget::LimitsStore;
use qualigate::config::Settings;

pub fn show(settings: &Settings) -> Result<()> {
    let store = LimitsStore::new(&settings.limits_file);
    let Some(limits) = store.load()? else {
        println!(
            "No limits file at {}. All checks are skipped.",
            style(store.path().display()).dim()
        );
        return Ok(());
    };

    println!("Limits in {}:\n", style(store.path().display()).cyan());
    for (key, limit) in limits.iter() {
        let configured = if settings.tool(key).is_some() {
            ""
        } else {
            " (no tool configured)"
        };
        println!("  {:<12} {:>6}{}", key, limit, configured);
    }
    for tool in &settings.tools {
        if limits.get(&tool.key).is_none() {
            println!("  {:<12} {:>6}", tool.key, style("-").dim());
        }
    }
    Ok(())
}

pub fn set(settings: &Settings, key: &str, value: u32) -> Result<()> {
    let store = LimitsStore::new(&settings.limits_file);
    let previous = store.load()?.and_then(|l| l.get(key));
    store.update(key, value)?;

    match previous {
        Some(old) => println!(
            "{} {} limit {} -> {} in {}",
            style("✓").green(),
            key,
            old,
            value,
            store.path().display()
        ),
        None => println!(
            "{} {} limit set to {} in {}",
            style("✓").green(),
            key,
            value,
            store.path().display()
        ),
    }
    Ok(())
}
