use anyhow::Result;
use colored::Colorize;
use egfs_core::FileStat;

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let mut store = super::open_store(global)?;
    let stats: Vec<FileStat> = store.list_all()?.iter().map(|f| f.stat()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.is_empty() {
        println!("{}", "No documents yet".yellow());
        return Ok(());
    }

    println!("{}", "Documents".bold().cyan());
    println!();

    for stat in &stats {
        let modified = stat
            .mod_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>10}  {}  {}",
            stat.size.to_string().cyan(),
            modified.dimmed(),
            stat.name
        );
    }

    println!();
    println!("{} document(s)", stats.len().to_string().cyan());

    Ok(())
}
