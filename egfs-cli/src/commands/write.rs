use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs, name: String, file: Option<PathBuf>) -> Result<()> {
    let content = match &file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let mut store = super::open_store(global)?;
    let entry = store
        .write(&name, content)
        .with_context(|| format!("Failed to write to {name}"))?;

    println!("{}", "✓ Entry written".green().bold());
    println!("  {}: {}", "Document".bold(), name);
    println!("  {}: {}", "Entry".bold(), entry.id().dimmed());
    println!(
        "  {}: {}",
        "Time".bold(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.f")
    );
    println!("  {}: {} bytes", "Size".bold(), entry.content.len());

    Ok(())
}
