use anyhow::Result;
use colored::Colorize;

use crate::GlobalArgs;

const PREVIEW_CHARS: usize = 60;

pub fn run(global: &GlobalArgs, name: String, limit: Option<usize>) -> Result<()> {
    let mut store = super::open_store(global)?;
    let document = store.document(&name)?;

    if document.entries.is_empty() {
        println!("{}", "No entries yet".yellow());
        return Ok(());
    }

    println!("{} {}", "Entries of".bold().cyan(), name.bold());
    println!("  {}: {}", "Branch".bold(), document.branch().dimmed());
    println!();

    let total = document.entries.len();
    let to_show = limit.unwrap_or(total).min(total);

    for entry in document.entries.iter().rev().take(to_show) {
        println!(
            "{} {}",
            "entry".yellow().bold(),
            entry.id().yellow()
        );
        println!(
            "{}: {}",
            "Date".bold(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.f")
        );
        println!("{}: {} bytes", "Size".bold(), entry.content.len());

        match std::str::from_utf8(&entry.content) {
            Ok(text) => {
                let first_line = text.lines().next().unwrap_or("");
                let preview: String = first_line.chars().take(PREVIEW_CHARS).collect();
                println!();
                println!("    {}", preview);
            }
            Err(_) => println!("    {}", "(binary)".dimmed()),
        }
        println!();
    }

    if total > to_show {
        println!(
            "{}",
            format!("... and {} older entries", total - to_show).dimmed()
        );
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}
