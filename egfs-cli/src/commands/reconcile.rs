use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs) -> Result<()> {
    let mut store = super::open_store(global)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message("Walking document branches...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = store.reconcile();
    spinner.finish_and_clear();
    let report = result?;

    if report.is_clean() {
        println!("{}", "✓ Index is consistent with all branches".green().bold());
        return Ok(());
    }

    if !report.added.is_empty() {
        println!("{}", "Added to index:".bold());
        for name in &report.added {
            println!("  {} {}", "+".green(), name);
        }
        println!();
    }

    if !report.unrecognized.is_empty() {
        println!("{}", "Branches with no recoverable document name:".bold());
        for branch in &report.unrecognized {
            println!("  {} {}", "?".yellow(), branch.dimmed());
        }
        println!();
    }

    if !report.missing_branches.is_empty() {
        println!("{}", "Indexed documents without a branch:".bold());
        for name in &report.missing_branches {
            println!("  {} {}", "!".red(), name);
        }
        println!();
    }

    Ok(())
}
