use anyhow::Result;
use colored::Colorize;
use egfs_core::{GitBackend, Store};

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs) -> Result<()> {
    let config = super::load_config(global)?;

    if !config.workdir.join(".git").exists() {
        GitBackend::init(&config.workdir)?;
        println!(
            "{} {}",
            "Initialized git repository in".bold(),
            config.workdir.display()
        );
    }

    let password = super::password(global, true)?;
    let mut store = Store::from_config(&config, password.as_bytes())?;

    if store.initialize()? {
        println!(
            "{}",
            format!("✓ Created empty index on {}", config.primary_branch)
                .green()
                .bold()
        );
    } else {
        println!("{}", "Index already exists, nothing to do".yellow());
    }

    Ok(())
}
