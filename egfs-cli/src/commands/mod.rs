pub mod cat;
pub mod init;
pub mod log;
pub mod ls;
pub mod reconcile;
pub mod serve;
pub mod write;

use anyhow::{Context, Result};
use dialoguer::Password;
use egfs_core::config::CONFIG_FILE;
use egfs_core::{Config, GitBackend, Store};
use tracing::debug;

use crate::GlobalArgs;

pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => Config::load_or_default(CONFIG_FILE)?,
    };

    if let Some(workdir) = &global.workdir {
        config.workdir = workdir.clone();
    }
    if let Some(remote) = &global.remote {
        config.remote = Some(remote.clone());
    }

    config.validate()?;
    Ok(config)
}

pub fn password(global: &GlobalArgs, confirm: bool) -> Result<String> {
    if let Some(password) = &global.password {
        return Ok(password.clone());
    }

    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

pub fn open_store(global: &GlobalArgs) -> Result<Store<GitBackend>> {
    let config = load_config(global)?;

    if !config.workdir.join(".git").exists() {
        anyhow::bail!(
            "{} is not an egfs repository. Run 'egfs init' first.",
            config.workdir.display()
        );
    }

    debug!(
        "opening {} (index on {})",
        config.workdir.display(),
        config.primary_branch
    );
    let password = password(global, false)?;
    Ok(Store::from_config(&config, password.as_bytes())?)
}
