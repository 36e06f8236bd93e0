use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::GitBackend;
use crate::error::{Error, Result};
use crate::naming::{DEFAULT_PRIMARY_BRANCH, RESERVED_FILE};

pub const CONFIG_FILE: &str = "egfs.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Git checkout the store operates in.
    pub workdir: PathBuf,
    /// Remote to push to after every commit; local only when unset.
    pub remote: Option<String>,
    pub primary_branch: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            remote: None,
            primary_branch: DEFAULT_PRIMARY_BRANCH.to_string(),
            author_name: None,
            author_email: None,
            port: 3030,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let primary = self.primary_branch.trim();
        if primary.is_empty() || primary == RESERVED_FILE || primary.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "invalid primary_branch {:?}",
                self.primary_branch
            )));
        }
        if self.author_name.is_some() != self.author_email.is_some() {
            return Err(Error::Config(
                "author_name and author_email must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn backend(&self) -> GitBackend {
        let mut backend = GitBackend::new(self.workdir.clone());
        if let Some(remote) = &self.remote {
            backend = backend.with_remote(remote.clone());
        }
        if let (Some(name), Some(email)) = (&self.author_name, &self.author_email) {
            backend = backend.with_identity(name.clone(), email.clone());
        }
        backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.primary_branch, "master");
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            workdir = "/srv/vault"
            remote = "origin"
            primary_branch = "main"
            author_name = "egfs"
            author_email = "egfs@example.com"
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.workdir, PathBuf::from("/srv/vault"));
        assert_eq!(config.remote.as_deref(), Some("origin"));
        assert_eq!(config.primary_branch, "main");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend().workdir(), Path::new("/srv/vault"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Config::parse("port = \"x\""), Err(Error::Config(_))));
        assert!(matches!(
            Config::parse("primary_branch = \"file\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::parse("author_name = \"only me\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        fs::write(&path, "remote = \"backup\"\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.remote.as_deref(), Some("backup"));
    }
}
