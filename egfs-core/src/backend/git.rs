use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::Backend;
use crate::error::{Error, Result};

/// Drives the `git` binary inside one working directory.
#[derive(Debug, Clone)]
pub struct GitBackend {
    workdir: PathBuf,
    remote: Option<String>,
    identity: Option<(String, String)>,
}

impl GitBackend {
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
            remote: None,
            identity: None,
        }
    }

    /// `git init` the directory (creating it if needed) and return a backend on it.
    pub fn init<P: Into<PathBuf>>(workdir: P) -> Result<Self> {
        let backend = Self::new(workdir);
        fs::create_dir_all(&backend.workdir)?;
        backend.git(&["init", "-q"])?;
        Ok(backend)
    }

    /// Without a remote, [`Backend::push`] is a no-op.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Committer identity passed with `-c`, for checkouts without git config.
    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.identity = Some((name.into(), email.into()));
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let mut cmd = Command::new("git");
        if let Some((name, email)) = &self.identity {
            cmd.arg("-c")
                .arg(format!("user.name={name}"))
                .arg("-c")
                .arg(format!("user.email={email}"));
        }
        debug!("git {}", args.join(" "));
        Ok(cmd.args(args).current_dir(&self.workdir).output()?)
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Backend {
                command: format!("git {}", args.join(" ")),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                exit_code: output.status.code(),
            })
        }
    }

    fn has_ref(&self, reference: &str) -> Result<bool> {
        Ok(self
            .run(&["rev-parse", "--verify", "--quiet", reference])?
            .status
            .success())
    }
}

impl Backend for GitBackend {
    fn switch_branch(&mut self, branch: &str, create: bool) -> Result<()> {
        if self.has_ref(&format!("refs/heads/{branch}"))? {
            self.git(&["checkout", "-f", "-q", branch])?;
        } else if create {
            // Orphan start: point HEAD at the unborn branch and drop everything
            // the previous branch left in the index and working tree.
            self.git(&["symbolic-ref", "HEAD", &format!("refs/heads/{branch}")])?;
            self.git(&["rm", "-r", "-q", "--cached", "--ignore-unmatch", "."])?;
        } else {
            return Err(Error::Backend {
                command: format!("git checkout -f {branch}"),
                stderr: format!("branch {branch} does not exist"),
                exit_code: None,
            });
        }

        self.git(&["clean", "-f", "-d", "-q"])?;
        Ok(())
    }

    fn stage_all(&mut self) -> Result<()> {
        self.git(&["add", "-A"])?;
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        self.git(&["commit", "-q", "-m", message])?;
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        match self.remote.clone() {
            Some(remote) => {
                self.git(&["push", "-q", &remote, "HEAD"])?;
            }
            None => debug!("no remote configured, skipping push"),
        }
        Ok(())
    }

    fn list_files(&mut self) -> Result<Vec<String>> {
        let out = self.git(&["ls-files", "-z"])?;
        Ok(out
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect())
    }

    fn list_branches(&mut self) -> Result<Vec<String>> {
        let out = self.git(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
        Ok(out.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect())
    }

    fn last_commit_time(&mut self) -> Result<Option<DateTime<Utc>>> {
        if !self.has_ref("HEAD")? {
            return Ok(None);
        }

        let out = self.git(&["log", "-1", "--format=%cI"])?;
        let time = DateTime::parse_from_rfc3339(out.trim())
            .map_err(|e| Error::Format(format!("commit time {:?}: {e}", out.trim())))?;
        Ok(Some(time.with_timezone(&Utc)))
    }

    fn last_commit_message(&mut self) -> Result<Option<String>> {
        if !self.has_ref("HEAD")? {
            return Ok(None);
        }

        let out = self.git(&["log", "-1", "--format=%B"])?;
        Ok(Some(out.trim().to_owned()))
    }

    fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.workdir.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        fs::write(self.workdir.join(name), contents)?;
        Ok(())
    }
}
