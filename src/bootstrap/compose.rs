//! Docker compose lifecycle for the sandbox deployment.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Error, Result};

/// `docker compose up`, blocking until every service reports started
pub const UP_ARGS: [&str; 4] = ["compose", "up", "--detach", "--wait"];

pub const DOWN_ARGS: [&str; 2] = ["compose", "down"];

/// Compose deployment rooted at the sandbox directory
#[derive(Debug, Clone)]
pub struct ComposeStack {
    program: PathBuf,
    dir: PathBuf,
}

impl ComposeStack {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let program = which::which("docker")
            .map_err(|e| Error::compose(format!("docker CLI not found on PATH: {e}")))?;
        if !dir.is_dir() {
            return Err(Error::compose(format!(
                "sandbox directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(Self { program, dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn up(&self) -> Result<()> {
        self.run(&UP_ARGS).await
    }

    pub async fn down(&self) -> Result<()> {
        self.run(&DOWN_ARGS).await
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let command = format!("docker {}", args.join(" "));
        info!(command = %command, dir = %self.dir.display(), "Running compose command");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::io(format!("failed to run '{command}'"), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::compose_with_stderr(
                format!("'{command}' exited with {}", output.status),
                stderr,
            ));
        }

        debug!(command = %command, stdout = %String::from_utf8_lossy(&output.stdout).trim(), "Compose command finished");
        Ok(())
    }
}
