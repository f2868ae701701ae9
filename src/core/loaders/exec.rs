// ─── Java execution ───
// Build steps (Forge installer, Spigot BuildTools) run through a caller
// supplied runtime; `JavaCommand` is a plain `java` process implementation.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::core::error::{CoreError, CoreResult};
use crate::core::version::Runtime;

/// One java invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub runtime: Runtime,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

/// Receives build output one line at a time.
pub type LineSink = dyn for<'l> Fn(&'l str) + Send + Sync;

#[async_trait]
pub trait ExecRuntime: Send + Sync {
    /// Run java to completion, forwarding each stdout and stderr line to
    /// `on_line`.
    async fn exec(&self, request: ExecRequest, on_line: &LineSink) -> CoreResult<()>;
}

/// Runs a fixed java binary regardless of the requested runtime.
#[derive(Debug, Clone)]
pub struct JavaCommand {
    java_bin: PathBuf,
}

impl JavaCommand {
    pub fn new(java_bin: impl Into<PathBuf>) -> Self {
        Self {
            java_bin: java_bin.into(),
        }
    }
}

impl Default for JavaCommand {
    fn default() -> Self {
        Self::new("java")
    }
}

#[async_trait]
impl ExecRuntime for JavaCommand {
    async fn exec(&self, request: ExecRequest, on_line: &LineSink) -> CoreResult<()> {
        info!(
            "Running {:?} in {:?} (requested runtime {:?})",
            self.java_bin, request.current_dir, request.runtime
        );
        debug!("Args: {:?}", request.args);

        let mut child = Command::new(&self.java_bin)
            .args(&request.args)
            .current_dir(&request.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CoreError::JavaExecution(format!("{:?}: {}", self.java_bin, e)))?;

        let (stdout, stderr) = tokio::join!(
            forward_lines(child.stdout.take(), on_line),
            forward_lines(child.stderr.take(), on_line),
        );
        stdout?;
        stderr?;

        let status = child
            .wait()
            .await
            .map_err(|e| CoreError::JavaExecution(e.to_string()))?;
        if !status.success() {
            return Err(CoreError::JavaExecution(format!(
                "{:?} exited with {}",
                self.java_bin, status
            )));
        }
        Ok(())
    }
}

async fn forward_lines<R>(stream: Option<R>, on_line: &LineSink) -> CoreResult<()>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut lines = BufReader::new(stream).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| CoreError::JavaExecution(e.to_string()))?
    {
        on_line(&line);
    }
    Ok(())
}
