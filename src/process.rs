// ABOUTME: Host process execution with line-by-line output capture.
// ABOUTME: Optionally tees captured lines to the terminal as they arrive.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Result of a host command invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, newline-joined, both trimmed.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Errors from host process execution.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("failed to read output of `{command}`: {source}")]
    Output {
        command: String,
        source: std::io::Error,
    },
}

/// Runs external commands from a fixed working directory.
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Runner rooted at the current working directory.
    pub fn current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Run a command, echoing each output line to the terminal as it arrives.
    pub async fn run(&self, arguments: &[&str]) -> Result<ProcessOutput, ProcessError> {
        self.run_inner(arguments, true).await
    }

    /// Run a command capturing output without echoing it.
    pub async fn run_quiet(&self, arguments: &[&str]) -> Result<ProcessOutput, ProcessError> {
        self.run_inner(arguments, false).await
    }

    async fn run_inner(
        &self,
        arguments: &[&str],
        tee: bool,
    ) -> Result<ProcessOutput, ProcessError> {
        let command_line = arguments.join(" ");
        tracing::debug!("running `$ {}` in {}", command_line, self.cwd.display());

        let Some((program, args)) = arguments.split_first() else {
            return Err(ProcessError::Spawn {
                command: command_line,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let (stdout, stderr) = tokio::join!(
            drain_lines(stdout_pipe, tee, false),
            drain_lines(stderr_pipe, tee, true),
        );

        let status = child.wait().await.map_err(|source| ProcessError::Output {
            command: command_line.clone(),
            source,
        })?;

        // A signal-terminated process carries no code; report plain failure.
        let exit_code = status.code().unwrap_or(1);
        tracing::debug!(exit_code, "`$ {}` finished", command_line);

        Ok(ProcessOutput {
            exit_code,
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        })
    }
}

async fn drain_lines(
    pipe: Option<impl tokio::io::AsyncRead + Unpin>,
    tee: bool,
    to_stderr: bool,
) -> String {
    let Some(pipe) = pipe else {
        return String::new();
    };

    let mut captured = String::new();
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tee {
            if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        }
        captured.push_str(&line);
        captured.push('\n');
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let runner = ProcessRunner::new("/tmp");
        let out = runner.run_quiet(&["echo", "hello"]).await.unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout, "hello");
        assert!(out.stderr.is_empty());
        assert_eq!(out.combined(), "hello");
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let runner = ProcessRunner::new("/tmp");
        let out = runner.run_quiet(&["sh", "-c", "echo oops >&2; exit 3"]).await.unwrap();
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stderr, "oops");
    }

    #[tokio::test]
    async fn combines_both_streams() {
        let runner = ProcessRunner::new("/tmp");
        let out = runner
            .run_quiet(&["sh", "-c", "echo out; echo err >&2"])
            .await
            .unwrap();
        assert_eq!(out.combined(), "out\nerr");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let runner = ProcessRunner::new("/tmp");
        let err = runner
            .run_quiet(&["definitely-not-a-real-binary-4217"])
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
