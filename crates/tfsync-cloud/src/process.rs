//! External process contract
//!
//! Provisioning tools are driven purely through argv, working directory,
//! exit code and captured output. [`CommandRunner`] is the seam; the real
//! implementation spawns a child process with a bounded timeout.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A single process invocation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// What came back from a finished (or abandoned) process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code; `None` when killed by a signal or timed out
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutcome {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome>;
}

/// Runs invocations as child processes.
///
/// When an invocation carries a timeout and it expires, the child is killed
/// and a timed-out outcome is returned instead of an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }

        tracing::info!("running: {}", invocation);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CloudError::BinaryNotFound(invocation.program.clone()),
            _ => CloudError::Io(e),
        })?;

        // Dropping the wait future drops the child, and kill_on_drop kills it
        let output = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    tracing::error!("timed out after {:?}: {}", limit, invocation);
                    return Ok(CommandOutcome::timed_out());
                }
            },
            None => child.wait_with_output().await?,
        };

        let outcome = CommandOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            timed_out: false,
        };

        if !outcome.success() {
            if !outcome.stdout.trim().is_empty() {
                tracing::error!("{}", outcome.stdout.trim_end());
            }
            if !outcome.stderr.trim().is_empty() {
                tracing::error!("{}", outcome.stderr.trim_end());
            }
        }

        Ok(outcome)
    }
}

/// Whether `program` can be executed: an existing path, or a name `which`
/// finds on PATH
pub async fn is_installed(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).exists();
    }
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_argv_and_display() {
        let inv = Invocation::new("terraform")
            .arg("import")
            .args(["aws_vpc.main", "vpc-1"])
            .current_dir("/tmp");
        assert_eq!(inv.argv(), vec!["terraform", "import", "aws_vpc.main", "vpc-1"]);
        assert_eq!(inv.to_string(), "terraform import aws_vpc.main vpc-1");
        assert_eq!(inv.working_dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_outcome_success() {
        assert!(CommandOutcome::exited(0).success());
        assert!(!CommandOutcome::exited(1).success());
        assert!(!CommandOutcome::timed_out().success());
        assert!(!CommandOutcome::default().success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_output() {
        let inv = Invocation::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let outcome = ProcessRunner.run(&inv).await.unwrap();
        assert_eq!(outcome.code, Some(3));
        assert_eq!(outcome.stdout.trim(), "out");
        assert_eq!(outcome.stderr.trim(), "err");
        assert!(!outcome.timed_out);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_working_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "").unwrap();
        let inv = Invocation::new("ls").current_dir(temp_dir.path());
        let outcome = ProcessRunner.run(&inv).await.unwrap();
        assert!(outcome.success());
        assert!(outcome.stdout.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_timeout() {
        let inv = Invocation::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let outcome = ProcessRunner.run(&inv).await.unwrap();
        assert!(outcome.timed_out);
        assert!(!outcome.success());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_process_runner_missing_binary() {
        let inv = Invocation::new("tfsync-definitely-not-installed");
        let err = ProcessRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, CloudError::BinaryNotFound(_)));
    }
}
