//! Import run results

use crate::process::CommandOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a single import did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Process exited with a nonzero code
    ExitCode(i32),
    /// Process was terminated by a signal
    Signal,
    /// Process exceeded its timeout and was killed
    TimedOut,
    /// Process could not be started
    Spawn(String),
}

impl FailureReason {
    /// Reason for an unsuccessful outcome; `None` when it succeeded
    pub fn from_outcome(outcome: &CommandOutcome) -> Option<Self> {
        if outcome.success() {
            return None;
        }
        Some(if outcome.timed_out {
            FailureReason::TimedOut
        } else {
            match outcome.code {
                Some(code) => FailureReason::ExitCode(code),
                None => FailureReason::Signal,
            }
        })
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ExitCode(code) => write!(f, "exit code {}", code),
            FailureReason::Signal => write!(f, "terminated by signal"),
            FailureReason::TimedOut => write!(f, "timed out"),
            FailureReason::Spawn(msg) => write!(f, "could not start: {}", msg),
        }
    }
}

/// A failed import with the command line that was run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub address: String,
    pub command: String,
    pub reason: FailureReason,
}

/// Result of importing every resource of one kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Kind name
    pub kind: String,

    /// Addresses imported successfully
    pub imported: Vec<String>,

    /// Addresses already in state, or not run because of dry-run
    pub skipped: Vec<String>,

    /// Failed imports
    pub failed: Vec<ImportFailure>,

    pub started_at: DateTime<Utc>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ImportReport {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            imported: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_imported(&mut self, address: String) {
        self.imported.push(address);
    }

    pub fn add_skipped(&mut self, address: String) {
        self.skipped.push(address);
    }

    pub fn add_failure(&mut self, address: String, command: String, reason: FailureReason) {
        self.failed.push(ImportFailure {
            address,
            command,
            reason,
        });
    }

    /// Stamp the elapsed time since `started_at`
    pub fn finish(&mut self) {
        let elapsed = Utc::now() - self.started_at;
        self.duration_ms = elapsed.num_milliseconds().max(0) as u64;
    }

    /// Emit one warning per failure
    pub fn log_failures(&self) {
        for failure in &self.failed {
            tracing::warn!(
                "[{}] import of {} failed ({}): {}",
                self.kind,
                failure.address,
                failure.reason,
                failure.command
            );
        }
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} imported, {} skipped, {} failed",
            self.kind,
            self.imported.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}
