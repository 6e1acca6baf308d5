//! Terraform CLI wrapper

use crate::error::Result;
use crate::process::{CommandOutcome, CommandRunner, Invocation};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BINARY: &str = "terraform";
pub const DEFAULT_IMPORT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Builds terraform invocations and hands them to a [`CommandRunner`]
#[derive(Clone)]
pub struct Terraform {
    binary: String,
    runner: Arc<dyn CommandRunner>,
    import_timeout: Duration,
    init_timeout: Duration,
}

impl Terraform {
    pub fn new(binary: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            binary: binary.into(),
            runner,
            import_timeout: DEFAULT_IMPORT_TIMEOUT,
            init_timeout: DEFAULT_INIT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, import: Duration, init: Duration) -> Self {
        self.import_timeout = import;
        self.init_timeout = init;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn invocation(&self, dir: &Path) -> Invocation {
        Invocation::new(&self.binary).current_dir(dir)
    }

    /// `terraform init` in `dir`
    pub async fn init(&self, dir: &Path) -> Result<(Invocation, CommandOutcome)> {
        let inv = self.invocation(dir).arg("init").timeout(self.init_timeout);
        let outcome = self.runner.run(&inv).await?;
        Ok((inv, outcome))
    }

    /// Import one resource into an explicit state file, reading
    /// configuration from `config_dir`
    pub async fn import_into(
        &self,
        dir: &Path,
        config_dir: &Path,
        state_out: &Path,
        address: &str,
        id: &str,
    ) -> Result<(Invocation, CommandOutcome)> {
        let inv = self
            .invocation(dir)
            .arg("import")
            .arg(format!("-config={}", config_dir.display()))
            .arg(format!("-state-out={}", state_out.display()))
            .args([address, id])
            .timeout(self.import_timeout);
        let outcome = self.runner.run(&inv).await?;
        Ok((inv, outcome))
    }

    /// Import one resource using the default configuration and state of `dir`
    pub async fn import(
        &self,
        dir: &Path,
        address: &str,
        id: &str,
    ) -> Result<(Invocation, CommandOutcome)> {
        let inv = self
            .invocation(dir)
            .arg("import")
            .args([address, id])
            .timeout(self.import_timeout);
        let outcome = self.runner.run(&inv).await?;
        Ok((inv, outcome))
    }

    /// `terraform fmt <file>`
    pub async fn fmt(&self, dir: &Path, file: &str) -> Result<CommandOutcome> {
        let inv = self
            .invocation(dir)
            .args(["fmt", file])
            .timeout(self.import_timeout);
        self.runner.run(&inv).await
    }

    /// `terraform validate` in `dir`
    pub async fn validate(&self, dir: &Path) -> Result<CommandOutcome> {
        let inv = self
            .invocation(dir)
            .args(["validate", "-no-color"])
            .timeout(self.init_timeout);
        self.runner.run(&inv).await
    }

    pub async fn is_installed(&self) -> bool {
        crate::process::is_installed(&self.binary).await
    }
}

impl std::fmt::Debug for Terraform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terraform")
            .field("binary", &self.binary)
            .field("import_timeout", &self.import_timeout)
            .field("init_timeout", &self.init_timeout)
            .finish()
    }
}
