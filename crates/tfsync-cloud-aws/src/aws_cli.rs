//! aws CLI wrapper
//!
//! Every listing goes through `aws <service> <operation> --output json`.
//! The CLI follows pagination tokens itself, so each call returns the
//! complete result set.

use crate::error::{AwsError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Source of AWS API responses
#[async_trait]
pub trait AwsApi: Send + Sync {
    /// Call `operation` of `service` and return the decoded response
    async fn call(&self, service: &str, operation: &str, args: &[&str]) -> Result<Value>;
}

/// aws CLI wrapper
#[derive(Debug, Clone)]
pub struct AwsCli {
    binary: String,
    profile: Option<String>,
    region: Option<String>,
    timeout: Duration,
}

impl AwsCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            profile: None,
            region: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Full argument list after the binary name
    pub fn command_args(&self, service: &str, operation: &str, args: &[&str]) -> Vec<String> {
        let mut argv: Vec<String> = vec![service.into(), operation.into()];
        argv.extend(args.iter().map(|a| a.to_string()));
        argv.extend(["--output".to_string(), "json".to_string()]);
        if let Some(profile) = &self.profile {
            argv.extend(["--profile".to_string(), profile.clone()]);
        }
        if let Some(region) = &self.region {
            argv.extend(["--region".to_string(), region.clone()]);
        }
        argv
    }

    /// Check that the aws CLI can be executed
    pub async fn check_installed(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|_| AwsError::CliNotFound(self.binary.clone()))?;

        if !output.status.success() {
            return Err(AwsError::CliNotFound(self.binary.clone()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run an aws command and return stdout
    async fn run_command(&self, argv: &[String]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(argv);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!("running: {} {}", self.binary, argv.join(" "));

        let child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AwsError::CliNotFound(self.binary.clone()),
            _ => AwsError::IoError(e),
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                AwsError::CommandFailed(format!(
                    "{} {} timed out after {:?}",
                    self.binary,
                    argv.join(" "),
                    self.timeout
                ))
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AwsError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl AwsApi for AwsCli {
    async fn call(&self, service: &str, operation: &str, args: &[&str]) -> Result<Value> {
        let argv = self.command_args(service, operation, args);
        let output = self.run_command(&argv).await?;

        // Some operations print nothing when there is nothing to list
        if output.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let cli = AwsCli::new("aws");
        assert_eq!(
            cli.command_args("ec2", "describe-vpcs", &[]),
            vec!["ec2", "describe-vpcs", "--output", "json"]
        );

        let cli = AwsCli::new("aws")
            .with_profile(Some("prod".into()))
            .with_region(Some("eu-west-1".into()));
        assert_eq!(
            cli.command_args("iam", "get-group", &["--group-name", "admins"]),
            vec![
                "iam",
                "get-group",
                "--group-name",
                "admins",
                "--output",
                "json",
                "--profile",
                "prod",
                "--region",
                "eu-west-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let cli = AwsCli::new("tfsync-no-such-aws-cli");
        let err = cli.call("ec2", "describe-vpcs", &[]).await.unwrap_err();
        assert!(matches!(err, AwsError::CliNotFound(_)));
    }
}
