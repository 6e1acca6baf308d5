//! AWS resource kinds for tfsync
//!
//! This crate implements the ResourceKind trait for AWS services,
//! enabling tfsync to enumerate live resources and import them.
//!
//! # Kinds
//!
//! - **Network**: vpc, igw, elb, eip, nif, nacl, rt, sg, subnet
//! - **Compute**: asg, launch_template, ec2, emr
//! - **Database**: ecc, rds
//! - **Messaging**: cwa, sns, sqs
//! - **IAM**: iam (groups), iam_role
//! - **Storage**: s3
//!
//! # Requirements
//!
//! - `aws` CLI must be installed and configured
//! - Credentials and region come from the aws CLI configuration, optionally
//!   overridden by profile and region settings
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tfsync_cloud_aws::{AwsCli, registry};
//!
//! let cli = AwsCli::new("aws").with_region(Some("us-east-1".into()));
//! let registry = registry(Arc::new(cli));
//! let kinds = registry.resolve(&["network"])?;
//! ```

pub mod aws_cli;
pub mod error;
pub mod kinds;
pub mod tags;

pub use aws_cli::{AwsApi, AwsCli};
pub use error::{AwsError, Result};
pub use kinds::registry;
