//! tfsync cloud reconciliation
//!
//! This crate provides the resource catalog abstraction and drives
//! terraform to bring live cloud resources under management.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   tfsync CLI                     │
//! │                 (tfsync sync)                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                tfsync-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │           Catalog Abstraction             │   │
//! │  │  trait ResourceKind { ... }               │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Reconciler  │  │  State Mgmt  │            │
//! │  └──────┬───────┘  └──────────────┘            │
//! └─────────┼───────────────────────────────────────┘
//!           │
//! ┌─────────▼───────┐ ┌─────────────────┐
//! │ terraform CLI   │ │ tfsync-cloud-aws│
//! │ (subprocess)    │ │  (aws CLI)      │
//! └─────────────────┘ └─────────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod process;
pub mod reconcile;
pub mod registry;
pub mod report;
pub mod state;
pub mod terraform;

// Re-exports
pub use catalog::{COMPUTED_ATTRIBUTES, CatalogEntry, ResourceKind};
pub use error::{CloudError, Result};
pub use process::{CommandOutcome, CommandRunner, Invocation, ProcessRunner, is_installed};
pub use reconcile::{CONFIG_FILE, Reconciler, SyncOptions, config_attributes, state_stanzas};
pub use registry::Registry;
pub use report::{FailureReason, ImportFailure, ImportReport};
pub use state::{STATE_FILE, StateDocument, StateInstance, StateManager, StateResource};
pub use terraform::Terraform;
