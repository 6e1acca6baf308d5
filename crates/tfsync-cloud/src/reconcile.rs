//! Per-kind reconciliation: skeleton configuration, state import and
//! configuration sync

use crate::catalog::ResourceKind;
use crate::error::{CloudError, Result};
use crate::report::{FailureReason, ImportReport};
use crate::state::{StateDocument, StateManager};
use crate::terraform::Terraform;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfsync_core::{
    Attribute, AttributeValue, MapStyle, Renderer, ResourceStanza, render_document,
};
use tokio::fs;

pub const CONFIG_FILE: &str = "main.tf";

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Drop this kind's resources from existing state and import them again
    pub override_state: bool,

    /// Log imports and rendered configuration instead of running any
    /// subprocess or writing files
    pub dry_run: bool,

    pub renderer: Renderer,
    pub map_style: MapStyle,

    /// Extra attributes to drop, keyed by resource type
    pub ignore: HashMap<String, Vec<String>>,
}

impl SyncOptions {
    /// Whether the attribute is listed under `ignore` for the resource type
    pub fn ignored_by_setting(&self, resource_type: &str, key: &str) -> bool {
        self.ignore
            .get(resource_type)
            .is_some_and(|keys| keys.iter().any(|k| k == key))
    }
}

/// Turn recorded attributes into sorted, filtered configuration attributes.
///
/// Keys for which `ignored` returns true are dropped, as are null, empty
/// string and empty list values.
pub fn config_attributes<F>(attributes: Map<String, Value>, ignored: F) -> Vec<Attribute>
where
    F: Fn(&str, &Value) -> bool,
{
    let mut attrs: Vec<Attribute> = attributes
        .into_iter()
        .filter(|(key, value)| !ignored(key, value))
        .map(|(key, value)| Attribute::new(key, AttributeValue::from(value)))
        .filter(|attr| attr.value.is_non_empty())
        .collect();
    attrs.sort_by(|a, b| a.name.cmp(&b.name));
    attrs
}

/// Stanzas for every resource of a state document, using `ignored` as the
/// attribute filter. Resources without instances yield empty stanzas.
pub fn state_stanzas<F>(state: &StateDocument, ignored: F) -> Vec<ResourceStanza>
where
    F: Fn(&str, &str, &Value) -> bool,
{
    state
        .resources
        .iter()
        .map(|resource| {
            let attributes = resource.attributes().cloned().unwrap_or_default();
            let attrs = config_attributes(attributes, |key, value| {
                ignored(&resource.resource_type, key, value)
            });
            ResourceStanza::new(&resource.resource_type, &resource.name).with_attributes(attrs)
        })
        .collect()
}

/// Drives one [`ResourceKind`] through its three reconciliation steps
pub struct Reconciler {
    kind: Arc<dyn ResourceKind>,
    terraform: Terraform,
    options: SyncOptions,
}

impl Reconciler {
    pub fn new(kind: Arc<dyn ResourceKind>, terraform: Terraform, options: SyncOptions) -> Self {
        Self {
            kind,
            terraform,
            options,
        }
    }

    pub fn kind(&self) -> &dyn ResourceKind {
        self.kind.as_ref()
    }

    /// `<output>/<kind name>`
    pub fn kind_dir(&self, output: &Path) -> PathBuf {
        output.join(self.kind.name())
    }

    /// Run every step in the kind's own directory under `output`
    pub async fn run(&self, output: &Path) -> Result<ImportReport> {
        let dir = self.kind_dir(output);
        if !self.options.dry_run {
            fs::create_dir_all(&dir).await?;
        }
        let root = self.resolve_root(&dir).await?;
        tracing::info!("[{}] syncing into {}", self.kind.name(), root.display());

        let count = self.create_config(&root).await?;
        tracing::info!("[{}] found {} resources", self.kind.name(), count);

        let report = self.load_state(&root).await?;
        self.sync_config(&root).await?;
        Ok(report)
    }

    /// Write an empty stanza for every live resource to `main.tf`
    pub async fn create_config(&self, root: &Path) -> Result<usize> {
        let mut seen = HashSet::new();
        let stanzas: Vec<ResourceStanza> = self
            .kind
            .list_all()
            .await?
            .into_iter()
            .filter(|entry| seen.insert(entry.address()))
            .map(|entry| ResourceStanza::new(entry.resource_type, entry.resource_name))
            .collect();

        let text = render_document(&stanzas, &self.options.renderer, self.options.map_style)?;
        self.write_config(root, &text).await?;
        Ok(stanzas.len())
    }

    /// Import every live resource that is not yet in the state file.
    ///
    /// Import failures are collected in the returned report; only a failed
    /// `terraform init` aborts.
    pub async fn load_state(&self, root: &Path) -> Result<ImportReport> {
        let root = self.resolve_root(root).await?;
        let manager = StateManager::in_dir(&root);
        let name = self.kind.name();

        let existing = if manager.exists() {
            let mut state = manager.load().await?;
            if self.options.override_state {
                let removed = state.remove_types(self.kind.included_resource_types());
                if self.options.dry_run {
                    tracing::info!("[dry-run] would drop {} resources from state", removed);
                } else if removed > 0 {
                    manager.save(&state).await?;
                    tracing::info!("[{}] dropped {} resources from state", name, removed);
                }
            }
            state.addresses()
        } else if self.options.dry_run {
            tracing::info!("[dry-run] would create {}", manager.path().display());
            HashSet::new()
        } else {
            manager.load_or_init().await?.addresses()
        };

        let mut report = ImportReport::new(name);
        let mut seen = HashSet::new();
        let mut initialized = false;

        for entry in self.kind.list_all().await? {
            let address = entry.address();
            if !seen.insert(address.clone()) {
                tracing::warn!("[{}] duplicate resource {} ignored", name, address);
                continue;
            }
            if existing.contains(&address) {
                tracing::debug!("[{}] {} already in state", name, address);
                report.add_skipped(address);
                continue;
            }
            if self.options.dry_run {
                tracing::info!("[dry-run] would import {} {}", address, entry.import_id());
                report.add_skipped(address);
                continue;
            }

            if !initialized {
                self.init(&root).await?;
                initialized = true;
            }

            match self
                .terraform
                .import_into(&root, &root, manager.path(), &address, entry.import_id())
                .await
            {
                Ok((invocation, outcome)) => match FailureReason::from_outcome(&outcome) {
                    None => report.add_imported(address),
                    Some(reason) => report.add_failure(address, invocation.to_string(), reason),
                },
                Err(e) => {
                    let command = format!(
                        "{} import {} {}",
                        self.terraform.binary(),
                        address,
                        entry.import_id()
                    );
                    report.add_failure(address, command, FailureReason::Spawn(e.to_string()));
                }
            }
        }

        report.finish();
        report.log_failures();
        Ok(report)
    }

    async fn init(&self, root: &Path) -> Result<()> {
        let (invocation, outcome) = self.terraform.init(root).await?;
        match FailureReason::from_outcome(&outcome) {
            None => Ok(()),
            Some(FailureReason::TimedOut) => Err(CloudError::Timeout(invocation.to_string())),
            Some(reason) => Err(CloudError::CommandFailed(format!(
                "{} in {} ({})",
                invocation,
                root.display(),
                reason
            ))),
        }
    }

    /// Regenerate `main.tf` from the state file
    pub async fn sync_config(&self, root: &Path) -> Result<usize> {
        let manager = StateManager::in_dir(root);
        let state = if self.options.dry_run && !manager.exists() {
            StateDocument::empty()
        } else {
            manager.load().await?
        };

        let mut stanzas = Vec::with_capacity(state.resources.len());
        for resource in &state.resources {
            let mut attributes = resource.attributes().cloned().unwrap_or_default();
            self.kind
                .amend_attributes(&resource.resource_type, &resource.name, &mut attributes)
                .await?;
            let attrs = config_attributes(attributes, |key, value| {
                self.kind.ignore_attribute(key, value)
                    || self.options.ignored_by_setting(&resource.resource_type, key)
            });
            stanzas.push(
                ResourceStanza::new(&resource.resource_type, &resource.name).with_attributes(attrs),
            );
        }

        let text = render_document(&stanzas, &self.options.renderer, self.options.map_style)?;
        self.write_config(root, &text).await?;

        if self.options.dry_run {
            tracing::info!("[dry-run] would run {} fmt {}", self.terraform.binary(), CONFIG_FILE);
        } else {
            match self.terraform.fmt(root, CONFIG_FILE).await {
                Ok(outcome) if outcome.success() => {}
                Ok(_) => tracing::warn!("[{}] formatting {} failed", self.kind.name(), CONFIG_FILE),
                Err(e) => tracing::warn!("[{}] formatting {} failed: {}", self.kind.name(), CONFIG_FILE, e),
            }
        }

        Ok(stanzas.len())
    }

    /// Canonical form of `dir`; in dry-run a directory that was never
    /// created is used as given
    async fn resolve_root(&self, dir: &Path) -> Result<PathBuf> {
        if self.options.dry_run && !dir.exists() {
            return Ok(dir.to_path_buf());
        }
        Ok(fs::canonicalize(dir).await?)
    }

    async fn write_config(&self, root: &Path, text: &str) -> Result<()> {
        let path = root.join(CONFIG_FILE);
        if self.options.dry_run {
            tracing::info!("[dry-run] would write {}", path.display());
            tracing::debug!("[dry-run] {}:\n{}", CONFIG_FILE, text);
            return Ok(());
        }
        fs::write(&path, text).await?;
        Ok(())
    }
}
