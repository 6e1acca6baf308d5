//! Terraform state documents
//!
//! Reads and writes the `terraform.tfstate` JSON document that records which
//! resources are tracked and their last-known attributes. Fields this tool
//! does not interpret are carried through unchanged.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const STATE_FILE: &str = "terraform.tfstate";
const STATE_VERSION: u32 = 4;
const INITIAL_TERRAFORM_VERSION: &str = "0.12.24";

/// Whole state document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub version: u32,

    #[serde(default)]
    pub terraform_version: String,

    #[serde(default)]
    pub serial: u64,

    #[serde(default)]
    pub lineage: String,

    #[serde(default, alias = "output")]
    pub outputs: Map<String, Value>,

    #[serde(default)]
    pub resources: Vec<StateResource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateDocument {
    /// Empty container with a fresh lineage
    pub fn empty() -> Self {
        Self {
            version: STATE_VERSION,
            terraform_version: INITIAL_TERRAFORM_VERSION.to_string(),
            serial: 1,
            lineage: uuid::Uuid::new_v4().to_string(),
            outputs: Map::new(),
            resources: Vec::new(),
            extra: Map::new(),
        }
    }

    /// `<type>.<name>` of every tracked resource
    pub fn addresses(&self) -> HashSet<String> {
        self.resources.iter().map(StateResource::address).collect()
    }

    /// Drop resources whose type is in `types`, returning how many went
    pub fn remove_types(&mut self, types: &[&str]) -> usize {
        let before = self.resources.len();
        self.resources
            .retain(|r| !types.contains(&r.resource_type.as_str()));
        before - self.resources.len()
    }

    /// Copy of the document keeping only resources of the given types,
    /// compared case-insensitively
    pub fn extract_types<S: AsRef<str>>(&self, types: &[S]) -> StateDocument {
        let wanted: HashSet<String> = types.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut extracted = self.clone();
        extracted
            .resources
            .retain(|r| wanted.contains(&r.resource_type.to_lowercase()));
        extracted
    }
}

/// One tracked resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResource {
    #[serde(rename = "type")]
    pub resource_type: String,

    pub name: String,

    #[serde(default)]
    pub instances: Vec<StateInstance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StateResource {
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    /// Attributes of the single instance, if there is one
    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.instances.first().map(|i| &i.attributes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateInstance {
    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads and writes one state file
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// State manager for `terraform.tfstate` inside `root`
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the document. A missing file is [`CloudError::StateNotFound`],
    /// distinct from a parse failure.
    pub async fn load(&self) -> Result<StateDocument> {
        if !self.path.exists() {
            return Err(CloudError::StateNotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path).await?;
        let state: StateDocument = serde_json::from_str(&content)?;

        if state.version != STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "{}: state format version {} is not supported (expected {})",
                self.path.display(),
                state.version,
                STATE_VERSION
            )));
        }

        tracing::debug!(
            "Loaded state {} with {} resources",
            self.path.display(),
            state.resources.len()
        );
        Ok(state)
    }

    /// Load the document, writing an empty container first when the file
    /// does not exist yet
    pub async fn load_or_init(&self) -> Result<StateDocument> {
        if self.path.exists() {
            return self.load().await;
        }
        let state = StateDocument::empty();
        self.write(&state).await?;
        tracing::debug!("Created empty state {}", self.path.display());
        Ok(state)
    }

    /// Save the document, keeping the previous file as `<file>.backup`
    pub async fn save(&self, state: &StateDocument) -> Result<()> {
        if self.path.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&self.path, &backup).await?;
            tracing::debug!("Created state backup {}", backup.display());
        }
        self.write(state).await
    }

    async fn write(&self, state: &StateDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content).await?;
        tracing::debug!(
            "Saved state {} with {} resources",
            self.path.display(),
            state.resources.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> Value {
        json!({
            "version": 4,
            "terraform_version": "0.12.24",
            "serial": 7,
            "lineage": "6f1c0e0c-1111-2222-3333-444455556666",
            "outputs": {},
            "resources": [
                {
                    "mode": "managed",
                    "type": "aws_s3_bucket",
                    "name": "logs",
                    "provider": "provider.aws",
                    "instances": [
                        {"schema_version": 0, "attributes": {"bucket": "logs", "acl": "private"}}
                    ]
                },
                {
                    "mode": "managed",
                    "type": "AWS_VPC",
                    "name": "main",
                    "instances": [{"attributes": {"cidr_block": "10.0.0.0/16"}}]
                }
            ]
        })
    }

    #[test]
    fn test_parse_and_addresses() {
        let state: StateDocument = serde_json::from_value(sample()).unwrap();
        assert_eq!(state.resources.len(), 2);
        assert!(state.addresses().contains("aws_s3_bucket.logs"));
        assert_eq!(
            state.resources[0].attributes().unwrap()["acl"],
            json!("private")
        );
        assert_eq!(state.resources[0].extra["mode"], json!("managed"));
    }

    #[test]
    fn test_output_alias() {
        let state: StateDocument = serde_json::from_value(json!({
            "version": 4,
            "output": {"a": 1},
            "resources": []
        }))
        .unwrap();
        assert_eq!(state.outputs["a"], json!(1));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let state: StateDocument = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["resources"][0]["provider"], json!("provider.aws"));
        assert_eq!(value["resources"][0]["instances"][0]["schema_version"], json!(0));
    }

    #[test]
    fn test_extract_types_is_case_insensitive() {
        let state: StateDocument = serde_json::from_value(sample()).unwrap();
        let extracted = state.extract_types(&["aws_vpc"]);
        assert_eq!(extracted.resources.len(), 1);
        assert_eq!(extracted.resources[0].name, "main");
        assert_eq!(extracted.lineage, state.lineage);
    }

    #[test]
    fn test_remove_types() {
        let mut state: StateDocument = serde_json::from_value(sample()).unwrap();
        assert_eq!(state.remove_types(&["aws_s3_bucket"]), 1);
        assert_eq!(state.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::in_dir(temp_dir.path());

        let state: StateDocument = serde_json::from_value(sample()).unwrap();
        manager.save(&state).await.unwrap();
        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded, state);
        assert!(temp_dir.path().join("terraform.tfstate.backup").exists());
    }

    #[tokio::test]
    async fn test_missing_state_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::in_dir(temp_dir.path());
        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::StateNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_state_is_json_error() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::in_dir(temp_dir.path());
        std::fs::write(manager.path(), "{ not json").unwrap();
        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::Json(_)));
    }

    #[tokio::test]
    async fn test_old_format_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::in_dir(temp_dir.path());
        std::fs::write(manager.path(), r#"{"version": 3, "modules": []}"#).unwrap();
        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::StateError(_)));
    }

    #[tokio::test]
    async fn test_load_or_init_creates_container() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::in_dir(temp_dir.path().join("s3"));

        let state = manager.load_or_init().await.unwrap();
        assert!(manager.exists());
        assert_eq!(state.version, 4);
        assert_eq!(state.serial, 1);
        assert!(state.resources.is_empty());
        assert!(uuid::Uuid::parse_str(&state.lineage).is_ok());

        let again = manager.load_or_init().await.unwrap();
        assert_eq!(again.lineage, state.lineage);
    }
}
