//! tfsync settings
//!
//! Settings come from an optional YAML file. Every field has a default, so a
//! missing file or a partial file is fine.
//!
//! ```yaml
//! terraform:
//!   binary: terraform
//!   import_timeout_secs: 300
//! aws:
//!   profile: staging
//!   region: eu-west-1
//! render:
//!   empty_lists: elide
//!   map_style: assignment
//! ignore:
//!   aws_instance: [private_dns, public_ip]
//! ```

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tfsync_core::{EmptyListPolicy, MapStyle, RenderOptions};

pub const CONFIG_PATH_ENV: &str = "TFSYNC_CONFIG_PATH";
const LOCAL_CANDIDATES: [&str; 2] = ["tfsync.yaml", ".tfsync.yaml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub terraform: TerraformSettings,
    pub aws: AwsSettings,
    pub render: RenderSettings,
    /// Extra attributes to drop per resource type
    pub ignore: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformSettings {
    pub binary: String,
    pub import_timeout_secs: u64,
    pub init_timeout_secs: u64,
}

impl Default for TerraformSettings {
    fn default() -> Self {
        Self {
            binary: "terraform".to_string(),
            import_timeout_secs: 300,
            init_timeout_secs: 600,
        }
    }
}

impl TerraformSettings {
    pub fn import_timeout(&self) -> Duration {
        Duration::from_secs(self.import_timeout_secs)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub binary: String,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            binary: "aws".to_string(),
            profile: None,
            region: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub empty_lists: EmptyLists,
    pub map_style: MapStyleSetting,
}

impl RenderSettings {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            empty_lists: self.empty_lists.into(),
        }
    }

    pub fn map_style(&self) -> MapStyle {
        self.map_style.into()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyLists {
    #[default]
    Elide,
    Emit,
}

impl From<EmptyLists> for EmptyListPolicy {
    fn from(value: EmptyLists) -> Self {
        match value {
            EmptyLists::Elide => EmptyListPolicy::Elide,
            EmptyLists::Emit => EmptyListPolicy::Emit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyleSetting {
    #[default]
    Assignment,
    Block,
}

impl From<MapStyleSetting> for MapStyle {
    fn from(value: MapStyleSetting) -> Self {
        match value {
            MapStyleSetting::Assignment => MapStyle::Assignment,
            MapStyleSetting::Block => MapStyle::Block,
        }
    }
}

/// Global config directory (`<config_dir>/tfsync`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("tfsync");
    Ok(config_dir)
}

/// Find the settings file.
///
/// Search order:
/// 1. `TFSYNC_CONFIG_PATH`
/// 2. current directory: `tfsync.yaml`, `.tfsync.yaml`
/// 3. `<config_dir>/tfsync/config.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to missing file {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Load settings from the discovered file, or defaults when there is none
pub fn load() -> Result<Settings> {
    match find_config_file()? {
        Some(path) => load_from(&path),
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(Settings::default())
        }
    }
}

pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings = serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(settings)
}
