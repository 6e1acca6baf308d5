pub mod kinds;
pub mod migrate;
pub mod render;
pub mod state;
pub mod sync;

use std::path::PathBuf;
use std::sync::Arc;
use tfsync_cloud::{ProcessRunner, Registry, SyncOptions, Terraform};
use tfsync_cloud_aws::AwsCli;
use tfsync_config::Settings;
use tfsync_core::Renderer;

/// Settings and global flags shared by every command
pub struct Context {
    pub settings: Settings,
    pub dry_run: bool,
}

impl Context {
    pub fn new(settings: Settings, dry_run: bool) -> Self {
        Self { settings, dry_run }
    }

    pub fn terraform(&self) -> Terraform {
        let tf = &self.settings.terraform;
        Terraform::new(&tf.binary, Arc::new(ProcessRunner))
            .with_timeouts(tf.import_timeout(), tf.init_timeout())
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.settings.render.options())
    }

    pub fn sync_options(&self, override_state: bool) -> SyncOptions {
        SyncOptions {
            override_state,
            dry_run: self.dry_run,
            renderer: self.renderer(),
            map_style: self.settings.render.map_style(),
            ignore: self.settings.ignore.clone(),
        }
    }

    /// Registry of AWS kinds backed by the aws CLI
    pub fn registry(&self) -> Registry {
        let aws = &self.settings.aws;
        let cli = AwsCli::new(&aws.binary)
            .with_profile(aws.profile.clone())
            .with_region(aws.region.clone());
        tfsync_cloud_aws::registry(Arc::new(cli))
    }
}

/// The given files, or every `*.tf` file in the current directory
pub fn tf_files(files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files.to_vec());
    }
    let mut found: Vec<PathBuf> = glob::glob("*.tf")?.filter_map(Result::ok).collect();
    found.sort();
    Ok(found)
}
