use super::Context;
use std::path::Path;
use tfsync_cloud::{COMPUTED_ATTRIBUTES, StateManager, state_stanzas};
use tfsync_core::render_document;

/// Print configuration for a state file without running terraform
pub async fn handle(ctx: &Context, state: &Path) -> anyhow::Result<()> {
    let doc = StateManager::new(state).load().await?;

    let options = ctx.sync_options(false);
    let stanzas = state_stanzas(&doc, |resource_type, key, _| {
        COMPUTED_ATTRIBUTES.contains(&key) || options.ignored_by_setting(resource_type, key)
    });
    let text = render_document(&stanzas, &options.renderer, options.map_style)?;

    tracing::debug!("rendered {} resources from {}", stanzas.len(), state.display());
    print!("{text}");
    Ok(())
}
