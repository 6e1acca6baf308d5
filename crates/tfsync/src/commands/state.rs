use super::{Context, tf_files};
use anyhow::Context as _;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tfsync_cloud::{STATE_FILE, StateManager};
use tfsync_core::scan_resource_heads;

/// Output path when none is given: `terraform.tfstate` while it does not
/// exist, otherwise the type names without `aws_` joined by `-`
pub fn default_extract_output(state_exists: bool, resources: &[String]) -> PathBuf {
    if !state_exists {
        return PathBuf::from(STATE_FILE);
    }
    let stem = resources
        .iter()
        .map(|r| r.strip_prefix("aws_").unwrap_or(r))
        .collect::<Vec<_>>()
        .join("-");
    PathBuf::from(format!("{stem}.tfstate"))
}

pub async fn extract(
    ctx: &Context,
    output: Option<PathBuf>,
    state: &Path,
    resources: &[String],
) -> anyhow::Result<()> {
    let output = output
        .unwrap_or_else(|| default_extract_output(Path::new(STATE_FILE).exists(), resources));
    tracing::info!(
        "extract from state file: {}, resources: {:?} to output: {}",
        state.display(),
        resources,
        output.display()
    );

    let doc = StateManager::new(state).load().await?;
    let kept = doc.extract_types(resources);

    if kept.resources.is_empty() {
        tracing::warn!("No resource state is found for {:?}", resources);
        return Ok(());
    }

    if ctx.dry_run {
        for resource in &kept.resources {
            println!("{}", resource.address());
        }
        return Ok(());
    }

    StateManager::new(&output)
        .save(&kept)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "{} {} resources to {}",
        "Extracted".green(),
        kept.resources.len(),
        output.display()
    );
    Ok(())
}

/// Import every resource declared in the files, using its name as the id
pub async fn import(ctx: &Context, files: &[PathBuf]) -> anyhow::Result<()> {
    let files = tf_files(files)?;
    let terraform = ctx.terraform();

    if !ctx.dry_run && !terraform.is_installed().await {
        anyhow::bail!("could not find `{}` command", terraform.binary());
    }

    let cwd = std::env::current_dir()?;
    let mut total_failed = 0;

    for file in &files {
        let text = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut failed = Vec::new();

        for head in scan_resource_heads(&text) {
            let address = head.address();
            if ctx.dry_run {
                println!("{} import {} {}", "[dry-run]".yellow(), address, head.name);
                continue;
            }
            let (invocation, outcome) = terraform.import(&cwd, &address, &head.name).await?;
            if !outcome.success() {
                failed.push(invocation.to_string());
            }
        }

        if !failed.is_empty() {
            tracing::error!("The following imports failed for {}:", file.display());
            for command in &failed {
                eprintln!("  {}", command.red());
            }
            total_failed += failed.len();
        }
    }

    if total_failed > 0 {
        anyhow::bail!("{} imports failed", total_failed);
    }
    Ok(())
}
