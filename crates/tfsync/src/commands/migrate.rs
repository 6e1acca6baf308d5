use super::{Context, tf_files};
use anyhow::Context as _;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tfsync_cloud::Terraform;
use tfsync_core::migrate_tags_syntax;
use tokio::fs;

pub async fn handle(ctx: &Context, files: &[PathBuf]) -> anyhow::Result<()> {
    let files = tf_files(files)?;
    if files.is_empty() {
        tracing::warn!("no .tf files to migrate");
        return Ok(());
    }

    let terraform = ctx.terraform();
    let validate = !ctx.dry_run && terraform.is_installed().await;

    for file in &files {
        if !file.exists() {
            tracing::warn!("fail to find tf file: {}", file.display());
            continue;
        }
        tracing::info!("processing: {}", file.display());

        let text = fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        let (migrated, count) = migrate_tags_syntax(&text);

        if ctx.dry_run {
            println!("{} {}: {} tags blocks", "[dry-run]".yellow(), file.display(), count);
            continue;
        }
        if count > 0 {
            fs::write(file, &migrated)
                .await
                .with_context(|| format!("failed to write {}", file.display()))?;
        }
        println!("  {} {} ({} tags blocks rewritten)", "✓".green(), file.display(), count);

        if validate {
            validate_copy(&terraform, file).await?;
        }
    }
    Ok(())
}

/// Validate a copy of `file` in a scratch directory; failures only warn
async fn validate_copy(terraform: &Terraform, file: &Path) -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let name = file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("{} is not a file", file.display()))?;
    fs::copy(file, dir.path().join(name)).await?;

    let outcome = terraform.validate(dir.path()).await?;
    if !outcome.success() {
        tracing::warn!(
            "{} is not valid. Error: {}{}",
            file.display(),
            outcome.stdout,
            outcome.stderr
        );
    }
    Ok(())
}
