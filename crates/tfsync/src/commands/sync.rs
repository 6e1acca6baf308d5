use super::Context;
use colored::Colorize;
use std::path::Path;
use tfsync_cloud::{ImportReport, Reconciler};

pub async fn handle(
    ctx: &Context,
    kinds: &[String],
    output: &Path,
    override_state: bool,
) -> anyhow::Result<()> {
    let registry = ctx.registry();
    let resolved = registry.resolve(kinds)?;

    let names: Vec<&str> = resolved.iter().map(|k| k.name()).collect();
    println!(
        "{} {} to {}",
        "sync".green().bold(),
        names.join(","),
        output.display()
    );

    let terraform = ctx.terraform();
    if !ctx.dry_run && !terraform.is_installed().await {
        anyhow::bail!("could not find `{}` command", terraform.binary());
    }

    let options = ctx.sync_options(override_state);
    let mut reports = Vec::with_capacity(resolved.len());
    let mut aborted = None;

    for kind in resolved {
        tracing::info!("{:+^50}", format!(" {} ", kind.name()));
        let kind_name = kind.name().to_string();
        let reconciler = Reconciler::new(kind, terraform.clone(), options.clone());
        let report = match reconciler.run(output).await {
            Ok(report) => report,
            Err(e) => {
                println!("  {} {}: {}", "✗".red(), kind_name, e);
                aborted = Some(anyhow::Error::new(e).context(format!("failed to sync {}", kind_name)));
                break;
            }
        };

        let mark = if report.is_success() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, report);
        reports.push(report);
    }

    print_failures(&reports);
    match aborted {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_failures(reports: &[ImportReport]) {
    let failed: Vec<_> = reports.iter().flat_map(|r| r.failed.iter()).collect();
    if failed.is_empty() {
        return;
    }

    println!();
    println!("{}", "LOAD FAILURE".red().bold());
    for failure in failed {
        println!("  {} ({})", failure.command, failure.reason);
    }
}
