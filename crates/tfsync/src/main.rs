mod commands;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use commands::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tfsync")]
#[command(about = "Bring live AWS resources under terraform management", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Report what would be done without running terraform or writing results
    #[arg(long, global = true)]
    dry_run: bool,

    /// Settings file (default: discovered via TFSYNC_CONFIG_PATH, ./tfsync.yaml, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// terraform executable
    #[arg(long, global = true, env = "TFSYNC_TERRAFORM")]
    terraform: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import live resources and generate configuration for them
    Sync {
        /// Resource kinds or groups to sync (repeatable, comma separated)
        #[arg(short = 't', long = "type", required = true, value_delimiter = ',')]
        kinds: Vec<String>,

        /// Drop existing state of the selected kinds and import again
        #[arg(long = "override")]
        override_state: bool,

        /// Timeout for each import in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output directory; each kind gets its own sub-directory
        #[arg(default_value = ".")]
        output: PathBuf,
    },
    /// Terraform state file helpers
    #[command(subcommand)]
    State(StateCommands),
    /// Rewrite `tags {` blocks as `tags = {`
    Migrate {
        /// Configuration files (default: *.tf)
        files: Vec<PathBuf>,
    },
    /// Print configuration for every resource of a state file
    Render {
        /// State file
        #[arg(default_value = "terraform.tfstate")]
        state: PathBuf,
    },
    /// List resource kinds and groups
    Kinds,
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum StateCommands {
    /// Copy a state file keeping only the given resource types
    Extract {
        /// Output path (default: terraform.tfstate, or <types>.tfstate when it exists)
        #[arg(short = 'o', long = "out-file")]
        output: Option<PathBuf>,

        /// Source state file
        #[arg(short = 's', long = "state-file", default_value = "terraform.tfstate")]
        state: PathBuf,

        /// Resource types to keep (e.g. aws_s3_bucket)
        #[arg(required = true)]
        resources: Vec<String>,
    },
    /// Import every resource declared in configuration files
    Import {
        /// Configuration files (default: *.tf)
        files: Vec<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    init_tracing(cli.debug);

    if matches!(cli.command, Commands::Version) {
        println!("tfsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut settings = match &cli.config {
        Some(path) => tfsync_config::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => tfsync_config::load()?,
    };
    if let Some(terraform) = cli.terraform {
        settings.terraform.binary = terraform;
    }

    if let Commands::Sync {
        timeout: Some(secs),
        ..
    } = &cli.command
    {
        settings.terraform.import_timeout_secs = *secs;
    }
    let ctx = Context::new(settings, cli.dry_run);

    match cli.command {
        Commands::Sync {
            kinds,
            override_state,
            output,
            ..
        } => commands::sync::handle(&ctx, &kinds, &output, override_state).await,
        Commands::State(StateCommands::Extract {
            output,
            state,
            resources,
        }) => commands::state::extract(&ctx, output, &state, &resources).await,
        Commands::State(StateCommands::Import { files }) => {
            commands::state::import(&ctx, &files).await
        }
        Commands::Migrate { files } => commands::migrate::handle(&ctx, &files).await,
        Commands::Render { state } => commands::render::handle(&ctx, &state).await,
        Commands::Kinds => {
            commands::kinds::handle(&ctx);
            Ok(())
        }
        // Printed before settings are loaded
        Commands::Version => Ok(()),
    }
}
