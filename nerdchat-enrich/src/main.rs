//! nerdchat-enrich - artist enrichment command line
//!
//! Runs the enrichment pipeline outside the chat service:
//! - `mentions`: which known artists a message mentions
//! - `lookup`: one artist document (cache first), printed as JSON
//! - `context`: the decorated prompt the chat layer would send
//! - `init-config`: write a starter config file

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use nerdchat_common::config::{init_config_file, load_config, resolve_root_folder, user_config_path};
use nerdchat_common::time::hours_to_duration;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nerdchat-enrich
#[derive(Parser, Debug)]
#[command(name = "nerdchat-enrich")]
#[command(about = "Artist data enrichment for the nerdchat assistant")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "NERDCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder for the cache
    #[arg(short, long, env = "NERDCHAT_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Pipeline(PipelineCommand),

    /// Write a starter config to --config (or the per-user config path)
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Commands that run the enrichment pipeline
#[derive(Subcommand, Debug)]
enum PipelineCommand {
    /// List known artists mentioned in TEXT
    Mentions { text: String },

    /// Resolve one artist and print the document as JSON
    Lookup {
        artist: String,

        /// Freshness window in hours (config value when omitted)
        #[arg(long)]
        max_age_hours: Option<u64>,
    },

    /// Print TEXT decorated with context for every mentioned artist
    Context { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::InitConfig { force } => init_config(args.config.as_deref(), force),
        Command::Pipeline(command) => {
            run(command, args.config.as_deref(), args.root_folder.as_deref()).await
        }
    }
}

/// Runs without loading config, since the target file may not exist yet
fn init_config(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(user_config_path)
        .ok_or_else(|| anyhow!("No config directory on this platform; pass --config"))?;
    init_config_file(&path, force).context("Failed to write starter config")?;
    println!("{}", path.display());
    Ok(())
}

async fn run(
    command: PipelineCommand,
    config_path: Option<&Path>,
    root_folder: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting nerdchat-enrich {} ({} {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TIMESTAMP")
    );

    let root_folder = resolve_root_folder(root_folder, &config);
    info!("Root folder: {}", root_folder.display());

    let pipeline = nerdchat_enrich::build_pipeline(&config, &root_folder)
        .await
        .context("Failed to initialize enrichment pipeline")?;

    match command {
        PipelineCommand::Mentions { text } => {
            for name in pipeline.extractor.find_mentions(&text) {
                println!("{}", name);
            }
        }
        PipelineCommand::Lookup {
            artist,
            max_age_hours,
        } => {
            let max_age = max_age_hours
                .map(hours_to_duration)
                .unwrap_or_else(|| pipeline.enrichment.default_max_age());
            match pipeline.enrichment.get_artist_info(&artist, max_age).await {
                Some(document) => {
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                None => {
                    eprintln!("No information available for {}", artist);
                    std::process::exit(1);
                }
            }
        }
        PipelineCommand::Context { text } => {
            let turn = pipeline.assembler.enrich_turn(&text).await;
            println!("{}", turn.decorate(&text));
        }
    }

    Ok(())
}
