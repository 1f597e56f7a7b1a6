mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricecut-cli")]
#[command(about = "Generate SKU discount payloads from the Shopify catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk the catalog for every rule and write the per-pass variant files
    Generate {
        /// Rule file (defaults to PRICECUT_DISCOUNTS_PATH)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Artifact directory (defaults to PRICECUT_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Merge the variant files into the SKU-keyed payload
    Payload {
        #[arg(long, env = "PRICECUT_OUTPUT_DIR", default_value = "./output")]
        output_dir: PathBuf,
    },
    /// Generate, then merge
    Run {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Load and validate the rule file, then print the rule plan
    CheckConfig {
        #[arg(
            long,
            env = "PRICECUT_DISCOUNTS_PATH",
            default_value = "./config/discounts.yaml"
        )]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let log_level = std::env::var("PRICECUT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { config, output_dir } => {
            let app_config = commands::load_config(config, output_dir)?;
            commands::run_generate(&app_config).await?;
        }
        Commands::Payload { output_dir } => {
            commands::run_payload(&output_dir).await?;
        }
        Commands::Run { config, output_dir } => {
            let app_config = commands::load_config(config, output_dir)?;
            commands::run_generate(&app_config).await?;
            commands::run_payload(&app_config.output_dir).await?;
        }
        Commands::CheckConfig { config } => {
            commands::run_check_config(&config)?;
        }
    }

    Ok(())
}
