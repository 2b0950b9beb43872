use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pairing_engine::config::{EngineConfig, load_config_path};
use pairing_engine::db::{connection::connect_sqlite, migrate};
use pairing_engine::service::PairingService;
use pairing_engine::sync;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(version, about = "Ingredient pairing engine")]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply embedded migrations.
    Migrate,
    /// Run sync passes.
    Sync(SyncCmd),
    /// Rank pairings for a selection of ingredient ids.
    Suggest {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Print ingredients grouped by category.
    Library {
        /// Only ingredients with molecular data.
        #[arg(long)]
        with_data: bool,
    },
}

#[derive(Args)]
struct SyncCmd {
    #[command(subcommand)]
    sub: SyncSub,
}

#[derive(Subcommand)]
enum SyncSub {
    /// FlavorDB entities.
    Flavordb,
    /// FooDB foods (`Food.json`).
    Foods,
    /// FooDB content samples (`Content.json`).
    Content,
    /// All passes in order.
    All,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let cfg = match path {
        Some(path) => load_config_path(path)?,
        None => EngineConfig::default(),
    };
    let cfg = cfg.with_env_overrides();
    cfg.validate().context("invalid engine config")?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pairing_engine=info,flavor_ingestor=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    migrate::run_all(&cfg.database_url)?;

    match cli.cmd {
        Cmd::Migrate => {
            info!(database_url = %cfg.database_url, "migrations applied");
        }
        Cmd::Sync(SyncCmd { sub }) => {
            let mut conn = connect_sqlite(&cfg.database_url)?;
            match sub {
                SyncSub::Flavordb => {
                    let report = sync::run_flavordb(&mut conn, &cfg).await?;
                    println!("flavordb: {report}");
                }
                SyncSub::Foods => {
                    let (report, _) = sync::run_foods(&mut conn, &cfg)?;
                    println!("foods: {report}");
                }
                SyncSub::Content => {
                    let report = sync::run_content(&mut conn, &cfg, None)?;
                    println!("content: {report}");
                }
                SyncSub::All => {
                    let full = sync::run_all(&mut conn, &cfg).await?;
                    println!("flavordb: {}", full.flavordb);
                    println!("foods: {}", full.foods);
                    println!("content: {}", full.content);
                }
            }
        }
        Cmd::Suggest { ids } => {
            let service = PairingService::from_config(&cfg)?;
            let result = service.suggest(&ids)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Cmd::Library { with_data } => {
            let service = PairingService::from_config(&cfg)?;
            for shelf in service.library(with_data)? {
                println!("{} ({})", shelf.label, shelf.category);
                for entry in &shelf.ingredients {
                    let marker = if entry.has_data { "" } else { " (no data)" };
                    println!("  {:>6}  {}{}", entry.ingredient_id, entry.display_name, marker);
                }
            }
        }
    }

    Ok(())
}
