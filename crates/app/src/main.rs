use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod report;

use commands::ViewArgs;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "daric", version, about = "Unify bank statements and summarize where the money went")]
struct Cli {
    /// Config file (default: daric.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Income, expenses, top movements and monthly totals
    Summary {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Filtered transactions, oldest first
    Transactions {
        #[command(flatten)]
        view: ViewArgs,

        /// Print at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Transaction count and total per category
    Categories {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Summary { view } => {
            let session = commands::open_session(&config, &view)?;
            commands::summary(&session, cli.json)?;
        }
        Command::Transactions { view, limit } => {
            let session = commands::open_session(&config, &view)?;
            commands::transactions(&session, limit, cli.json)?;
        }
        Command::Categories { view } => {
            let session = commands::open_session(&config, &view)?;
            commands::categories(&session, cli.json)?;
        }
        Command::Config => commands::show_config(&config)?,
    }

    Ok(())
}
