//! cleanline - basic cleaning step for ML pipeline datasets
//!
//! Fetches a raw dataset artifact, drops price outliers, fixes the
//! `last_review` column type, and publishes the cleaned table as a new
//! artifact version.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod logging;

use config::Config;

#[derive(Parser)]
#[command(name = "cleanline")]
#[command(about = "Basic cleaning step for ML pipeline datasets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./cleanline.toml or ~/.config/cleanline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Artifact store directory (overrides config)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a raw dataset, remove price outliers, and publish the result
    Clean(cmd::clean::CleanArgs),
    /// Manage the artifact store
    Store(cmd::store::StoreArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.quiet, cli.debug);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let store_dir = cli.store_dir.unwrap_or_else(|| config.store.dir.clone());

    match cli.command {
        Command::Clean(args) => cmd::clean::run(args, &config.columns.to_columns(), &store_dir),
        Command::Store(args) => cmd::store::run(args, &store_dir),
        Command::Config => {
            use comfy_table::{
                modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            let store_display = store_dir.display().to_string();
            table.add_row(vec!["Store directory", store_display.as_str()]);
            table.add_row(vec!["Index column", config.columns.index.as_str()]);
            table.add_row(vec!["Price column", config.columns.price.as_str()]);
            table.add_row(vec!["Review date column", config.columns.last_review.as_str()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
