//! reabstract - rebuild OpenAlex abstracts from inverted indexes
//!
//! Inverts a single `abstract_inverted_index` payload, or streams whole
//! JSON Lines partitions (plain or gzip) into text / JSONL output.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use reabstract_core::{ProgressContext, SharedProgress, Verbosity};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "reabstract")]
#[command(about = "Rebuild OpenAlex abstracts from their inverted index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (includes per-line failures)
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./reabstract.toml or ~/.config/reabstract/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Reconstruct one abstract from a serialized inverted index
    Invert(cmd::invert::InvertArgs),
    /// Reconstruct every abstract in a JSON Lines partition
    Batch(cmd::batch::BatchArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the spinner and summary table show activity
    //   non-TTY: info unless --quiet/--debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let bars = if is_tty { Some(progress.multi()) } else { None };
    let verbosity = Verbosity::from_flags(cli.quiet || (is_tty && !cli.debug), cli.debug);
    reabstract_core::init_logging(verbosity, bars).context("failed to init logger")?;

    dispatch(cli.command, cli.config.as_deref(), &progress)
}

/// Run one subcommand. The config file is only read by commands that use it.
fn dispatch(
    command: Command,
    config_path: Option<&Path>,
    progress: &SharedProgress,
) -> Result<ExitCode> {
    match command {
        Command::Invert(args) => cmd::invert::run(args).map(|()| ExitCode::SUCCESS),
        Command::Batch(args) => {
            let config = load_config(config_path)?;
            reabstract_core::install_signal_handlers()
                .context("failed to install signal handlers")?;
            cmd::batch::run(args, &config, progress)
        }
        Command::Config => {
            let config = load_config(config_path)?;
            eprintln!("\n{}", config_table(&config));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

fn config_table(config: &Config) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["Payload field", config.batch.payload_field.as_str()]);
    table.add_row(vec![
        "Id field",
        config.batch.id_field().as_deref().unwrap_or("(disabled)"),
    ]);
    table.add_row(vec![
        "Output format",
        &format!("{:?}", config.batch.format).to_lowercase(),
    ]);
    table.add_row(vec!["Chunk size", &config.batch.chunk_size.to_string()]);
    table.add_row(vec!["Fail fast", &config.batch.fail_fast.to_string()]);
    table.add_row(vec![
        "Workers",
        &format!("{} (max: {})", config.workers.default, config.workers.max),
    ]);
    table
}
