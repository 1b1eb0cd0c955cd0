//! Batch subcommand - reconstruct every abstract in a JSON Lines partition

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use reabstract_core::{SharedProgress, fmt_num};
use reabstract_openalex::{OutputFormat, RunSummary};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input JSON Lines file, plain or gzip (stdin when omitted or "-")
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Record field holding the serialized inverted index
    #[arg(long)]
    pub payload_field: Option<String>,

    /// Record field copied into JSONL output ("" to disable)
    #[arg(long)]
    pub id_field: Option<String>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Lines read per parallel chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Abort on the first malformed line instead of counting it
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum Format {
    /// One abstract per line
    Text,
    /// {"id", "line", "abstract"} objects
    Jsonl,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Jsonl => OutputFormat::Jsonl,
        }
    }
}

/// Merge CLI flags over the config file
fn build_config(args: BatchArgs, config: &Config) -> reabstract_openalex::Config {
    let id_field = match args.id_field {
        Some(f) => Some(f).filter(|f| !f.is_empty()),
        None => config.batch.id_field(),
    };
    reabstract_openalex::Config {
        input: args.input,
        output: args.output,
        format: args.format.map_or(config.batch.format, Into::into),
        payload_field: args
            .payload_field
            .unwrap_or_else(|| config.batch.payload_field.clone()),
        id_field,
        workers: config.workers.resolve(args.workers),
        chunk_size: args.chunk_size.unwrap_or(config.batch.chunk_size),
        fail_fast: args.fail_fast || config.batch.fail_fast,
    }
}

pub fn run(args: BatchArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    let batch_config = build_config(args, config);
    let summary = reabstract_openalex::run(&batch_config, progress)?;

    if progress.is_tty() {
        eprintln!("\n{}", summary_table(&summary));
    }

    Ok(ExitCode::from(exit_status(&summary)))
}

/// 130 (128 + SIGINT) when the run stopped early, 0 otherwise
fn exit_status(summary: &RunSummary) -> u8 {
    if summary.interrupted { 130 } else { 0 }
}

fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Works").fg(Color::Cyan),
            Cell::new("Abstracts").fg(Color::Cyan),
            Cell::new("No abstract").fg(Color::Cyan),
            Cell::new("Failed").fg(Color::Cyan),
            Cell::new("Time").fg(Color::Cyan),
        ]);
    let failed = if summary.failed > 0 {
        Cell::new(fmt_num(summary.failed)).fg(Color::Red)
    } else {
        Cell::new("0")
    };
    table.add_row(vec![
        Cell::new(fmt_num(summary.lines)),
        Cell::new(fmt_num(summary.processed)).fg(Color::Green),
        Cell::new(fmt_num(summary.skipped)),
        failed,
        Cell::new(format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BatchArgs,
    }

    fn parse(argv: &[&str]) -> BatchArgs {
        TestCli::parse_from(std::iter::once("reabstract").chain(argv.iter().copied())).args
    }

    #[test]
    fn config_file_values_used_without_flags() {
        let mut config = Config::default();
        config.batch.format = OutputFormat::Jsonl;
        config.batch.payload_field = "inv".to_string();
        config.workers.default = 3;

        let batch = build_config(parse(&["part_001.gz"]), &config);
        assert_eq!(batch.input, Some(PathBuf::from("part_001.gz")));
        assert_eq!(batch.output, None);
        assert_eq!(batch.format, OutputFormat::Jsonl);
        assert_eq!(batch.payload_field, "inv");
        assert_eq!(batch.id_field.as_deref(), Some("id"));
        assert_eq!(batch.workers, 3);
    }

    #[test]
    fn flags_override_config() {
        let config = Config::default();
        let batch = build_config(
            parse(&[
                "-o",
                "out.txt",
                "--format",
                "jsonl",
                "--id-field",
                "",
                "--workers",
                "2",
                "--chunk-size",
                "100",
                "--fail-fast",
            ]),
            &config,
        );
        assert_eq!(batch.input, None);
        assert_eq!(batch.output, Some(PathBuf::from("out.txt")));
        assert_eq!(batch.format, OutputFormat::Jsonl);
        assert_eq!(batch.id_field, None);
        assert_eq!(batch.workers, 2);
        assert_eq!(batch.chunk_size, 100);
        assert!(batch.fail_fast);
    }

    #[test]
    fn interrupted_run_exits_130() {
        let mut summary = RunSummary {
            lines: 2,
            processed: 2,
            ..Default::default()
        };
        assert_eq!(exit_status(&summary), 0);
        summary.interrupted = true;
        assert_eq!(exit_status(&summary), 130);
    }

    #[test]
    fn summary_table_renders_counts() {
        let summary = RunSummary {
            lines: 46_890,
            processed: 32_055,
            skipped: 14_835,
            ..Default::default()
        };
        let rendered = summary_table(&summary).to_string();
        assert!(rendered.contains("46,890"));
        assert!(rendered.contains("32,055"));
    }
}
