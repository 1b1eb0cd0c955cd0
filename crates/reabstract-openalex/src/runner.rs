//! Batch runner: JSON Lines works in, reconstructed abstracts out

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use indicatif::ProgressBar;
use rayon::prelude::*;
use reabstract_core::progress::upgrade_to_bar;
use reabstract_core::{
    ByteCounter, InputSource, LineSink, ProgressContext, fmt_num, open_input, shutdown_flag,
};

use crate::config::Config;
use crate::error::{ErrorKind, LineError};
use crate::invert::invert;
use crate::output::{FormattedSink, Reconstructed, RecordSink};
use crate::record::extract_payload;

/// Per-kind failure counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub malformed_record: usize,
    pub malformed_index: usize,
    pub position_out_of_range: usize,
}

impl FailureCounts {
    fn add(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::MalformedRecord => self.malformed_record += 1,
            ErrorKind::MalformedIndex => self.malformed_index += 1,
            ErrorKind::PositionOutOfRange => self.position_out_of_range += 1,
        }
    }
}

/// Batch execution summary
///
/// For a run that wasn't interrupted, `lines == processed + skipped + failed`.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Non-blank lines read
    pub lines: usize,
    /// Abstracts reconstructed and emitted
    pub processed: usize,
    /// Records without a string payload
    pub skipped: usize,
    pub failed: usize,
    pub failures: FailureCounts,
    /// Stopped early by a shutdown request
    pub interrupted: bool,
    /// Raw input bytes consumed (compressed size for gzip)
    pub bytes_read: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record_failure(&mut self, err: &LineError) {
        self.failed += 1;
        self.failures.add(err.kind());
    }

    /// Log summary for non-TTY output
    pub fn log(&self) {
        log::info!("=== Abstract Reconstruction Summary ===");
        log::info!(
            "Found {} abstracts in {} works ({} without abstract, {} failed)",
            fmt_num(self.processed),
            fmt_num(self.lines),
            fmt_num(self.skipped),
            fmt_num(self.failed)
        );
        if self.failed > 0 {
            log::warn!(
                "Failures: {} malformed records, {} malformed indexes, {} positions out of range",
                self.failures.malformed_record,
                self.failures.malformed_index,
                self.failures.position_out_of_range
            );
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.processed > 0 && !self.elapsed.is_zero() {
            let rate = self.processed as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {:.0} abstracts/sec", rate);
        }
        if self.interrupted {
            log::warn!("Run interrupted by shutdown request, output is partial");
        }
    }
}

/// Result of handling one input line
#[derive(Debug)]
enum LineOutcome {
    Reconstructed(Reconstructed),
    Skipped,
    Failed(LineError),
}

fn process_line(line_no: usize, raw: &[u8], config: &Config) -> LineOutcome {
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s,
        Err(e) => {
            return LineOutcome::Failed(LineError::MalformedRecord(format!("invalid UTF-8: {e}")));
        }
    };
    let work = match extract_payload(line, &config.payload_field, config.id_field.as_deref()) {
        Ok(Some(work)) => work,
        Ok(None) => return LineOutcome::Skipped,
        Err(e) => return LineOutcome::Failed(e),
    };
    match invert(&work.payload) {
        Ok(text) => LineOutcome::Reconstructed(Reconstructed {
            line_no,
            id: work.id,
            text,
        }),
        Err(e) => LineOutcome::Failed(e.into()),
    }
}

/// Fill `chunk` with up to `max` non-blank lines. Returns `true` at EOF.
fn read_chunk<R: BufRead + ?Sized>(
    reader: &mut R,
    chunk: &mut Vec<(usize, Vec<u8>)>,
    max: usize,
    line_no: &mut usize,
) -> std::io::Result<bool> {
    while chunk.len() < max {
        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(true);
        }
        *line_no += 1;
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        chunk.push((*line_no, buf));
    }
    Ok(false)
}

/// Read records from `reader`, reconstruct abstracts, emit them to `sink` in input order.
///
/// Lines are read in chunks of `config.chunk_size`; each chunk is inverted in
/// parallel on `config.workers` threads and emitted in line order before the
/// next chunk is read. `cancel` is checked between chunks.
pub fn process_lines<R: BufRead + ?Sized>(
    reader: &mut R,
    config: &Config,
    sink: &mut dyn RecordSink,
    cancel: &AtomicBool,
    pb: &ProgressBar,
    counter: Option<&ByteCounter>,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();
    let chunk_size = config.chunk_size.max(1);

    let pool = if config.workers > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.workers)
                .build()
                .context("Failed to create thread pool")?,
        )
    } else {
        None
    };

    let mut summary = RunSummary::default();
    let mut chunk: Vec<(usize, Vec<u8>)> = Vec::with_capacity(chunk_size);
    let mut line_no = 0usize;

    loop {
        if cancel.load(Ordering::Relaxed) {
            log::warn!("Shutdown requested, stopping after line {line_no}");
            summary.interrupted = true;
            break;
        }

        chunk.clear();
        let eof = read_chunk(reader, &mut chunk, chunk_size, &mut line_no)
            .with_context(|| format!("read error after line {line_no}"))?;

        let outcomes: Vec<LineOutcome> = match &pool {
            Some(pool) => pool.install(|| {
                chunk
                    .par_iter()
                    .map(|(n, raw)| process_line(*n, raw, config))
                    .collect()
            }),
            None => chunk
                .iter()
                .map(|(n, raw)| process_line(*n, raw, config))
                .collect(),
        };

        for ((n, _), outcome) in chunk.iter().zip(outcomes) {
            summary.lines += 1;
            match outcome {
                LineOutcome::Reconstructed(record) => {
                    sink.emit(record).context("failed to write output")?;
                    summary.processed += 1;
                }
                LineOutcome::Skipped => summary.skipped += 1,
                LineOutcome::Failed(err) => {
                    log::debug!("line {n}: {err}");
                    if config.fail_fast {
                        anyhow::bail!("line {n}: {err}");
                    }
                    summary.record_failure(&err);
                }
            }
        }

        if let Some(counter) = counter {
            pb.set_position(counter.load(Ordering::Relaxed));
        }
        pb.set_message(format!(
            "{} works, {} abstracts",
            fmt_num(summary.lines),
            fmt_num(summary.processed)
        ));

        if eof {
            break;
        }
    }

    summary.bytes_read = counter.map_or(0, |c| c.load(Ordering::Relaxed));
    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Run the batch over `config.input`, emitting into a caller-provided sink.
///
/// Stops between chunks when the global shutdown flag is set.
pub fn run_with_sink(
    config: &Config,
    sink: &mut dyn RecordSink,
    progress: &ProgressContext,
) -> anyhow::Result<RunSummary> {
    let source = InputSource::from_path(config.input.as_deref());
    let (mut reader, counter, total_bytes) =
        open_input(&source).with_context(|| format!("failed to open {source}"))?;
    log::info!("Reading {source} with {} workers", config.workers.max(1));

    let pb = progress.input_bar(&source.to_string());
    if let Some(total) = total_bytes {
        upgrade_to_bar(&pb, total);
    }

    let result = process_lines(
        &mut reader,
        config,
        sink,
        shutdown_flag(),
        &pb,
        Some(&counter),
    );
    pb.finish_and_clear();
    let summary = result.with_context(|| format!("failed processing {source}"))?;

    if summary.lines == 0 && !summary.interrupted {
        log::warn!("{source}: no records");
    }
    summary.log();
    Ok(summary)
}

/// Run the batch pipeline: `config.input` → `config.output` in `config.format`.
///
/// File output only appears under its final name once the run completes
/// (or is interrupted); a failed run leaves nothing behind.
pub fn run(config: &Config, progress: &ProgressContext) -> anyhow::Result<RunSummary> {
    let lines = match &config.output {
        Some(path) => LineSink::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?,
        None => LineSink::stdout(),
    };
    let mut sink = FormattedSink::new(lines, config.format);

    match run_with_sink(config, &mut sink, progress) {
        Ok(summary) => {
            let written = sink.finalize().context("failed to finalize output")?;
            if let Some(path) = &config.output {
                log::info!("Wrote {} abstracts to {}", fmt_num(written), path.display());
            }
            Ok(summary)
        }
        Err(e) => {
            if let Err(cleanup) = sink.abort() {
                log::warn!("failed to remove partial output: {cleanup}");
            }
            Err(e)
        }
    }
}
