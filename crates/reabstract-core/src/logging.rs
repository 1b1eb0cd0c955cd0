//! Log setup for the CLI
//!
//! Plain `[LEVEL] message` lines on stderr, or the same lines in color above
//! the progress bars when stderr is a terminal.

use indicatif::MultiProgress;

/// Verbosity chosen from the `--quiet` / `--debug` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    /// `--debug` beats `--quiet`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (_, true) => Self::Debug,
            (true, false) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    /// Filter used when `RUST_LOG` is unset
    fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

fn label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn ansi(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

fn render(record: &log::Record, color: bool) -> String {
    let level = record.level();
    if color {
        format!("[{}{}\x1b[0m] {}", ansi(level), label(level), record.args())
    } else {
        format!("[{}] {}", label(level), record.args())
    }
}

/// Logger that prints above the indicatif bars so lines don't tear the spinner.
pub struct IndicatifLogger {
    filter: env_logger::Logger,
    bars: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(filter: env_logger::Logger, bars: MultiProgress) -> Self {
        Self { filter, bars }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.filter.enabled(record.metadata()) {
            let line = render(record, true);
            self.bars.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {}
}

/// Install the global logger.
///
/// With `bars` set, lines are routed through [`IndicatifLogger`]; otherwise
/// env_logger writes uncolored lines to stderr.
pub fn init_logging(
    verbosity: Verbosity,
    bars: Option<&MultiProgress>,
) -> Result<(), log::SetLoggerError> {
    use std::io::Write;

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.default_filter()),
    );

    match bars {
        Some(bars) => {
            let filter = builder.build();
            let max_level = filter.filter();
            log::set_boxed_logger(Box::new(IndicatifLogger::new(filter, bars.clone())))?;
            log::set_max_level(max_level);
            Ok(())
        }
        None => builder
            .format(|buf, record| writeln!(buf, "{}", render(record, false)))
            .try_init(),
    }
}
