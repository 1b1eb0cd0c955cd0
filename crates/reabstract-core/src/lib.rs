//! Reabstract Core - shared plumbing for line-oriented dataset transforms
//!
//! Input readers (plain or gzip, file or stdin), line-based output sinks,
//! logging, progress reporting and cooperative shutdown.

pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod sink;
pub mod stream;

// Re-exports for convenience
pub use logging::{IndicatifLogger, Verbosity, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use shutdown::{install_signal_handlers, shutdown_flag};
pub use sink::LineSink;
pub use stream::{ByteCounter, InputReader, InputSource, open_input};
