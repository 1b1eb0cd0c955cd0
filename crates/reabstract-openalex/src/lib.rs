//! Reabstract OpenAlex - rebuild abstracts from OpenAlex inverted indexes
//!
//! OpenAlex ships abstracts as `{"IndexLength": n, "InvertedIndex": {word: [positions]}}`
//! strings inside each work record. This crate turns them back into text,
//! one payload at a time ([`invert`]) or over whole JSON Lines partitions
//! ([`run`]).
//!
//! # Example
//!
//! ```no_run
//! use reabstract_core::ProgressContext;
//! use reabstract_openalex::{Config, OutputFormat, run};
//!
//! let config = Config {
//!     input: Some("part_001.gz".into()),
//!     output: Some("abstracts.jsonl".into()),
//!     format: OutputFormat::Jsonl,
//!     workers: 4,
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, &ProgressContext::hidden()).expect("batch failed");
//! println!("Found {} abstracts in {} works", summary.processed, summary.lines);
//! ```

pub mod config;
pub mod error;
pub mod invert;
pub mod output;
pub mod record;
pub mod runner;

// Re-exports for convenience
pub use config::{Config, OutputFormat};
pub use error::{ErrorKind, InvertError, LineError};
pub use invert::{InvertedIndex, invert};
pub use output::{FormattedSink, Reconstructed, RecordSink};
pub use runner::{RunSummary, process_lines, run, run_with_sink};
