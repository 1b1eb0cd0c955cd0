//! Batch pipeline configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::record::{DEFAULT_ID_FIELD, DEFAULT_PAYLOAD_FIELD};

/// Lines read per parallel chunk
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// How reconstructed abstracts are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One abstract per line
    #[default]
    Text,
    /// One `{"id", "line", "abstract"}` object per line
    Jsonl,
}

/// Runtime configuration for the batch runner
#[derive(Debug, Clone)]
pub struct Config {
    /// Input JSON Lines file (plain or gzip); `None` reads stdin
    pub input: Option<PathBuf>,
    /// Output file; `None` writes stdout
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Record field holding the serialized inverted index
    pub payload_field: String,
    /// Record field copied into JSONL output
    pub id_field: Option<String>,
    /// Worker threads per chunk (1 = inline)
    pub workers: usize,
    pub chunk_size: usize,
    /// Abort on the first failed line instead of counting and continuing
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            format: OutputFormat::Text,
            payload_field: DEFAULT_PAYLOAD_FIELD.to_string(),
            id_field: Some(DEFAULT_ID_FIELD.to_string()),
            workers: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            fail_fast: false,
        }
    }
}
