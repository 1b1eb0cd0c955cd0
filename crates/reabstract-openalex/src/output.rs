//! Output side of the batch runner

use std::borrow::Cow;
use std::io;

use reabstract_core::LineSink;

use crate::config::OutputFormat;

/// One reconstructed abstract with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstructed {
    /// 1-based physical line number in the input
    pub line_no: usize,
    pub id: Option<String>,
    pub text: String,
}

/// Receives reconstructed abstracts in input order.
pub trait RecordSink {
    fn emit(&mut self, record: Reconstructed) -> io::Result<()>;
}

/// Collecting sink, handy for library callers and tests
impl RecordSink for Vec<Reconstructed> {
    fn emit(&mut self, record: Reconstructed) -> io::Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Render one record in the given format (no trailing newline).
pub fn format_record(record: &Reconstructed, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => one_line(&record.text).into_owned(),
        OutputFormat::Jsonl => serde_json::json!({
            "id": record.id,
            "line": record.line_no,
            "abstract": record.text,
        })
        .to_string(),
    }
}

/// Tokens can't normally hold line breaks, but one record must stay one line
fn one_line(text: &str) -> Cow<'_, str> {
    if text.contains(['\n', '\r']) {
        Cow::Owned(text.replace(['\n', '\r'], " "))
    } else {
        Cow::Borrowed(text)
    }
}

/// [`RecordSink`] writing formatted lines to a [`LineSink`]
#[derive(Debug)]
pub struct FormattedSink {
    lines: LineSink,
    format: OutputFormat,
}

impl FormattedSink {
    pub fn new(lines: LineSink, format: OutputFormat) -> Self {
        Self { lines, format }
    }

    /// Flush and move the output into place; returns lines written
    pub fn finalize(self) -> io::Result<usize> {
        self.lines.finalize()
    }

    /// Discard partial output
    pub fn abort(self) -> io::Result<()> {
        self.lines.abort()
    }
}

impl RecordSink for FormattedSink {
    fn emit(&mut self, record: Reconstructed) -> io::Result<()> {
        self.lines.write_line(&format_record(&record, self.format))
    }
}
