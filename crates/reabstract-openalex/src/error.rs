//! Error types for abstract reconstruction

use std::fmt;

/// Failure classes, used for per-kind counting in batch summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedRecord,
    MalformedIndex,
    PositionOutOfRange,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRecord => "malformed_record",
            Self::MalformedIndex => "malformed_index",
            Self::PositionOutOfRange => "position_out_of_range",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from decoding a serialized inverted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvertError {
    /// Payload is not valid JSON, or `IndexLength` / `InvertedIndex` are
    /// missing or have the wrong shape.
    MalformedIndex(String),
    /// A recorded position falls outside `[0, length)`.
    PositionOutOfRange { position: i64, length: usize },
}

impl fmt::Display for InvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedIndex(msg) => write!(f, "malformed index: {msg}"),
            Self::PositionOutOfRange { position, length } => {
                write!(f, "position {position} out of range for length {length}")
            }
        }
    }
}

impl std::error::Error for InvertError {}

impl InvertError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedIndex(_) => ErrorKind::MalformedIndex,
            Self::PositionOutOfRange { .. } => ErrorKind::PositionOutOfRange,
        }
    }
}

/// Error from processing one input line in batch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Line is not a JSON object.
    MalformedRecord(String),
    /// Payload was found but could not be inverted.
    Invert(InvertError),
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord(msg) => write!(f, "malformed record: {msg}"),
            Self::Invert(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedRecord(_) => None,
            Self::Invert(e) => Some(e),
        }
    }
}

impl From<InvertError> for LineError {
    fn from(e: InvertError) -> Self {
        Self::Invert(e)
    }
}

impl LineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRecord(_) => ErrorKind::MalformedRecord,
            Self::Invert(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let err = InvertError::PositionOutOfRange {
            position: 5,
            length: 1,
        };
        assert_eq!(format!("{err}"), "position 5 out of range for length 1");
    }

    #[test]
    fn line_error_kind_follows_inner() {
        let err = LineError::from(InvertError::MalformedIndex("missing IndexLength".into()));
        assert_eq!(err.kind(), ErrorKind::MalformedIndex);
        assert_eq!(format!("{err}"), "malformed index: missing IndexLength");

        let err = LineError::MalformedRecord("EOF while parsing".into());
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ErrorKind::PositionOutOfRange.to_string(), "position_out_of_range");
        assert_eq!(ErrorKind::MalformedRecord.as_str(), "malformed_record");
    }
}
