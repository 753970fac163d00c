use std::fmt;
use std::io;
use thiserror::Error;

/// Which kind of index an [`EdfError::IndexOutOfRange`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Signal,
    Record,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Signal => f.write_str("signal"),
            IndexKind::Record => f.write_str("data record"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Truncated input: expected {expected} bytes, only {remaining} remaining")]
    TruncatedInput { expected: usize, remaining: usize },

    #[error("Non-ASCII byte in header at offset {offset}")]
    EncodingError { offset: usize },

    #[error("Malformed header field `{field}`: {value:?}")]
    MalformedField { field: &'static str, value: String },

    #[error(
        "Unexpected file size: unable to evenly divide {remaining} bytes into \
         {record_size} bytes per data record"
    )]
    InconsistentFileSize { remaining: usize, record_size: usize },

    #[error("{remaining} trailing bytes after the last data record")]
    TrailingData { remaining: usize },

    #[error("{kind} index {index} out of range (count is {len})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    #[error("Digital min equals digital max for signal {signal}")]
    DegenerateRange { signal: usize },

    #[error("Signal {0} is the annotations channel, not a waveform")]
    AnnotationSignal(usize),

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

impl EdfError {
    pub(crate) fn malformed(field: &'static str, value: &str) -> Self {
        EdfError::MalformedField {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EdfError>;
