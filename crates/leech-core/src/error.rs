//! Per-item failure type and its classification.
//!
//! Every failure while handling one page or one product ends up as a
//! `FetchError`; callers classify it, log it with the item's id, and skip the
//! item. Nothing here aborts a run.

use thiserror::Error;

/// Failure while fetching a listing, a product detail or an image, or while
/// writing the image to disk.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (connect, resolve, TLS, timeout, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// Response body was not valid JSON.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// JSON was valid but the expected field path is missing or has the wrong type.
    #[error("missing or malformed field `{0}`")]
    Shape(&'static str),
    /// Creating the output directory or writing the file failed.
    #[error("filesystem: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error class used in diagnostics and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection failure, timeout or non-success status.
    Transport,
    /// Malformed JSON.
    Decode,
    /// Expected field path missing or of unexpected type.
    Shape,
    /// Directory creation or write failure.
    Filesystem,
    /// The worker handling the item panicked.
    Panicked,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::Status(_) => ErrorKind::Transport,
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::Shape(_) => ErrorKind::Shape,
            FetchError::Io(_) => ErrorKind::Filesystem,
        }
    }

    /// True if the request timed out (reported as a transport failure).
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_operation_timedout())
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Shape => "shape",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::Panicked => "panicked",
        };
        f.write_str(s)
    }
}
