//! Error type for local ETag computation.

use std::io;
use std::path::PathBuf;

/// Failure while fingerprinting a local file.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The input path does not exist or could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Chunk size was zero, negative, or overflowed when converted to bytes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The file was opened but a read failed part way through.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
