//! Transfer error type.

use std::io;
use std::path::PathBuf;

use crate::remote::ObjectLocation;

/// Error returned by an upload. SDK failures are carried as messages; no
/// variant is retried by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The input file could not be opened or stat'ed.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A part body could not be read from disk.
    #[error("read part {part} of {}: {message}", path.display())]
    Body {
        path: PathBuf,
        part: i32,
        message: String,
    },
    /// Part size outside what S3 accepts for multipart uploads.
    #[error("part size {part_size} bytes is outside the allowed range {min}..={max}")]
    PartSizeOutOfRange { part_size: u64, min: u64, max: u64 },
    /// Too large for one PutObject request.
    #[error("object of {size} bytes exceeds the single-request limit of {max} bytes")]
    ObjectTooLarge { size: u64, max: u64 },
    /// The file would need more parts than S3 allows.
    #[error("{parts} parts exceed the limit of {max}; use a larger --partsize")]
    TooManyParts { parts: u64, max: u64 },
    /// A service request failed (network, auth, or S3 error response).
    #[error("{operation} failed for {location}: {message}")]
    Request {
        operation: &'static str,
        location: ObjectLocation,
        message: String,
    },
    /// A successful response lacked a field we need.
    #[error("{operation} returned no {field} for {location}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
        location: ObjectLocation,
    },
    /// A part task panicked or was cancelled.
    #[error("upload worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("upload worker pool closed")]
    PoolClosed,
}
