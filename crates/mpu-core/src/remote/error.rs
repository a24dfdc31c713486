//! Errors from talking to S3 outside of a transfer.

use super::ObjectLocation;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request was rejected or could not be sent.
    #[error("{operation} failed for {location}: {message}")]
    Request {
        operation: &'static str,
        location: ObjectLocation,
        message: String,
    },
    /// The response carried no ETag.
    #[error("{operation} returned no ETag for {location}")]
    MissingEtag {
        operation: &'static str,
        location: ObjectLocation,
    },
    /// Only one of access key / secret key was supplied.
    #[error("incomplete credentials: both an access key and a secret key are required")]
    IncompleteCredentials,
}
