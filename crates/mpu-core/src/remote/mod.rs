//! Remote side: object locations, the S3 session, and ETag retrieval.

mod body;
mod error;
mod session;

pub use error::RemoteError;
pub use session::{CredentialSource, S3Session, SessionOptions};

use std::fmt;
use std::path::Path;

/// Bucket and key of an object in S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Location for uploading a local file: the key is the file name component
    /// of `path`. Returns None when the path has no file name (e.g. `..`).
    pub fn for_file(bucket: impl Into<String>, path: &Path) -> Option<Self> {
        let key = path.file_name()?.to_string_lossy().into_owned();
        Some(Self::new(bucket, key))
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Length of a quoted single-part ETag: `"` + 32 hex digits + `"`.
const QUOTED_SINGLE_LEN: usize = 34;

/// Bring an ETag into the form used for comparison.
///
/// A 34-character value is rewritten to its first 33 characters followed by
/// `-1"`, i.e. a quoted single-part MD5 becomes a one-part composite. Values of
/// any other length pass through unchanged. This mirrors observed S3 behaviour
/// where the same object is reported in both shapes depending on the response;
/// it is provider-version-dependent, not a documented invariant.
pub fn normalize_etag(raw: &str) -> String {
    if raw.chars().count() == QUOTED_SINGLE_LEN {
        let head: String = raw.chars().take(QUOTED_SINGLE_LEN - 1).collect();
        format!("{}-1\"", head)
    } else {
        raw.to_string()
    }
}
