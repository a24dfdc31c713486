//! Comparison of the local fingerprint against the ETag S3 reports.
//!
//! A mismatch is an outcome, not an error: the upload happened but could not
//! be verified. It is logged at error level and reported to the caller.

use crate::etag::Fingerprint;
use crate::remote::{normalize_etag, ObjectLocation};

/// Result of comparing a local and a remote ETag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Match { etag: String },
    Mismatch { local: String, remote: String },
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match { .. })
    }
}

/// Compare two quoted ETags after normalizing both the same way.
pub fn compare_etags(local_quoted: &str, remote: &str) -> Verdict {
    let local = normalize_etag(local_quoted);
    let remote = normalize_etag(remote);
    if local == remote {
        Verdict::Match { etag: remote }
    } else {
        Verdict::Mismatch { local, remote }
    }
}

pub fn verify_fingerprint(local: &Fingerprint, remote: &str) -> Verdict {
    compare_etags(&local.quoted(), remote)
}

/// Log the verdict for `location`.
pub fn log_verdict(location: &ObjectLocation, verdict: &Verdict) {
    match verdict {
        Verdict::Match { etag } => {
            tracing::info!(%location, etag = %etag, "Upload succeeded.");
        }
        Verdict::Mismatch { local, remote } => {
            tracing::error!(
                %location,
                local = %local,
                remote = %remote,
                "Upload failed: local ETag does not match the ETag reported by S3."
            );
        }
    }
}
