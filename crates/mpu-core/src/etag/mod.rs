//! Local prediction of the ETag S3 assigns to an uploaded object.
//!
//! S3 reports a plain MD5 for objects stored with a single request and a
//! composite value for multipart uploads: the MD5 of the concatenated raw
//! part MD5s, followed by `-<part count>`. Computing the same value locally
//! lets us verify an upload without downloading it again.

mod error;
mod hasher;


pub use error::FingerprintError;
pub use hasher::EtagHasher;

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::num::NonZeroU64;
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

pub const MIB: u64 = 1024 * 1024;
pub const GIB: u64 = 1024 * MIB;

/// Bytes per part. Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChunkSize(NonZeroU64);

impl ChunkSize {
    pub fn new(bytes: u64) -> Result<Self, FingerprintError> {
        NonZeroU64::new(bytes).map(Self).ok_or_else(|| {
            FingerprintError::InvalidArgument("chunk size must be greater than zero".to_string())
        })
    }

    /// Chunk size given in gibibytes (the unit of `--partsize`).
    pub fn from_gib(gib: i64) -> Result<Self, FingerprintError> {
        Self::scaled(gib, GIB, "GiB")
    }

    pub fn from_mib(mib: i64) -> Result<Self, FingerprintError> {
        Self::scaled(mib, MIB, "MiB")
    }

    fn scaled(value: i64, unit: u64, unit_name: &str) -> Result<Self, FingerprintError> {
        if value <= 0 {
            return Err(FingerprintError::InvalidArgument(format!(
                "chunk size must be greater than zero, got {} {}",
                value, unit_name
            )));
        }
        let bytes = (value as u64).checked_mul(unit).ok_or_else(|| {
            FingerprintError::InvalidArgument(format!(
                "chunk size {} {} overflows a byte count",
                value, unit_name
            ))
        })?;
        Self::new(bytes)
    }

    pub fn bytes(self) -> u64 {
        self.0.get()
    }
}

/// Locally computed ETag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
    /// File fits in one chunk: MD5 of the whole content, no suffix.
    Single { digest: [u8; 16] },
    /// Two or more chunks: MD5 of the concatenated part digests.
    Composite { digest: [u8; 16], parts: u64 },
}

impl Fingerprint {
    pub fn part_count(&self) -> u64 {
        match self {
            Fingerprint::Single { .. } => 1,
            Fingerprint::Composite { parts, .. } => *parts,
        }
    }

    /// The fingerprint wrapped in double quotes, as S3 returns ETag headers.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Single { digest } => write!(f, "{}", hex::encode(digest)),
            Fingerprint::Composite { digest, parts } => {
                write!(f, "{}-{}", hex::encode(digest), parts)
            }
        }
    }
}

/// Number of parts a file of `size` bytes splits into (0 for an empty file).
pub fn expected_parts(size: u64, chunk_size: ChunkSize) -> u64 {
    size.div_ceil(chunk_size.bytes())
}

/// Compute the multipart ETag of a file without loading it into memory.
pub fn fingerprint_path(path: &Path, chunk_size: ChunkSize) -> Result<Fingerprint, FingerprintError> {
    let not_found = |source| FingerprintError::FileNotFound {
        path: path.to_path_buf(),
        source,
    };
    let f = File::open(path).map_err(not_found)?;
    // Opening a directory succeeds on unix; only the first read fails.
    if f.metadata().map_err(not_found)?.is_dir() {
        return Err(not_found(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }
    let mut hasher = EtagHasher::new(chunk_size);
    io::copy(&mut BufReader::with_capacity(BUF_SIZE, f), &mut hasher).map_err(|source| {
        FingerprintError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let fingerprint = hasher.finalize();
    tracing::debug!(
        path = %path.display(),
        chunk_size = chunk_size.bytes(),
        parts = fingerprint.part_count(),
        "computed local etag {}",
        fingerprint
    );
    Ok(fingerprint)
}
