//! Part layout planning for an upload.

use crate::etag::{ChunkSize, GIB, MIB};

use super::error::TransferError;

/// Part uploads run this many at a time unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// One part of a multipart upload: 1-based number, byte range [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub number: i32,
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl PartRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Size limits the service places on uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartLimits {
    pub min_part_size: u64,
    pub max_part_size: u64,
    pub max_parts: u64,
    /// Largest object accepted in a single PutObject request.
    pub max_single_put: u64,
}

impl Default for PartLimits {
    fn default() -> Self {
        Self {
            min_part_size: 5 * MIB,
            max_part_size: 5 * GIB,
            max_parts: 10_000,
            max_single_put: 5 * GIB,
        }
    }
}

/// How an upload is split and scheduled.
#[derive(Debug, Clone)]
pub struct TransferSettings {
    /// Maximum part uploads in flight.
    pub concurrency: usize,
    pub part_size: ChunkSize,
    /// Files larger than this are uploaded in parts.
    pub multipart_threshold: u64,
    pub limits: PartLimits,
}

impl TransferSettings {
    /// Settings whose threshold equals the part size, so the upload layout is
    /// exactly the layout the local fingerprint assumes.
    pub fn new(part_size: ChunkSize) -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            part_size,
            multipart_threshold: part_size.bytes(),
            limits: PartLimits::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_limits(mut self, limits: PartLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Upload shape chosen for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPlan {
    /// One PutObject request.
    Single { size: u64 },
    Multipart { parts: Vec<PartRange> },
}

/// Splits `total_size` into consecutive parts of `part_size` bytes; the last
/// part may be shorter. Returns an empty vec if either argument is 0.
pub fn plan_parts(total_size: u64, part_size: u64) -> Vec<PartRange> {
    if total_size == 0 || part_size == 0 {
        return Vec::new();
    }
    let count = total_size.div_ceil(part_size);
    let mut out = Vec::with_capacity(count as usize);
    let mut offset = 0u64;
    let mut number = 1i32;
    while offset < total_size {
        let end = offset.saturating_add(part_size).min(total_size);
        out.push(PartRange {
            number,
            start: offset,
            end,
        });
        offset = end;
        number += 1;
    }
    out
}

/// Choose single-request or multipart upload and check the layout against
/// the service limits before anything is sent.
pub fn plan_upload(size: u64, settings: &TransferSettings) -> Result<UploadPlan, TransferError> {
    let limits = &settings.limits;
    if size <= settings.multipart_threshold {
        if size > limits.max_single_put {
            return Err(TransferError::ObjectTooLarge {
                size,
                max: limits.max_single_put,
            });
        }
        return Ok(UploadPlan::Single { size });
    }

    let part_size = settings.part_size.bytes();
    if part_size < limits.min_part_size || part_size > limits.max_part_size {
        return Err(TransferError::PartSizeOutOfRange {
            part_size,
            min: limits.min_part_size,
            max: limits.max_part_size,
        });
    }
    let count = size.div_ceil(part_size);
    if count > limits.max_parts {
        return Err(TransferError::TooManyParts {
            parts: count,
            max: limits.max_parts,
        });
    }
    Ok(UploadPlan::Multipart {
        parts: plan_parts(size, part_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relaxed(part_size: u64) -> TransferSettings {
        TransferSettings::new(ChunkSize::new(part_size).unwrap()).with_limits(PartLimits {
            min_part_size: 1,
            ..PartLimits::default()
        })
    }

    #[test]
    fn plan_parts_even() {
        let parts = plan_parts(1000, 250);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], PartRange { number: 1, start: 0, end: 250 });
        assert_eq!(parts[3], PartRange { number: 4, start: 750, end: 1000 });
    }

    #[test]
    fn plan_parts_short_tail() {
        let parts = plan_parts(1001, 250);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[4].start, 1000);
        assert_eq!(parts[4].len(), 1);
        let total: u64 = parts.iter().map(PartRange::len).sum();
        assert_eq!(total, 1001);
    }

    #[test]
    fn plan_parts_zero() {
        assert!(plan_parts(0, 10).is_empty());
        assert!(plan_parts(10, 0).is_empty());
    }

    #[test]
    fn small_file_is_single_request() {
        let settings = relaxed(100);
        assert_eq!(plan_upload(0, &settings).unwrap(), UploadPlan::Single { size: 0 });
        assert_eq!(plan_upload(100, &settings).unwrap(), UploadPlan::Single { size: 100 });
    }

    #[test]
    fn file_over_threshold_is_multipart() {
        let settings = relaxed(100);
        match plan_upload(101, &settings).unwrap() {
            UploadPlan::Multipart { parts } => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1].len(), 1);
            }
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[test]
    fn part_size_below_s3_minimum_is_rejected() {
        let settings = TransferSettings::new(ChunkSize::from_mib(1).unwrap());
        let err = plan_upload(3 * MIB, &settings).unwrap_err();
        assert!(matches!(err, TransferError::PartSizeOutOfRange { .. }), "{err}");
    }

    #[test]
    fn part_size_above_s3_maximum_is_rejected() {
        let settings = TransferSettings::new(ChunkSize::from_gib(6).unwrap());
        let err = plan_upload(7 * GIB, &settings).unwrap_err();
        assert!(matches!(err, TransferError::PartSizeOutOfRange { .. }), "{err}");
    }

    #[test]
    fn oversized_single_request_is_rejected() {
        let settings = TransferSettings::new(ChunkSize::from_gib(6).unwrap());
        let err = plan_upload(5 * GIB + 1, &settings).unwrap_err();
        assert!(matches!(err, TransferError::ObjectTooLarge { .. }), "{err}");
    }

    #[test]
    fn too_many_parts_is_rejected() {
        let settings = relaxed(10);
        let err = plan_upload(10 * 10_001, &settings).unwrap_err();
        assert!(matches!(err, TransferError::TooManyParts { parts: 10_001, max: 10_000 }), "{err}");
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let settings = relaxed(10).with_concurrency(0);
        assert_eq!(settings.concurrency, 1);
        assert_eq!(TransferSettings::new(ChunkSize::new(1).unwrap()).concurrency, DEFAULT_CONCURRENCY);
    }
}
