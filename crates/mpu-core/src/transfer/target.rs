//! The storage operations the orchestrator needs.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use crate::remote::ObjectLocation;

use super::error::TransferError;
use super::plan::PartRange;
use super::progress::ProgressObserver;

/// ETag the service returned for one uploaded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPartInfo {
    pub number: i32,
    pub etag: String,
}

/// Destination of an upload. Implemented by [`crate::remote::S3Session`];
/// tests provide an in-memory implementation.
///
/// Part bodies are read from `path` by the implementation, so a part is never
/// held in memory by the orchestrator. Implementations report body bytes to
/// `progress` as they are sent.
pub trait MultipartTarget: Clone + Send + Sync + 'static {
    /// Upload the whole file in one request. Returns the reported ETag.
    fn put_object(
        &self,
        location: &ObjectLocation,
        path: &Path,
        size: u64,
        progress: &Arc<dyn ProgressObserver>,
    ) -> impl Future<Output = Result<Option<String>, TransferError>> + Send;

    /// Start a multipart upload and return its upload id.
    fn create_multipart_upload(
        &self,
        location: &ObjectLocation,
    ) -> impl Future<Output = Result<String, TransferError>> + Send;

    fn upload_part(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        path: &Path,
        part: PartRange,
        progress: &Arc<dyn ProgressObserver>,
    ) -> impl Future<Output = Result<CompletedPartInfo, TransferError>> + Send;

    /// Assemble the object from `parts`, which are sorted by part number.
    /// Returns the reported ETag.
    fn complete_multipart_upload(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> impl Future<Output = Result<Option<String>, TransferError>> + Send;

    fn abort_multipart_upload(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
    ) -> impl Future<Output = Result<(), TransferError>> + Send;
}
