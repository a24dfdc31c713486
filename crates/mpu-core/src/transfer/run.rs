//! Upload driver: single request or bounded-concurrency multipart.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::remote::ObjectLocation;

use super::error::TransferError;
use super::plan::{plan_upload, PartRange, TransferSettings, UploadPlan};
use super::progress::ProgressObserver;
use super::target::{CompletedPartInfo, MultipartTarget};

/// What an upload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub location: ObjectLocation,
    pub size: u64,
    /// 1 for a single-request upload.
    pub parts: u64,
    /// ETag returned by the final request (PutObject or CompleteMultipartUpload).
    pub etag: Option<String>,
}

/// Upload `path` to `location`.
///
/// Files up to `settings.multipart_threshold` go up in one request; larger
/// files are split into `settings.part_size` parts with at most
/// `settings.concurrency` part uploads in flight. A failed multipart upload is
/// aborted before the error is returned. Nothing is retried here.
pub async fn upload_file<T: MultipartTarget>(
    target: &T,
    path: &Path,
    location: &ObjectLocation,
    settings: &TransferSettings,
    progress: Arc<dyn ProgressObserver>,
) -> Result<UploadReceipt, TransferError> {
    let size = tokio::fs::metadata(path)
        .await
        .map_err(|source| TransferError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    match plan_upload(size, settings)? {
        UploadPlan::Single { size } => {
            tracing::info!(%location, size, "uploading in a single request");
            let etag = target.put_object(location, path, size, &progress).await?;
            Ok(UploadReceipt {
                location: location.clone(),
                size,
                parts: 1,
                etag,
            })
        }
        UploadPlan::Multipart { parts } => {
            let upload_id = target.create_multipart_upload(location).await?;
            tracing::info!(
                %location,
                upload_id = %upload_id,
                parts = parts.len(),
                part_size = settings.part_size.bytes(),
                concurrency = settings.concurrency,
                "created multipart upload"
            );
            let result: Result<Option<String>, TransferError> = async {
                let completed = upload_parts(
                    target,
                    path,
                    location,
                    &upload_id,
                    settings.concurrency,
                    &parts,
                    &progress,
                )
                .await?;
                target
                    .complete_multipart_upload(location, &upload_id, &completed)
                    .await
            }
            .await;

            match result {
                Ok(etag) => Ok(UploadReceipt {
                    location: location.clone(),
                    size,
                    parts: parts.len() as u64,
                    etag,
                }),
                Err(err) => {
                    match target.abort_multipart_upload(location, &upload_id).await {
                        Ok(()) => tracing::info!(upload_id = %upload_id, "aborted multipart upload"),
                        Err(abort_err) => tracing::warn!(
                            upload_id = %upload_id,
                            "could not abort multipart upload: {}",
                            abort_err
                        ),
                    }
                    Err(err)
                }
            }
        }
    }
}

/// Upload every part, one task per part, `concurrency` at a time. Stops at
/// the first failure. Returns the parts sorted by part number.
async fn upload_parts<T: MultipartTarget>(
    target: &T,
    path: &Path,
    location: &ObjectLocation,
    upload_id: &str,
    concurrency: usize,
    parts: &[PartRange],
    progress: &Arc<dyn ProgressObserver>,
) -> Result<Vec<CompletedPartInfo>, TransferError> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for &part in parts {
        let semaphore = Arc::clone(&semaphore);
        let target = target.clone();
        let location = location.clone();
        let upload_id = upload_id.to_string();
        let path = path.to_path_buf();
        let progress = Arc::clone(progress);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| TransferError::PoolClosed)?;
            let done = target
                .upload_part(&location, &upload_id, &path, part, &progress)
                .await?;
            tracing::debug!(part = part.number, bytes = part.len(), "part uploaded");
            Ok::<_, TransferError>(done)
        });
    }

    let mut completed = Vec::with_capacity(parts.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(part)) => completed.push(part),
            Ok(Err(err)) => {
                tasks.abort_all();
                return Err(err);
            }
            Err(join_err) => {
                tasks.abort_all();
                return Err(TransferError::Worker(join_err));
            }
        }
    }
    completed.sort_by_key(|p| p.number);
    Ok(completed)
}
