//! `--mode getlocaletag`: compute the ETag S3 would report for a local file.

use anyhow::{Context, Result};
use mpu_core::etag::{self, ChunkSize, Fingerprint};
use std::path::Path;

/// Hash on the blocking pool; large files take a while.
pub(super) async fn compute_local_etag(path: &Path, part_size: ChunkSize) -> Result<Fingerprint> {
    let owned = path.to_path_buf();
    let fingerprint = tokio::task::spawn_blocking(move || etag::fingerprint_path(&owned, part_size))
        .await
        .context("local etag worker")??;
    Ok(fingerprint)
}

pub async fn run_local_etag(path: &Path, part_size: ChunkSize) -> Result<Fingerprint> {
    println!("Get etag from local file.");
    let fingerprint = compute_local_etag(path, part_size).await?;
    println!("Etag of local file:     {}", fingerprint.quoted());
    tracing::info!(
        path = %path.display(),
        part_size = part_size.bytes(),
        "Etag of local file: {}",
        fingerprint.quoted()
    );
    Ok(fingerprint)
}
