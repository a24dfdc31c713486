//! `--mode upload`: multipart upload, then compare local and remote ETags.

use anyhow::{Context, Result};
use mpu_core::remote::{ObjectLocation, S3Session, SessionOptions};
use mpu_core::transfer::{self, ProgressPercentage, TransferSettings};
use mpu_core::verify::{self, Verdict};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use super::clock;
use super::local_etag::compute_local_etag;

/// Upload `path` into `bucket` under its file name and verify the result.
/// A mismatch is printed and logged but is not an error.
pub async fn run_upload(
    options: &SessionOptions,
    path: &Path,
    bucket: &str,
    settings: &TransferSettings,
) -> Result<Verdict> {
    println!("Initializing upload...");
    let size = File::open(path)
        .and_then(|f| f.metadata())
        .map(|m| m.len())
        .map_err(|err| {
            println!("Cannot open file.");
            err
        })
        .with_context(|| format!("cannot open {}", path.display()))?;
    let location = ObjectLocation::for_file(bucket, path)
        .with_context(|| format!("{} has no file name to use as key", path.display()))?;

    let session = S3Session::connect(options).await;

    let started = format!(
        "Multipartupload of: {} into bucket: {} started.",
        path.display(),
        bucket
    );
    println!("{} {}", clock(), started);
    tracing::info!(size, part_size = settings.part_size.bytes(), "{}", started);

    let progress = Arc::new(ProgressPercentage::new(path.display().to_string(), size));
    let receipt = transfer::upload_file(&session, path, &location, settings, progress).await?;

    let finished = format!(
        "Multipartupload of: {} into bucket: {} finished.",
        path.display(),
        bucket
    );
    println!();
    println!("{} {}", clock(), finished);
    tracing::info!(parts = receipt.parts, etag = ?receipt.etag, "{}", finished);

    let remote = session.get_object_etag(&location).await?;
    println!("Fetched Etag(Based on MD5) of uploaded file: {}", remote);
    tracing::info!("Fetched Etag(Based on MD5) of uploaded file: {}", remote);

    let local = compute_local_etag(path, settings.part_size).await?;
    println!("Calculated Etag(Based on MD5) of local file: {}", local.quoted());
    tracing::info!("Calculated Etag(Based on MD5) of local file: {}", local.quoted());

    let verdict = verify::verify_fingerprint(&local, &remote);
    verify::log_verdict(&location, &verdict);
    if verdict.is_match() {
        println!("{} Upload succeeded.", clock());
    } else {
        println!("{} Upload failed.", clock());
    }
    Ok(verdict)
}
