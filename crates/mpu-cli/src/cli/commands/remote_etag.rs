//! `--mode gets3etag`: print the ETag S3 reports for an object.

use anyhow::Result;
use mpu_core::remote::{normalize_etag, ObjectLocation, S3Session, SessionOptions};

pub async fn run_remote_etag(options: &SessionOptions, location: &ObjectLocation) -> Result<String> {
    println!("Get Etag from s3 object.");
    let session = S3Session::connect(options).await;
    let etag = session.object_attributes_etag(location).await?;
    println!("Etag: {}", etag);
    tracing::info!(%location, "Etag: {}", etag);
    let normalized = normalize_etag(&etag);
    if normalized != etag {
        tracing::debug!(%location, "normalized ETag for comparison: {}", normalized);
    }
    Ok(etag)
}
