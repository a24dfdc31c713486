//! In-memory stand-in for S3 that computes ETags the way S3 does.

use md5::{Digest, Md5};
use mpu_core::remote::ObjectLocation;
use mpu_core::transfer::{
    CompletedPartInfo, MultipartTarget, PartRange, ProgressObserver, TransferError,
};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct StoredObject {
    pub data: Vec<u8>,
    pub etag: String,
}

#[derive(Default)]
pub struct State {
    next_upload: u64,
    uploads: HashMap<String, BTreeMap<i32, Vec<u8>>>,
    pub objects: HashMap<String, StoredObject>,
    pub created: Vec<String>,
    pub aborted: Vec<String>,
    pub put_requests: usize,
    in_flight: usize,
    pub max_in_flight: usize,
}

#[derive(Clone, Default)]
pub struct MemoryTarget {
    pub state: Arc<Mutex<State>>,
    /// Part number whose upload is rejected.
    pub fail_part: Option<i32>,
}

impl MemoryTarget {
    pub fn failing_on(part: i32) -> Self {
        Self {
            fail_part: Some(part),
            ..Self::default()
        }
    }

    pub fn etag_of(&self, location: &ObjectLocation) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.objects.get(&location.key).map(|o| o.etag.clone())
    }

    pub fn data_of(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.objects.get(&location.key).map(|o| o.data.clone())
    }
}

/// Bytes "sent" per progress update.
pub const READ_CHUNK: usize = 256;

/// Read `len` bytes at `start`, reporting each chunk as it is read.
fn read_range(
    path: &Path,
    start: u64,
    len: u64,
    progress: &Arc<dyn ProgressObserver>,
) -> std::io::Result<Vec<u8>> {
    let mut f = File::open(path)?;
    f.seek(SeekFrom::Start(start))?;
    let mut buf = vec![0u8; len as usize];
    for chunk in buf.chunks_mut(READ_CHUNK) {
        f.read_exact(chunk)?;
        progress.on_bytes(chunk.len() as u64);
    }
    Ok(buf)
}

fn rejected(operation: &'static str, location: &ObjectLocation) -> TransferError {
    TransferError::Request {
        operation,
        location: location.clone(),
        message: "InternalError: injected failure".to_string(),
    }
}

impl MultipartTarget for MemoryTarget {
    async fn put_object(
        &self,
        location: &ObjectLocation,
        path: &Path,
        size: u64,
        progress: &Arc<dyn ProgressObserver>,
    ) -> Result<Option<String>, TransferError> {
        let data = read_range(path, 0, size, progress).map_err(|source| TransferError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let etag = format!("\"{}\"", hex::encode(Md5::digest(&data)));
        let mut state = self.state.lock().unwrap();
        state.put_requests += 1;
        state.objects.insert(
            location.key.clone(),
            StoredObject {
                data,
                etag: etag.clone(),
            },
        );
        Ok(Some(etag))
    }

    async fn create_multipart_upload(
        &self,
        _location: &ObjectLocation,
    ) -> Result<String, TransferError> {
        let mut state = self.state.lock().unwrap();
        state.next_upload += 1;
        let id = format!("upload-{}", state.next_upload);
        state.uploads.insert(id.clone(), BTreeMap::new());
        state.created.push(id.clone());
        Ok(id)
    }

    async fn upload_part(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        path: &Path,
        part: PartRange,
        progress: &Arc<dyn ProgressObserver>,
    ) -> Result<CompletedPartInfo, TransferError> {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        let result = if self.fail_part == Some(part.number) {
            Err(rejected("UploadPart", location))
        } else {
            read_range(path, part.start, part.len(), progress)
                .map_err(|e| TransferError::Body {
                    path: path.to_path_buf(),
                    part: part.number,
                    message: e.to_string(),
                })
        };
        let mut state = self.state.lock().unwrap();
        state.in_flight -= 1;
        let data = result?;
        let etag = format!("\"{}\"", hex::encode(Md5::digest(&data)));
        state
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| rejected("UploadPart", location))?
            .insert(part.number, data);
        Ok(CompletedPartInfo {
            number: part.number,
            etag,
        })
    }

    async fn complete_multipart_upload(
        &self,
        location: &ObjectLocation,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> Result<Option<String>, TransferError> {
        let mut state = self.state.lock().unwrap();
        let uploaded = state
            .uploads
            .remove(upload_id)
            .ok_or_else(|| rejected("CompleteMultipartUpload", location))?;
        let numbers: Vec<i32> = parts.iter().map(|p| p.number).collect();
        let stored: Vec<i32> = uploaded.keys().copied().collect();
        if numbers != stored {
            return Err(rejected("CompleteMultipartUpload", location));
        }
        let mut data = Vec::new();
        let mut digests = Vec::new();
        for body in uploaded.values() {
            data.extend_from_slice(body);
            digests.extend_from_slice(&Md5::digest(body));
        }
        let etag = format!(
            "\"{}-{}\"",
            hex::encode(Md5::digest(&digests)),
            uploaded.len()
        );
        state.objects.insert(
            location.key.clone(),
            StoredObject {
                data,
                etag: etag.clone(),
            },
        );
        Ok(Some(etag))
    }

    async fn abort_multipart_upload(
        &self,
        _location: &ObjectLocation,
        upload_id: &str,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock().unwrap();
        state.uploads.remove(upload_id);
        state.aborted.push(upload_id.to_string());
        Ok(())
    }
}
