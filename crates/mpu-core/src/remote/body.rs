//! Request bodies that report bytes to a [`ProgressObserver`] as the SDK
//! streams them out.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::body::{Error as BodyError, SdkBody};
use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

use crate::transfer::ProgressObserver;

/// Read size for file-backed bodies; one progress update per read.
pub(crate) const BODY_BUFFER_SIZE: usize = 1024 * 1024;

struct ProgressBody {
    inner: SdkBody,
    progress: Arc<dyn ProgressObserver>,
}

impl Body for ProgressBody {
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BodyError>>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                this.progress.on_bytes(data.len() as u64);
            }
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        Body::is_end_stream(&self.inner)
    }

    fn size_hint(&self) -> SizeHint {
        Body::size_hint(&self.inner)
    }
}

/// Wrap `stream` so every data frame read from it is reported to `progress`.
///
/// A retried request rebuilds the body and reports its bytes again.
pub(crate) fn track(stream: ByteStream, progress: &Arc<dyn ProgressObserver>) -> ByteStream {
    let progress = Arc::clone(progress);
    stream.map(move |body| {
        SdkBody::from_body_1_x(ProgressBody {
            inner: body,
            progress: Arc::clone(&progress),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording {
        bytes: AtomicU64,
        calls: AtomicUsize,
    }

    impl ProgressObserver for Recording {
        fn on_bytes(&self, bytes: u64) {
            self.bytes.fetch_add(bytes, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn file_body_reports_every_read() {
        let content: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&content).unwrap();
        f.flush().unwrap();

        let stream = ByteStream::read_from()
            .path(f.path())
            .buffer_size(1024)
            .build()
            .await
            .unwrap();
        let recording = Arc::new(Recording::default());
        let observer: Arc<dyn ProgressObserver> = recording.clone();
        let body = track(stream, &observer).collect().await.unwrap().into_bytes();

        assert_eq!(&body[..], &content[..]);
        assert_eq!(recording.bytes.load(Ordering::SeqCst), 10_000);
        assert!(recording.calls.load(Ordering::SeqCst) >= 10);
    }

    #[tokio::test]
    async fn in_memory_body_is_reported_once() {
        let recording = Arc::new(Recording::default());
        let observer: Arc<dyn ProgressObserver> = recording.clone();
        let body = track(ByteStream::from_static(b"hello"), &observer)
            .collect()
            .await
            .unwrap()
            .into_bytes();
        assert_eq!(&body[..], b"hello");
        assert_eq!(recording.bytes.load(Ordering::SeqCst), 5);
        assert_eq!(recording.calls.load(Ordering::SeqCst), 1);
    }
}
