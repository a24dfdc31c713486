//! Streaming multipart ETag hasher.

use md5::{Digest, Md5};
use std::io;

use super::{ChunkSize, Fingerprint};

/// Incremental hasher that splits its input into fixed-size chunks the same
/// way an S3 multipart upload does, keeping one raw MD5 per chunk.
///
/// Implements [`io::Write`], so any reader can be fed through `io::copy`.
#[derive(Clone)]
pub struct EtagHasher {
    chunk_size: u64,
    current: Md5,
    filled: u64,
    parts: u64,
    /// Raw part digests, concatenated in read order.
    digests: Vec<u8>,
}

impl EtagHasher {
    pub fn new(chunk_size: ChunkSize) -> Self {
        Self {
            chunk_size: chunk_size.bytes(),
            current: Md5::new(),
            filled: 0,
            parts: 0,
            digests: Vec::new(),
        }
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let room = self.chunk_size - self.filled;
            let take = usize::try_from(room).map_or(data.len(), |r| r.min(data.len()));
            self.current.update(&data[..take]);
            self.filled += take as u64;
            data = &data[take..];
            if self.filled == self.chunk_size {
                self.close_chunk();
            }
        }
    }

    /// Number of chunks closed so far (a trailing partial chunk is not counted).
    pub fn parts_closed(&self) -> u64 {
        self.parts
    }

    fn close_chunk(&mut self) {
        let digest = self.current.finalize_reset();
        self.digests.extend_from_slice(&digest);
        self.filled = 0;
        self.parts += 1;
    }

    pub fn finalize(mut self) -> Fingerprint {
        if self.filled > 0 {
            self.close_chunk();
        }
        match self.parts {
            0 => Fingerprint::Single {
                digest: to_array(&Md5::digest(b"")),
            },
            1 => Fingerprint::Single {
                digest: to_array(&self.digests),
            },
            parts => Fingerprint::Composite {
                digest: to_array(&Md5::digest(&self.digests)),
                parts,
            },
        }
    }
}

fn to_array(digest: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(digest);
    out
}

impl io::Write for EtagHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
