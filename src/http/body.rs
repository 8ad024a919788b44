//! Response body module
//!
//! Every response carries a [`ResponseBody`]: either a fixed buffer or a file
//! read lazily in chunks, optionally passed through one compression stage.
//! hyper polls the body only when the socket accepts more data, so reads are
//! gated by the client. Dropping the body closes the file.

use crate::http::encoding::Compressor;
use bytes::{Bytes, BytesMut};
use futures_util::stream;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use std::io;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of a single read from disk
const CHUNK_SIZE: usize = 64 * 1024;

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body with no bytes (304, HEAD)
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body backed by an in-memory buffer
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Source and transform stage of a file body
struct FileChunks {
    file: File,
    compressor: Option<Compressor>,
    done: bool,
}

impl FileChunks {
    /// Produce the next non-empty chunk, or `None` once the file and the
    /// compressor trailer are exhausted
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        while !self.done {
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            let n = self.file.read_buf(&mut buf).await?;

            if n == 0 {
                self.done = true;
                return match self.compressor.take() {
                    Some(compressor) => {
                        let tail = compressor.finish()?;
                        Ok((!tail.is_empty()).then_some(tail))
                    }
                    None => Ok(None),
                };
            }

            let chunk = buf.freeze();
            match self.compressor.as_mut() {
                Some(compressor) => {
                    let out = compressor.compress(&chunk)?;
                    // the encoder may hold input back until it has a full block
                    if !out.is_empty() {
                        return Ok(Some(out));
                    }
                }
                None => return Ok(Some(chunk)),
            }
        }
        Ok(None)
    }
}

/// Stream an open file, through `compressor` when one was negotiated
pub fn file(file: File, compressor: Option<Compressor>) -> ResponseBody {
    let chunks = FileChunks {
        file,
        compressor,
        done: false,
    };

    let frames = stream::try_unfold(chunks, |mut chunks| async move {
        let next = chunks.next_chunk().await?;
        Ok::<_, io::Error>(next.map(|data| (Frame::data(data), chunks)))
    });

    StreamBody::new(frames).boxed_unsync()
}
