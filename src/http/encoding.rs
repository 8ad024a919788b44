//! Content-Encoding negotiation module
//!
//! Picks gzip or deflate from the request's `Accept-Encoding` and provides
//! the incremental compressor the file body is piped through.

use bytes::Bytes;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::io::{self, Write};

/// Supported response encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Deflate,
}

impl Encoding {
    /// Choose an encoding from an `Accept-Encoding` header value
    ///
    /// Tokens are matched whole and case-sensitively (`gzip` matches in
    /// `x-gzip` but not in `gzipped`). gzip beats deflate regardless of order
    /// or q-values; anything else means no transformation.
    pub fn negotiate(accept_encoding: Option<&str>) -> Option<Self> {
        let header = accept_encoding?;
        let mut deflate = false;
        for token in header.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) {
            match token {
                "gzip" => return Some(Self::Gzip),
                "deflate" => deflate = true,
                _ => {}
            }
        }
        deflate.then_some(Self::Deflate)
    }

    /// Value for the `Content-Encoding` header
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    /// Fresh compressor for one response body
    pub fn compressor(self) -> Compressor {
        match self {
            Self::Gzip => Compressor::Gzip(GzEncoder::new(Vec::new(), Compression::default())),
            // HTTP "deflate" is the zlib container
            Self::Deflate => {
                Compressor::Deflate(ZlibEncoder::new(Vec::new(), Compression::default()))
            }
        }
    }
}

/// Incremental compressor
///
/// Input is fed chunk by chunk; whatever compressed output is ready is
/// drained after each chunk so the whole body is never held in memory.
pub enum Compressor {
    Gzip(GzEncoder<Vec<u8>>),
    Deflate(ZlibEncoder<Vec<u8>>),
}

impl Compressor {
    /// Compress one chunk and return the output produced so far (may be empty)
    pub fn compress(&mut self, chunk: &[u8]) -> io::Result<Bytes> {
        let pending = match self {
            Self::Gzip(encoder) => {
                encoder.write_all(chunk)?;
                encoder.get_mut()
            }
            Self::Deflate(encoder) => {
                encoder.write_all(chunk)?;
                encoder.get_mut()
            }
        };
        Ok(Bytes::from(std::mem::take(pending)))
    }

    /// Flush the remaining compressed data and the format trailer
    pub fn finish(self) -> io::Result<Bytes> {
        let tail = match self {
            Self::Gzip(encoder) => encoder.finish()?,
            Self::Deflate(encoder) => encoder.finish()?,
        };
        Ok(Bytes::from(tail))
    }
}
