//! `Content-Encoding` decoding.

use std::io::Read;

use bytes::Bytes;

use crate::{Error, Result};

/// The `gzip` content coding.
pub const GZIP: &str = "gzip";

/// Decode a body according to its `Content-Encoding` value.
///
/// `gzip`, `x-gzip` and `deflate` are decoded; `identity`, an empty value and
/// unknown codings are returned as-is.
///
/// # Errors
///
/// Returns [`Error::Decompression`] if the bytes are not valid for the coding.
pub fn decode_content(encoding: &str, body: Bytes) -> Result<Bytes> {
    let decoded = match encoding.trim().to_ascii_lowercase().as_str() {
        "gzip" | "x-gzip" => {
            let mut decoder = flate2::read::GzDecoder::new(body.as_ref());
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| Error::decompression(format!("gzip: {e}")))?;
            Bytes::from(decompressed)
        }
        "deflate" => {
            let mut decoder = flate2::read::DeflateDecoder::new(body.as_ref());
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| Error::decompression(format!("deflate: {e}")))?;
            Bytes::from(decompressed)
        }
        _ => body,
    };

    Ok(decoded)
}
