//! File payload transcoding
//!
//! Turns a file's declared payload into the bytes embedded in the document.
//! Base64 payloads are decoded first, plain payloads are taken as raw
//! UTF-8, and either result is then gzip-compressed. Compressed output is
//! deterministic only modulo the gzip header, so tests compare
//! decompressed content.

use std::io::Write;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::SeedError;
use crate::config::FileToWrite;

/// Produce the gzip-compressed payload bytes for one file entry.
pub fn transcode(file: &FileToWrite) -> Result<Vec<u8>, SeedError> {
    let raw = if file.payload_is_base64 {
        BASE64
            .decode(&file.payload_content)
            .map_err(|source| SeedError::PayloadDecode {
                path: file.file_path.clone(),
                source,
            })?
    } else {
        file.payload_content.as_bytes().to_vec()
    };

    gzip(&raw)
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>, SeedError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
