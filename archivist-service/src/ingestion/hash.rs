//! File hashing utilities for content deduplication.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Read size for streaming hashes. Files are digested one block at a time
/// and are never resident in memory whole.
const BLOCK_SIZE: usize = 1024 * 1024;

/// Compute SHA-256 hash of a file's contents, returning a hex string.
///
/// Uses streaming to handle large files without loading entirely into memory.
pub fn compute_file_hash(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut block = vec![0u8; BLOCK_SIZE];

    loop {
        let bytes_read = reader.read(&mut block)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&block[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute SHA-256 hash of a byte slice, returning a hex string.
///
/// Useful when content is already in memory; agrees with
/// [`compute_file_hash`] for the same bytes.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
