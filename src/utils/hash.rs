use anyhow::Result;
use std::io::Read;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Size of the read buffer used when streaming a file through the hasher.
const STREAM_BUFFER_SIZE: usize = 65536;

/// Hashes an in-memory buffer, returning 32 lowercase hex characters.
#[must_use]
pub fn hash_bytes(data: &[u8]) -> String {
    let hash = xxh3_128(data);
    format!("{hash:032x}")
}

/// Streams a reader through the hasher, returning the digest and the number
/// of bytes consumed.
///
/// # Errors
///
/// Returns an error if reading from `reader` fails.
pub fn hash_reader<R: Read>(reader: &mut R) -> Result<(String, u64)> {
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    let hash = hasher.digest128();
    Ok((format!("{hash:032x}"), total))
}

/// Shortens a digest for display (first 8 characters)
#[must_use]
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
