//! Content-derived identifiers.
//!
//! Every identifier in the system is a SHA-256 digest over the UTF-8 bytes of
//! its input, rendered as lower-case hex, so ids are reproducible across runs.

use sha2::{Digest, Sha256};

/// Full SHA-256 of `input` as 64 lower-case hex characters.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// The first `len` hex characters of [`sha256_hex`]; `len` is capped at 64.
pub fn short_id(input: &str, len: usize) -> String {
    let mut hex = sha256_hex(input);
    hex.truncate(len.min(64));
    hex
}

/// First eight digest bytes of `input`, big-endian.
pub fn digest_u64(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Interpret a hash identifier as a 64-bit integer.
///
/// Parses its first 16 characters as hex. Identifiers that are empty or not hex
/// fall back to [`digest_u64`] of the whole string.
pub fn hash_to_u64(hash_id: &str) -> u64 {
    let head: String = hash_id.chars().take(16).collect();
    let is_hex = !head.is_empty() && head.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex && let Ok(n) = u64::from_str_radix(&head, 16) {
        return n;
    }
    digest_u64(hash_id)
}
