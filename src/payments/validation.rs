//! Transaction hash validation and reference digests, shared by both services.

use md5::{Digest, Md5};

/// Length of an MD5 digest rendered as hex.
pub const MD5_HEX_LEN: usize = 32;

/// True only for exactly 32 ASCII hex digits, either case.
pub fn is_valid_md5(candidate: &str) -> bool {
    candidate.len() == MD5_HEX_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercase hex MD5 of the UTF-8 bytes of `data`.
///
/// Used as an opaque payment identifier, not for integrity or secrecy.
pub fn md5_hex(data: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}
