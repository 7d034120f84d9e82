//! Field name hashing.

/// CRC-32 of a field's declared name.
///
/// Binary archives identify fields by this hash instead of the name text.
#[inline]
pub fn name_hash(name: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(name.as_bytes());
    hasher.finalize()
}
