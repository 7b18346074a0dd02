//! BLAKE3-derived identifiers.

/// First 8 bytes of the BLAKE3 hash of `data`, little-endian.
///
/// 64 bits is plenty for chunk ids and embedding buckets at knowledge-base
/// scale (`P(collision) ≈ n² / 2^65`). A colliding chunk id overwrites the
/// earlier point, so re-ingesting the same source is idempotent.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let bytes: [u8; 8] = hash.as_bytes()[0..8]
        .try_into()
        .expect("BLAKE3 always produces at least 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Vector-store point id for chunk `index` of `source`.
#[inline]
pub fn chunk_point_id(source: &str, index: usize) -> u64 {
    hash_to_u64(chunk_doc_id(source, index).as_bytes())
}

/// Human-readable chunk id, `"{source}_{index}"`.
pub fn chunk_doc_id(source: &str, index: usize) -> String {
    format!("{}_{}", source, index)
}
