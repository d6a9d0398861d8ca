//! Content hashing for native records.
//!
//! The hash covers everything a record carries, so two records with equal
//! hashes are interchangeable in the cache.

use sha2::{Digest, Sha256};

use crate::record::NativeRecord;

/// A 32-byte SHA-256 content hash.
pub type ContentHash = [u8; 32];

/// Compute the content hash of a native record.
pub fn record_hash(record: &NativeRecord) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(record.keyword.as_str().as_bytes());
    hasher.update([0]);
    if let Some(index) = record.index {
        hasher.update(index.to_le_bytes());
    }
    hasher.update([0]);
    if let Some(app_id) = &record.application_id {
        hasher.update(app_id.as_str().as_bytes());
    }
    hasher.update([0]);
    if let Some(stream_id) = &record.stream_id {
        hasher.update(stream_id.as_str().as_bytes());
    }
    for field in &record.fields {
        hasher.update([0x1f]);
        hasher.update(field.as_bytes());
    }
    hasher.finalize().into()
}

/// Format a content hash as a hex string.
pub fn hash_hex(hash: &ContentHash) -> String {
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::Keyword;

    fn memb(fields: &[&str]) -> NativeRecord {
        NativeRecord::new(Keyword::Memb)
            .with_index(1)
            .with_application_id("Slab0")
            .with_fields(fields.iter().map(|f| f.to_string()))
    }

    #[test]
    fn deterministic_hash() {
        assert_eq!(record_hash(&memb(&["a", "b"])), record_hash(&memb(&["a", "b"])));
    }

    #[test]
    fn field_boundaries_matter() {
        assert_ne!(record_hash(&memb(&["ab", "c"])), record_hash(&memb(&["a", "bc"])));
    }

    #[test]
    fn hash_hex_format() {
        let hex = hash_hex(&record_hash(&memb(&[])));
        assert_eq!(hex.len(), 64);
    }
}
