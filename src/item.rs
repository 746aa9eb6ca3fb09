// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Item collaborators
//!
//! The generator knows nothing about what an item is. A [`Serializer`] turns
//! one item into the raw bytes written to the record, and a [`KeyProvider`]
//! picks the partition key of a record from its first item.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use uuid::Uuid;

/// An item could not be serialized; it is dropped, never retried
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Serialization failed: {0}")]
pub struct SerializeError(pub String);

impl SerializeError {
    /// Create a serialization error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Converts one item into the bytes packed into a record
pub trait Serializer<T> {
    /// Serialize a single item
    fn serialize(&self, item: &T) -> Result<Vec<u8>, SerializeError>;

    /// Short label for an item, used in diagnostics
    fn describe(&self, _item: &T) -> String {
        "item".to_string()
    }
}

/// Chooses the partition key of a finalized record
pub trait KeyProvider<T> {
    /// Partition key for a record whose first item is `head`
    fn partition_key(&self, head: &T) -> String;
}

/// Same key for every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedKey(pub String);

impl FixedKey {
    /// Create a fixed key provider
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl<T> KeyProvider<T> for FixedKey {
    fn partition_key(&self, _head: &T) -> String {
        self.0.clone()
    }
}

/// Fresh random key per record, spreading records across shards
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKey;

impl RandomKey {
    /// Base64 encoding of a v4 UUID's 16 bytes
    pub fn generate() -> String {
        STANDARD.encode(Uuid::new_v4().as_bytes())
    }
}

impl<T> KeyProvider<T> for RandomKey {
    fn partition_key(&self, _head: &T) -> String {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_key() {
        let keys = FixedKey::new("abc");
        assert_eq!(KeyProvider::<u32>::partition_key(&keys, &7), "abc");
    }

    #[test]
    fn test_random_key_shape() {
        let key = RandomKey::generate();
        // 16 bytes -> 24 base64 characters with padding
        assert_eq!(key.len(), 24);
        assert!(key.ends_with("=="));

        let decoded = STANDARD.decode(&key).unwrap();
        assert_eq!(decoded.len(), 16);
        // Version nibble of a v4 UUID
        assert_eq!(decoded[6] >> 4, 4);
    }

    #[test]
    fn test_random_keys_differ() {
        let a = KeyProvider::<()>::partition_key(&RandomKey, &());
        let b = KeyProvider::<()>::partition_key(&RandomKey, &());
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialize_error_display() {
        let err = SerializeError::new("no fields");
        assert_eq!(err.to_string(), "Serialization failed: no fields");
    }
}
