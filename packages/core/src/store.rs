//! The key-store client boundary.
//!
//! A `Connector` opens one exclusive `KeyStore` connection per lookup. The
//! connection is released when the store value is dropped, so every exit
//! path of a lookup closes it.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConnectionConfig;
use crate::error::StoreError;

/// The type a key-store reports for a key (`TYPE key`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// A scalar string value.
    String,
    /// A field-map value.
    Hash,
    /// The key does not exist.
    None,
    /// Any other type (list, set, zset, stream, ...).
    Other(String),
}

impl KeyType {
    /// Parse a type reply. Matching is case-insensitive.
    pub fn parse(reply: &str) -> Self {
        match reply.to_ascii_lowercase().as_str() {
            "string" => KeyType::String,
            "hash" => KeyType::Hash,
            "none" => KeyType::None,
            other => KeyType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::Hash => "hash",
            KeyType::None => "none",
            KeyType::Other(name) => name,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One open connection to a key-store.
///
/// Implementations are read-only from the fetcher's point of view; nothing
/// here writes to the store.
pub trait KeyStore {
    /// Select the logical database (`SELECT db`).
    fn select(&mut self, db_index: u32) -> Result<(), StoreError>;

    /// Probe the type stored at `key` (`TYPE key`).
    fn key_type(&mut self, key: &str) -> Result<KeyType, StoreError>;

    /// Read a scalar value (`GET key`).
    ///
    /// A nil reply is `Err(StoreError::NotFound)`.
    fn get(&mut self, key: &str) -> Result<String, StoreError>;

    /// Read a whole field-map (`HGETALL key`). A missing key yields an
    /// empty map.
    fn hgetall(&mut self, key: &str) -> Result<BTreeMap<String, String>, StoreError>;
}

/// Opens key-store connections.
///
/// Shared across concurrent lookups; each call to `connect` must return a
/// connection owned by the caller alone.
pub trait Connector: Send + Sync {
    type Store: KeyStore;

    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Store, StoreError>;
}

impl<C: Connector + ?Sized> Connector for &C {
    type Store = C::Store;

    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Store, StoreError> {
        (**self).connect(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_types() {
        assert_eq!(KeyType::parse("string"), KeyType::String);
        assert_eq!(KeyType::parse("hash"), KeyType::Hash);
        assert_eq!(KeyType::parse("none"), KeyType::None);
        assert_eq!(KeyType::parse("STRING"), KeyType::String);
    }

    #[test]
    fn parse_other_types() {
        assert_eq!(KeyType::parse("list"), KeyType::Other("list".to_string()));
        assert_eq!(KeyType::parse("zset").as_str(), "zset");
        assert_eq!(KeyType::parse("stream").to_string(), "stream");
    }
}
