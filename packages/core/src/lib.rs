//! # recordfetch-core
//!
//! Reads a single record from a Redis-compatible key-store using a key
//! taken out of an inbound JSON document, and routes the result.
//!
//! The pieces:
//! - `ConnectionConfig` / `FetcherConfig`: validated-once configuration
//! - `KeyPath`: JSON pointer locating the lookup key inside a document
//! - `KeyStore` / `Connector`: the key-store client boundary
//! - `RecordFetcher`: document in, exactly one `Outcome` out
//! - `FlowDocument` / `RoutedDocument`: the host's unit of transfer
//!
//! # Example
//!
//! ```ignore
//! use recordfetch_core::mock::MockConnector;
//! use recordfetch_core::{ConnectionConfig, FetcherConfig, KeyPath, Outcome, Payload, RecordFetcher};
//!
//! let connector = MockConnector::new().with_string("user:42", "alice");
//! let config = FetcherConfig::new(
//!     ConnectionConfig::new("localhost"),
//!     KeyPath::parse("/id").unwrap(),
//! );
//!
//! let fetcher = RecordFetcher::new(config, connector).unwrap();
//! let outcome = fetcher.fetch(br#"{"id": "user:42"}"#);
//! assert_eq!(outcome, Outcome::Success(Payload::Scalar("alice".to_string())));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod key_path;
pub mod outcome;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use config::{ConnectionConfig, FetcherConfig, DEFAULT_DB_INDEX, DEFAULT_PORT};
pub use document::{FlowDocument, RoutedDocument, DEFAULT_VALUE_ATTRIBUTE};
pub use error::{ConfigError, StoreError};
pub use fetcher::{lookup, RecordFetcher};
pub use key_path::{KeyPath, KeyPathError};
pub use outcome::{Absence, FailureReason, LookupResult, Outcome, Payload, Route};
pub use store::{Connector, KeyStore, KeyType};
