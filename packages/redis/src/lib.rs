//! # recordfetch-redis
//!
//! Redis-protocol key-store client for recordfetch.
//!
//! `RedisConnector` opens one synchronous connection per lookup and
//! classifies driver errors into `StoreError` kinds, so the fetcher routes
//! on connection failures, type conflicts and missing values without
//! looking at `redis` types.
//!
//! ```ignore
//! use recordfetch_core::{ConnectionConfig, FetcherConfig, KeyPath, RecordFetcher};
//! use recordfetch_redis::RedisConnector;
//!
//! let config = FetcherConfig::new(ConnectionConfig::new("localhost"), KeyPath::parse("/id")?);
//! let fetcher = RecordFetcher::new(config, RedisConnector::new())?;
//!
//! let outcome = fetcher.fetch(br#"{"id": "user:42"}"#);
//! ```

pub mod client;
pub mod error;

pub use client::{connection_url, RedisConnector, RedisKeyStore};
pub use error::classify;
