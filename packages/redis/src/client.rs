use std::collections::BTreeMap;

use redis::{Client, Commands, Connection};
use tracing::debug;

use recordfetch_core::{ConnectionConfig, Connector, KeyStore, KeyType, StoreError};

use crate::error::classify;

/// Build the `redis://` URL for a connection config.
///
/// IPv6 literals are bracketed. The database is not part of the URL; it is
/// chosen with an explicit `SELECT` after connecting.
pub fn connection_url(config: &ConnectionConfig) -> String {
    if config.host.contains(':') && !config.host.starts_with('[') {
        format!("redis://[{}]:{}/", config.host, config.port)
    } else {
        format!("redis://{}:{}/", config.host, config.port)
    }
}

/// Opens synchronous connections to a Redis-compatible server.
///
/// Every `connect` creates a fresh connection; nothing is pooled or shared
/// between lookups.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for RedisConnector {
    type Store = RedisKeyStore;

    fn connect(&self, config: &ConnectionConfig) -> Result<RedisKeyStore, StoreError> {
        let url = connection_url(config);
        debug!(url = %url, "opening key-store connection");

        // Only a malformed host makes the URL unparseable.
        let client = Client::open(url.as_str())
            .map_err(|e| StoreError::connection(format!("invalid address {}: {}", url, e)))?;

        let connection = match config.timeout {
            Some(timeout) => {
                let connection = client.get_connection_with_timeout(timeout).map_err(classify)?;
                connection
                    .set_read_timeout(Some(timeout))
                    .map_err(classify)?;
                connection
                    .set_write_timeout(Some(timeout))
                    .map_err(classify)?;
                connection
            }
            None => client.get_connection().map_err(classify)?,
        };

        Ok(RedisKeyStore { connection })
    }
}

/// One open connection. Closed when dropped.
pub struct RedisKeyStore {
    connection: Connection,
}

impl RedisKeyStore {
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }
}

impl KeyStore for RedisKeyStore {
    fn select(&mut self, db_index: u32) -> Result<(), StoreError> {
        redis::cmd("SELECT")
            .arg(db_index)
            .query::<()>(&mut self.connection)
            .map_err(classify)
    }

    fn key_type(&mut self, key: &str) -> Result<KeyType, StoreError> {
        let reply: String = redis::cmd("TYPE")
            .arg(key)
            .query(&mut self.connection)
            .map_err(classify)?;
        Ok(KeyType::parse(&reply))
    }

    fn get(&mut self, key: &str) -> Result<String, StoreError> {
        let value: Option<Vec<u8>> = self.connection.get(key).map_err(classify)?;
        value.map(decode).ok_or_else(|| StoreError::not_found(key))
    }

    fn hgetall(&mut self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let fields: BTreeMap<Vec<u8>, Vec<u8>> = self.connection.hgetall(key).map_err(classify)?;
        Ok(fields
            .into_iter()
            .map(|(field, value)| (decode(field), decode(value)))
            .collect())
    }
}

/// Stored values are binary-safe; invalid UTF-8 becomes U+FFFD.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
