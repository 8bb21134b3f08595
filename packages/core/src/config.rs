//! Fetcher configuration.
//!
//! The four inputs of a lookup (host, port, db index, key path) live in
//! explicit structs that are validated once, when a `RecordFetcher` is
//! built. Both structs deserialize with defaults so hosts can embed them in
//! their own configuration files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_VALUE_ATTRIBUTE;
use crate::error::ConfigError;
use crate::key_path::KeyPath;

/// Default key-store port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default logical database index.
pub const DEFAULT_DB_INDEX: u32 = 0;

/// Where the key-store lives and which database to select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub db_index: u32,

    /// Bound on connect, read and write. `None` leaves the network stack
    /// default in place.
    #[serde(
        default,
        rename = "timeout_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionConfig {
    /// Create a config for `host` with the default port and database.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            db_index: DEFAULT_DB_INDEX,
            timeout: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db_index(mut self, db_index: u32) -> Self {
        self.db_index = db_index;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }
        Ok(())
    }
}

/// Everything a `RecordFetcher` needs besides its connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(flatten)]
    pub connection: ConnectionConfig,

    pub key_path: KeyPath,

    /// Attribute that receives scalar values on success.
    #[serde(default = "default_value_attribute")]
    pub value_attribute: String,
}

fn default_value_attribute() -> String {
    DEFAULT_VALUE_ATTRIBUTE.to_string()
}

impl FetcherConfig {
    pub fn new(connection: ConnectionConfig, key_path: KeyPath) -> Self {
        Self {
            connection,
            key_path,
            value_attribute: default_value_attribute(),
        }
    }

    pub fn with_value_attribute(mut self, name: impl Into<String>) -> Self {
        self.value_attribute = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.connection.validate()?;
        if self.value_attribute.is_empty() {
            return Err(ConfigError::EmptyValueAttribute);
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_u64(d.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::new("localhost");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db_index, 0);
        assert_eq!(config.timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ConnectionConfig::new("cache.internal")
            .with_port(6380)
            .with_db_index(3)
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.port, 6380);
        assert_eq!(config.db_index, 3);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn empty_host_rejected() {
        assert_eq!(
            ConnectionConfig::new("  ").validate(),
            Err(ConfigError::EmptyHost)
        );
    }

    #[test]
    fn port_zero_rejected() {
        assert_eq!(
            ConnectionConfig::new("localhost").with_port(0).validate(),
            Err(ConfigError::InvalidPort { port: 0 })
        );
    }

    #[test]
    fn empty_value_attribute_rejected() {
        let config = FetcherConfig::new(
            ConnectionConfig::new("localhost"),
            KeyPath::parse("/id").unwrap(),
        )
        .with_value_attribute("");
        assert_eq!(config.validate(), Err(ConfigError::EmptyValueAttribute));
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: FetcherConfig = serde_json::from_value(json!({
            "host": "localhost",
            "key_path": "/id"
        }))
        .unwrap();

        assert_eq!(config.connection.port, DEFAULT_PORT);
        assert_eq!(config.connection.db_index, DEFAULT_DB_INDEX);
        assert_eq!(config.connection.timeout, None);
        assert_eq!(config.value_attribute, "redis.value");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserialize_full() {
        let config: FetcherConfig = serde_json::from_value(json!({
            "host": "10.0.0.5",
            "port": 6390,
            "db_index": 2,
            "timeout_ms": 1500,
            "key_path": "/record/key",
            "value_attribute": "lookup.value"
        }))
        .unwrap();

        assert_eq!(config.connection.port, 6390);
        assert_eq!(config.connection.db_index, 2);
        assert_eq!(config.connection.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.key_path.as_str(), "/record/key");
        assert_eq!(config.value_attribute, "lookup.value");
    }

    #[test]
    fn deserialize_rejects_bad_key_path() {
        let result: Result<FetcherConfig, _> = serde_json::from_value(json!({
            "host": "localhost",
            "key_path": "id"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_negative_db() {
        let result: Result<ConnectionConfig, _> = serde_json::from_value(json!({
            "host": "localhost",
            "db_index": -1
        }));
        assert!(result.is_err());
    }
}
