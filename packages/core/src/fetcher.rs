//! The Record Fetcher.
//!
//! One call to `fetch` is one linear request/response sequence:
//!
//! 1. open a connection and `SELECT` the database
//! 2. parse the document and extract the lookup key
//! 3. `TYPE` the key, then `GET` or `HGETALL` depending on the answer
//! 4. turn the result into exactly one `Outcome`
//!
//! The connection is dropped before `fetch` returns, whichever branch was
//! taken. Errors never escape: each is classified into a `FailureReason`.

use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use crate::config::FetcherConfig;
use crate::document::{FlowDocument, RoutedDocument};
use crate::error::{ConfigError, StoreError};
use crate::outcome::{Absence, FailureReason, LookupResult, Outcome, Payload};
use crate::store::{Connector, KeyStore, KeyType};

/// Look up `key` on an open store: ask for its type, then read it.
pub fn lookup<S: KeyStore + ?Sized>(store: &mut S, key: &str) -> Result<LookupResult, StoreError> {
    match store.key_type(key)? {
        KeyType::String => match store.get(key) {
            Ok(value) => Ok(LookupResult::Scalar(value)),
            Err(StoreError::NotFound { .. }) => Ok(LookupResult::Absent(Absence::NoValue)),
            Err(e) => Err(e),
        },
        KeyType::Hash => {
            let map = store.hgetall(key)?;
            if map.is_empty() {
                Ok(LookupResult::Absent(Absence::EmptyFieldMap))
            } else {
                Ok(LookupResult::FieldMap(map))
            }
        }
        KeyType::None => Ok(LookupResult::Absent(Absence::NoKey)),
        KeyType::Other(type_name) => Ok(LookupResult::Unsupported { type_name }),
    }
}

/// Fetches one record per document from a key-store.
///
/// Holds no connection between calls, so a shared fetcher may serve
/// concurrent callers when its connector is `Sync`.
pub struct RecordFetcher<C> {
    config: FetcherConfig,
    connector: C,
}

impl<C: Connector> RecordFetcher<C> {
    /// Validate `config` and build a fetcher.
    pub fn new(config: FetcherConfig, connector: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, connector })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch the record keyed by `document` and classify the result.
    pub fn fetch(&self, document: &[u8]) -> Outcome {
        let connection = &self.config.connection;

        let mut store = match self.connector.connect(connection) {
            Ok(store) => store,
            Err(e) => {
                error!(
                    host = %connection.host,
                    port = connection.port,
                    error = %e,
                    "failed to connect to key-store"
                );
                return Outcome::Failure(FailureReason::Connection {
                    message: e.to_string(),
                });
            }
        };

        if let Err(e) = store.select(connection.db_index) {
            error!(db = connection.db_index, error = %e, "failed to select database");
            return Outcome::Failure(FailureReason::Connection {
                message: e.to_string(),
            });
        }

        let outcome = self.fetch_with(&mut store, document);
        drop(store);
        outcome
    }

    fn fetch_with(&self, store: &mut C::Store, document: &[u8]) -> Outcome {
        let parsed: JsonValue = match serde_json::from_slice(document) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "failed to parse document");
                return Outcome::Failure(FailureReason::Unclassified {
                    message: format!("invalid document: {}", e),
                });
            }
        };

        let Some(key) = self.config.key_path.extract(&parsed) else {
            debug!(key_path = %self.config.key_path, "no lookup key in document");
            return Outcome::Failure(FailureReason::MissingKey);
        };

        match lookup(store, &key) {
            Ok(LookupResult::Scalar(value)) => Outcome::Success(Payload::Scalar(value)),
            Ok(LookupResult::FieldMap(map)) => Outcome::Success(Payload::FieldMap(map)),
            Ok(LookupResult::Absent(absence)) => {
                warn!(key = %key, "{}", absence);
                Outcome::Failure(FailureReason::Absent { absence })
            }
            Ok(LookupResult::Unsupported { type_name }) => {
                error!(key = %key, key_type = %type_name, "key is not of type string or hash");
                Outcome::Failure(FailureReason::UnsupportedType { key, type_name })
            }
            Err(StoreError::TypeMismatch { message }) => {
                error!(key = %key, error = %message, "wrong type of value in key-store");
                Outcome::Failure(FailureReason::TypeConflict { message })
            }
            Err(e) => {
                error!(key = %key, error = %e, "failed to retrieve from key-store");
                Outcome::Failure(FailureReason::Unclassified {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Fetch for a host document and apply the outcome to it.
    ///
    /// A scalar lands in the configured value attribute; a field-map
    /// replaces the content with its JSON object. Failures pass the
    /// document through untouched.
    pub fn process(&self, mut document: FlowDocument) -> RoutedDocument {
        let outcome = match self.fetch(&document.content) {
            Outcome::Success(Payload::FieldMap(map)) => match serde_json::to_vec(&map) {
                Ok(body) => {
                    document.content = body.into();
                    Outcome::Success(Payload::FieldMap(map))
                }
                Err(e) => {
                    error!(error = %e, "failed to serialize field-map");
                    Outcome::Failure(FailureReason::Unclassified {
                        message: e.to_string(),
                    })
                }
            },
            Outcome::Success(Payload::Scalar(value)) => {
                document
                    .attributes
                    .insert(self.config.value_attribute.clone(), value.clone());
                Outcome::Success(Payload::Scalar(value))
            }
            failure => failure,
        };

        RoutedDocument {
            route: outcome.route(),
            document,
            outcome,
        }
    }
}
