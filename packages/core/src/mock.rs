//! In-memory key-store for tests.
//!
//! Holds typed entries, records every command it receives, and counts the
//! connections it hands out and gets back, so tests can check that a
//! lookup released its connection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::config::ConnectionConfig;
use crate::error::StoreError;
use crate::store::{Connector, KeyStore, KeyType};

#[derive(Debug, Clone)]
enum Entry {
    String(String),
    Hash(BTreeMap<String, String>),
    /// Typed as a string, but reads come back nil.
    Vanishing,
    Other(String),
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    type_conflicts: HashSet<String>,
    connect_error: Option<String>,
    select_error: Option<String>,
    fail_after: Option<usize>,
    commands: Vec<String>,
    opened: usize,
    closed: usize,
}

/// A connector handing out connections to one shared in-memory store.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<State>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(self, key: impl Into<String>, entry: Entry) -> Self {
        self.state.lock().unwrap().entries.insert(key.into(), entry);
        self
    }

    /// Store a scalar value.
    pub fn with_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, Entry::String(value.into()))
    }

    /// Store a field-map.
    pub fn with_hash(self, key: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let map = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.insert(key, Entry::Hash(map))
    }

    /// Store a key of some other type (`list`, `set`, ...).
    pub fn with_other(self, key: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.insert(key, Entry::Other(type_name.into()))
    }

    /// A key whose type is `string` but whose value reads back as nil.
    pub fn with_vanishing(self, key: impl Into<String>) -> Self {
        self.insert(key, Entry::Vanishing)
    }

    /// Every command touching `key` fails with a type mismatch.
    pub fn with_type_conflict(self, key: impl Into<String>) -> Self {
        self.state.lock().unwrap().type_conflicts.insert(key.into());
        self
    }

    /// Refuse every connection attempt.
    pub fn fail_connect_with(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().connect_error = Some(message.into());
        self
    }

    /// Fail every `SELECT`.
    pub fn fail_select_with(self, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().select_error = Some(message.into());
        self
    }

    /// Drop the connection after `count` commands on it.
    pub fn fail_after_commands(self, count: usize) -> Self {
        self.state.lock().unwrap().fail_after = Some(count);
        self
    }

    /// All commands received so far, across connections.
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }
}

impl Connector for MockConnector {
    type Store = MockStore;

    fn connect(&self, _config: &ConnectionConfig) -> Result<MockStore, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.connect_error {
            return Err(StoreError::connection(message.clone()));
        }
        state.opened += 1;
        Ok(MockStore {
            state: Arc::clone(&self.state),
            issued: 0,
        })
    }
}

/// One connection to a `MockConnector`'s store.
pub struct MockStore {
    state: Arc<Mutex<State>>,
    issued: usize,
}

impl MockStore {
    /// Record a command and apply the injected failures.
    fn command(&mut self, command: String, key: Option<&str>) -> Result<(), StoreError> {
        self.issued += 1;
        let mut state = self.state.lock().unwrap();
        state.commands.push(command);

        if matches!(state.fail_after, Some(limit) if self.issued > limit) {
            return Err(StoreError::connection("connection reset by peer"));
        }
        if let Some(key) = key {
            if state.type_conflicts.contains(key) {
                return Err(StoreError::type_mismatch(
                    "WRONGTYPE Operation against a key holding the wrong kind of value",
                ));
            }
        }
        Ok(())
    }

    fn entry(&self, key: &str) -> Option<Entry> {
        self.state.lock().unwrap().entries.get(key).cloned()
    }
}

impl KeyStore for MockStore {
    fn select(&mut self, db_index: u32) -> Result<(), StoreError> {
        self.command(format!("SELECT {}", db_index), None)?;
        match &self.state.lock().unwrap().select_error {
            Some(message) => Err(StoreError::other(message.clone())),
            None => Ok(()),
        }
    }

    fn key_type(&mut self, key: &str) -> Result<KeyType, StoreError> {
        self.command(format!("TYPE {}", key), Some(key))?;
        Ok(match self.entry(key) {
            Some(Entry::String(_)) | Some(Entry::Vanishing) => KeyType::String,
            Some(Entry::Hash(_)) => KeyType::Hash,
            Some(Entry::Other(type_name)) => KeyType::Other(type_name),
            None => KeyType::None,
        })
    }

    fn get(&mut self, key: &str) -> Result<String, StoreError> {
        self.command(format!("GET {}", key), Some(key))?;
        match self.entry(key) {
            Some(Entry::String(value)) => Ok(value),
            Some(Entry::Hash(_)) | Some(Entry::Other(_)) => Err(StoreError::type_mismatch(
                "WRONGTYPE Operation against a key holding the wrong kind of value",
            )),
            Some(Entry::Vanishing) | None => Err(StoreError::not_found(key)),
        }
    }

    fn hgetall(&mut self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        self.command(format!("HGETALL {}", key), Some(key))?;
        match self.entry(key) {
            Some(Entry::Hash(map)) => Ok(map),
            Some(Entry::String(_)) | Some(Entry::Vanishing) | Some(Entry::Other(_)) => {
                Err(StoreError::type_mismatch(
                    "WRONGTYPE Operation against a key holding the wrong kind of value",
                ))
            }
            None => Ok(BTreeMap::new()),
        }
    }
}

impl Drop for MockStore {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_open_and_close() {
        let connector = MockConnector::new();
        {
            let _store = connector.connect(&ConnectionConfig::new("localhost")).unwrap();
            assert_eq!(connector.opened(), 1);
            assert_eq!(connector.closed(), 0);
        }
        assert_eq!(connector.closed(), 1);
    }

    #[test]
    fn get_on_hash_is_type_mismatch() {
        let connector = MockConnector::new().with_hash("h", &[("f", "v")]);
        let mut store = connector.connect(&ConnectionConfig::new("localhost")).unwrap();
        assert!(matches!(
            store.get("h"),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn hgetall_on_missing_key_is_empty() {
        let connector = MockConnector::new();
        let mut store = connector.connect(&ConnectionConfig::new("localhost")).unwrap();
        assert!(store.hgetall("nope").unwrap().is_empty());
    }

    #[test]
    fn fail_after_drops_connection() {
        let connector = MockConnector::new().fail_after_commands(1);
        let mut store = connector.connect(&ConnectionConfig::new("localhost")).unwrap();
        assert!(store.select(0).is_ok());
        assert!(matches!(
            store.key_type("k"),
            Err(StoreError::Connection { .. })
        ));
    }
}
