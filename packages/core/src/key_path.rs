//! JSON pointer locating the lookup key inside a document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors related to key path parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    /// The key path string is empty.
    #[error("key path must not be empty")]
    Empty,

    /// The key path does not start with `/`.
    #[error("key path '{path}' must start with '/'")]
    MissingLeadingSlash { path: String },
}

/// A validated JSON pointer (RFC 6901), e.g. `/id` or `/user/keys/0`.
///
/// Escapes follow the pointer syntax: `~1` stands for `/` and `~0` for `~`
/// inside a component.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyPath(String);

impl KeyPath {
    /// Parse a key path, rejecting empty and relative pointers.
    ///
    /// ```rust
    /// use recordfetch_core::KeyPath;
    ///
    /// assert!(KeyPath::parse("/id").is_ok());
    /// assert!(KeyPath::parse("id").is_err());
    /// assert!(KeyPath::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, KeyPathError> {
        if s.is_empty() {
            return Err(KeyPathError::Empty);
        }
        if !s.starts_with('/') {
            return Err(KeyPathError::MissingLeadingSlash {
                path: s.to_string(),
            });
        }
        Ok(KeyPath(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the lookup key from a document.
    ///
    /// Strings are used as-is; numbers and booleans by their JSON text.
    /// Returns `None` when the node is missing, null, an object, an array,
    /// or an empty string.
    ///
    /// A JSON `null` is not turned into the text `"null"`. Hosts that
    /// relied on looking up a key literally named `null` from a null node
    /// get `MissingKey` instead, and no lookup is made.
    pub fn extract(&self, document: &JsonValue) -> Option<String> {
        let key = match document.pointer(&self.0)? {
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => return None,
        };

        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPath::parse(s)
    }
}

impl TryFrom<String> for KeyPath {
    type Error = KeyPathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        KeyPath::parse(&s)
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(path: &str, document: JsonValue) -> Option<String> {
        KeyPath::parse(path).unwrap().extract(&document)
    }

    #[test]
    fn parse_rejects_empty_and_relative() {
        assert_eq!(KeyPath::parse(""), Err(KeyPathError::Empty));
        assert!(matches!(
            KeyPath::parse("id"),
            Err(KeyPathError::MissingLeadingSlash { .. })
        ));
        assert_eq!(KeyPath::parse("/id").unwrap().as_str(), "/id");
    }

    #[test]
    fn extract_top_level_string() {
        assert_eq!(
            extract("/id", json!({"id": "user:42"})),
            Some("user:42".to_string())
        );
    }

    #[test]
    fn extract_nested_and_indexed() {
        let doc = json!({"user": {"keys": ["a", "b"]}});
        assert_eq!(extract("/user/keys/1", doc), Some("b".to_string()));
    }

    #[test]
    fn extract_escaped_component() {
        let doc = json!({"a/b": "slash", "m~n": "tilde"});
        assert_eq!(extract("/a~1b", doc.clone()), Some("slash".to_string()));
        assert_eq!(extract("/m~0n", doc), Some("tilde".to_string()));
    }

    #[test]
    fn extract_scalars_as_text() {
        assert_eq!(extract("/id", json!({"id": 42})), Some("42".to_string()));
        assert_eq!(extract("/id", json!({"id": true})), Some("true".to_string()));
    }

    #[test]
    fn extract_missing_or_empty_is_none() {
        assert_eq!(extract("/id", json!({"id": ""})), None);
        assert_eq!(extract("/id", json!({"other": "x"})), None);
        assert_eq!(extract("/id", json!({"id": null})), None);
        assert_eq!(extract("/id", json!({"id": {"nested": 1}})), None);
        assert_eq!(extract("/id", json!({"id": [1, 2]})), None);
        assert_eq!(extract("/id/deeper", json!({"id": "flat"})), None);
        assert_eq!(extract("/id", json!("not an object")), None);
    }

    #[test]
    fn serde_uses_plain_string() {
        let path: KeyPath = serde_json::from_value(json!("/id")).unwrap();
        assert_eq!(path.to_string(), "/id");
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("/id"));

        let bad: Result<KeyPath, _> = serde_json::from_value(json!("id"));
        assert!(bad.is_err());
    }

    #[test]
    fn from_str_parses() {
        let path: KeyPath = "/a/b".parse().unwrap();
        assert_eq!(path.as_str(), "/a/b");
    }
}
