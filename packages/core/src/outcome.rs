//! Lookup results and per-document outcomes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a lookup found nothing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Absence {
    /// The store reports no such key.
    NoKey,
    /// The key is typed as a string but the read returned nothing.
    NoValue,
    /// The key is typed as a hash but the map is empty.
    EmptyFieldMap,
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Absence::NoKey => write!(f, "key does not exist"),
            Absence::NoValue => write!(f, "value absent despite string type"),
            Absence::EmptyFieldMap => write!(f, "field-map is empty"),
        }
    }
}

/// What the store holds for a lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    Scalar(String),
    FieldMap(BTreeMap<String, String>),
    Absent(Absence),
    /// The key exists but is neither a string nor a hash.
    Unsupported { type_name: String },
}

/// The value attached to a document on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Scalar(String),
    FieldMap(BTreeMap<String, String>),
}

/// Why a document was routed to failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The store could not be reached or the database not selected.
    Connection { message: String },
    /// The key path is absent or empty in the document.
    MissingKey,
    /// The stored representation conflicts with the requested read.
    TypeConflict { message: String },
    /// The store holds nothing usable for the key.
    Absent { absence: Absence },
    /// The key exists under a type other than string or hash.
    UnsupportedType { key: String, type_name: String },
    /// Any other failure (unparseable document, I/O mid-operation).
    Unclassified { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Connection { message } => write!(f, "connection error: {}", message),
            FailureReason::MissingKey => write!(f, "missing key"),
            FailureReason::TypeConflict { message } => write!(f, "type conflict: {}", message),
            FailureReason::Absent { absence } => write!(f, "{}", absence),
            FailureReason::UnsupportedType { key, type_name } => {
                write!(f, "key '{}' is of unsupported type '{}'", key, type_name)
            }
            FailureReason::Unclassified { message } => write!(f, "unclassified error: {}", message),
        }
    }
}

/// The terminal result of one fetch: exactly one per document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Payload),
    Failure(FailureReason),
}

impl Outcome {
    pub fn route(&self) -> Route {
        match self {
            Outcome::Success(_) => Route::Success,
            Outcome::Failure(_) => Route::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// The two output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Success,
    Failure,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::Success => "success",
            Route::Failure => "failure",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
