//! The host's unit of transfer: attributes plus raw content.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::outcome::{Outcome, Route};

/// Attribute that receives scalar values unless configured otherwise.
pub const DEFAULT_VALUE_ATTRIBUTE: &str = "redis.value";

/// A document as handed over by the upstream host.
///
/// The content is kept as raw bytes and only parsed by the fetcher, so a
/// document routed to failure leaves byte-for-byte as it came in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowDocument {
    pub attributes: BTreeMap<String, String>,
    pub content: Bytes,
}

impl FlowDocument {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            content: content.into(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A document after the fetcher has decided its channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedDocument {
    pub route: Route,
    pub document: FlowDocument,
    pub outcome: Outcome,
}
