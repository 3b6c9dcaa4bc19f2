//! Input document model
//!
//! Documents are the immutable unit of input: text plus a free-form JSON
//! metadata map. The engine only ever reads them; the collector forwards
//! each one unchanged downstream after observing it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Grouping key used when a document carries no usable language metadata.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Default metadata field holding the categorical grouping key.
pub const DEFAULT_LANGUAGE_FIELD: &str = "language";

/// One unit of corpus input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry, consuming and returning the document.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up the grouping key under `field`.
    ///
    /// Missing fields and non-string values both resolve to the
    /// [`UNKNOWN_LANGUAGE`] sentinel rather than erroring, so that every
    /// document lands in exactly one group.
    pub fn language(&self, field: &str) -> &str {
        self.metadata
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_LANGUAGE)
    }
}
