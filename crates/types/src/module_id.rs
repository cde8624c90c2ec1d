//! Module identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a module hosted by a node.
///
/// Module IDs are opaque string tokens. Every event carries the ID of its
/// destination module, and the node's dispatcher uses it to select the
/// inbound channel the event is forwarded on. IDs are chosen at node
/// construction time and never change while the node is running.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a new module ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is the empty string.
    ///
    /// Empty IDs are not dispatchable; the module registry rejects them.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
