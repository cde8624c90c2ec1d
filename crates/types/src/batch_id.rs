//! Batch identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a transaction batch held by an availability module.
///
/// Batch IDs are opaque byte strings computed by whoever assembles the
/// batch; the dispatch core and the batch database treat them as plain map
/// keys.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchId(Vec<u8>);

impl BatchId {
    /// Create a batch ID from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// View the ID as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BatchId({})", hex_prefix(&self.0))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_prefix(&self.0))
    }
}

impl From<&[u8]> for BatchId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(8)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_display_truncates() {
        let id = BatchId::from_bytes(vec![0xab; 32]);
        assert_eq!(id.to_string(), "abababababababab");
    }
}
