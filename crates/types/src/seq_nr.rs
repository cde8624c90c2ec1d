//! Sequence number type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of an agreement slot.
///
/// Sequence numbers are assigned by ordering modules and carried by delivery
/// events so that downstream modules can apply decisions in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeqNr(u64);

impl SeqNr {
    /// Create a new sequence number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Get the next sequence number.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SeqNr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SeqNr {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
