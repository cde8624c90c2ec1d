//! Retention index type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Retention index used for garbage collection of timer state.
///
/// Modules tag repeated timer events with a retention index; a later
/// garbage-collection event with index `n` cancels everything tagged with an
/// index strictly below `n`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RetentionIndex(u64);

impl RetentionIndex {
    /// Create a new retention index.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RetentionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RetentionIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
