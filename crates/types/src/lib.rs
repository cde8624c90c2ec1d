//! Core types for the LatticeBFT framework.
//!
//! This crate provides the fundamental identifier types used throughout the
//! LatticeBFT node implementation, including module and replica identifiers
//! and the small ordinal types carried by event payloads.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod batch_id;
pub mod module_id;
pub mod node_id;
pub mod retention;
pub mod seq_nr;

pub use batch_id::BatchId;
pub use module_id::ModuleId;
pub use node_id::NodeId;
pub use retention::RetentionIndex;
pub use seq_nr::SeqNr;
