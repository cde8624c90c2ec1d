//! Module interfaces for the LatticeBFT node.
//!
//! A node hosts a collection of named modules and routes events between
//! them. Modules come in two flavours:
//!
//! - **Passive** ([`PassiveModule`]): a synchronous transformation of an
//!   event list into an event list. The node invokes it from the module's
//!   worker task and isolates panics.
//! - **Active** ([`ActiveModule`]): owns its own concurrency. The node only
//!   submits events to it; produced events come back asynchronously over the
//!   module's output channel.
//!
//! Modules are registered under unique [`ModuleId`]s in a [`Modules`] set
//! before the node starts and live for the lifetime of the node.
//!
//! The [`dsl`] module provides [`DslModule`], a passive module assembled
//! from per-event-kind handlers, and [`batchdb`] an in-memory batch database
//! built on it.
//!
//! [`ModuleId`]: latticebft_types::ModuleId

pub mod batchdb;
pub mod dsl;
pub mod error;
pub mod module;
pub mod registry;

pub use dsl::{DslModule, EventBuffer};
pub use error::{ModuleError, RegistryError};
pub use module::{ActiveModule, Module, PassiveModule};
pub use registry::Modules;
