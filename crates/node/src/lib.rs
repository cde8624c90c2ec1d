//! LatticeBFT node runtime.
//!
//! The node hosts a set of named modules and routes typed events between
//! them. Its dispatch core is a collection of cooperating tasks:
//!
//! - a **dispatcher** pulling event lists off the shared `work_item_input`
//!   queue and partitioning them to per-module inbound channels,
//! - one **worker** per registered module, executing the
//!   read / strip-follow-ups / intercept / apply / emit cycle,
//! - one **output forwarder** per active module, feeding asynchronously
//!   produced events back into the loop.
//!
//! # Task Supervision
//!
//! All tasks run on a [`TaskTracker`] and observe two signals in every
//! blocking operation: the run-scoped [`CancellationToken`] and the error
//! notifier's exit signal. The first fatal error latches the notifier; every
//! other task then unwinds as stopped, and [`Node::run`] returns the latched
//! error after joining them.
//!
//! [`TaskTracker`]: tokio_util::task::TaskTracker
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod chans;
mod dispatch;
mod notifier;
mod workers;

pub mod config;
pub mod error;
pub mod interceptor;
pub mod node;

pub use config::{DebugMode, NodeConfig};
pub use error::NodeError;
pub use interceptor::{Interceptor, RecordingInterceptor};
pub use node::Node;
