//! Node runtime error types.

use latticebft_types::ModuleId;
use thiserror::Error;

/// Errors produced by the node runtime.
///
/// `Stopped` is the benign exit of a task that observed cancellation or the
/// exit signal; it is never latched in the error notifier. Everything else
/// is fatal: the first one latched wins and is returned from
/// [`Node::run`](crate::Node::run).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The node was stopped by cancellation or by another task's failure.
    #[error("node stopped")]
    Stopped,

    /// A module returned an error from its event-application path.
    #[error("module {module} failed: {reason}")]
    ModuleFailure {
        /// The failing module.
        module: ModuleId,
        /// Rendered module error.
        reason: String,
    },

    /// A passive module panicked while applying events.
    #[error("module {module} panicked: {message}\nstack trace:\n{backtrace}")]
    ModulePanic {
        /// The panicking module.
        module: ModuleId,
        /// Rendered panic payload.
        message: String,
        /// Stack trace captured at the recovery point.
        backtrace: String,
    },

    /// An event was addressed to a module that is not registered.
    #[error("no module registered for destination {destination}")]
    UnknownDestination {
        /// The unresolvable destination.
        destination: ModuleId,
    },

    /// `run` was invoked more than once on the same node.
    #[error("node is already running or has finished")]
    AlreadyRunning,

    /// `step` or `debug_output` was used without a debug mode configured.
    #[error("node was built without a debug mode")]
    DebugDisabled,
}

impl NodeError {
    /// Whether this is the benign stopped signal rather than a failure.
    pub fn is_stopped(&self) -> bool {
        matches!(self, NodeError::Stopped)
    }
}
