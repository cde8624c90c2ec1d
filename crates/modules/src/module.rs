//! The two module capability sets.

use async_trait::async_trait;
use latticebft_events::EventList;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ModuleError;

/// A synchronous module.
///
/// The node's worker invokes [`apply_events`](Self::apply_events) with the
/// events addressed to this module, one list per processing step, in the
/// order the dispatcher forwarded them. The returned events are re-injected
/// into the event loop.
///
/// Implementations receive the input list by value and therefore cannot
/// retain it. They run inside the worker's execution context; panics are
/// caught by the worker and converted to fatal node errors.
pub trait PassiveModule: Send {
    /// Apply a list of events, producing the resulting events.
    fn apply_events(&mut self, events: EventList) -> Result<EventList, ModuleError>;
}

/// An asynchronous module that owns its own concurrency.
///
/// The node only ever submits events to an active module; anything the
/// module produces is delivered later over the output channel handed to the
/// runtime via [`take_output`](Self::take_output). Dropping the output
/// sender is the module's termination signal.
///
/// Unlike passive modules, active modules are responsible for their own
/// panic handling; the runtime does not wrap their submit path.
#[async_trait]
pub trait ActiveModule: Send {
    /// Submit a list of events to the module.
    ///
    /// Errors returned here are submit-time failures and are fatal to the
    /// node. Results of the actual processing arrive on the output channel.
    /// The cancellation token is the node's run-scoped token; the module
    /// should observe it in any internal blocking.
    async fn apply_events(
        &mut self,
        cancel: &CancellationToken,
        events: EventList,
    ) -> Result<(), ModuleError>;

    /// Hand the module's output channel to the runtime.
    ///
    /// Called exactly once, before the first [`apply_events`](Self::apply_events).
    /// Implementations typically store the receiver in an `Option` and
    /// `take` it here; returning `None` on a second call.
    fn take_output(&mut self) -> Option<mpsc::Receiver<EventList>>;
}

/// A registered module: exactly one of the two capability sets.
pub enum Module {
    /// A synchronous module, driven entirely by its worker.
    Passive(Box<dyn PassiveModule>),
    /// An asynchronous module with its own output path.
    Active(Box<dyn ActiveModule>),
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Module::Passive(_) => f.write_str("Module::Passive"),
            Module::Active(_) => f.write_str("Module::Active"),
        }
    }
}

impl Module {
    /// Wrap a passive module.
    pub fn passive(module: impl PassiveModule + 'static) -> Self {
        Module::Passive(Box::new(module))
    }

    /// Wrap an active module.
    pub fn active(module: impl ActiveModule + 'static) -> Self {
        Module::Active(Box::new(module))
    }
}
