//! Node configuration.

use latticebft_events::EventList;
use std::sync::Arc;

use crate::interceptor::Interceptor;

/// What happens to the dispatcher's output when debugging is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugMode {
    /// No debug channels; `step` and `debug_output` are refused.
    #[default]
    Off,
    /// Every outgoing partition is duplicated onto the debug output.
    Tap,
    /// Outgoing partitions go to the debug output only and never reach
    /// modules.
    Divert,
}

/// Options for constructing a [`Node`](crate::Node).
#[derive(Default)]
pub struct NodeConfig {
    pub(crate) interceptor: Option<Arc<dyn Interceptor>>,
    pub(crate) debug: DebugMode,
    pub(crate) initial_events: Option<EventList>,
}

impl NodeConfig {
    /// Default configuration: no interceptor, debugging off, no initial
    /// events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an interceptor observing every list before processing.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Select the debug mode.
    pub fn with_debug_mode(mut self, mode: DebugMode) -> Self {
        self.debug = mode;
        self
    }

    /// Events injected into the loop when the node starts running.
    pub fn with_initial_events(mut self, events: EventList) -> Self {
        self.initial_events = Some(events);
        self
    }
}
