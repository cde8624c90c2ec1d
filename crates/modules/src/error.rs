//! Module-level error types.

use latticebft_events::EventTag;
use latticebft_types::ModuleId;
use thiserror::Error;

/// Error returned by a module's event-application path.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The module received an event kind it does not consume.
    #[error("module {module} received unexpected {tag} event")]
    UnexpectedEvent {
        /// Module that rejected the event.
        module: ModuleId,
        /// Tag of the rejected event.
        tag: EventTag,
    },

    /// No handler is registered for the event's tag.
    #[error("module {module} has no handler for {tag} events")]
    NoHandler {
        /// Module the event was addressed to.
        module: ModuleId,
        /// Tag with no registered handler.
        tag: EventTag,
    },

    /// Any other module-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error returned when assembling a module registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A module ID was registered twice.
    #[error("duplicate module ID: {module}")]
    DuplicateModule {
        /// The ID registered twice.
        module: ModuleId,
    },

    /// The empty string is not a dispatchable module ID.
    #[error("module IDs must be non-empty")]
    EmptyModuleId,
}
