//! The event type routed between modules.

use latticebft_types::ModuleId;
use serde::{Deserialize, Serialize};

use crate::kind::{EventKind, EventTag};

/// A destination-addressed message with an optional list of follow-ups.
///
/// Follow-up events are released into the event loop only after the carrying
/// event has been processed by its destination module. They may nest
/// arbitrarily; each processing step strips exactly one level (follow-ups of
/// follow-ups remain attached to their carriers).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Module the event is addressed to.
    pub dest: ModuleId,
    /// Payload variant.
    pub kind: EventKind,
    /// Events to emit after this one has been processed.
    pub follow_ups: Vec<Event>,
}

impl Event {
    /// Create an event with no follow-ups.
    pub fn new(dest: impl Into<ModuleId>, kind: EventKind) -> Self {
        Self {
            dest: dest.into(),
            kind,
            follow_ups: Vec::new(),
        }
    }

    /// Attach a follow-up event, returning the modified carrier.
    pub fn with_follow_up(mut self, follow_up: Event) -> Self {
        self.follow_ups.push(follow_up);
        self
    }

    /// Attach several follow-up events, returning the modified carrier.
    pub fn with_follow_ups(mut self, follow_ups: impl IntoIterator<Item = Event>) -> Self {
        self.follow_ups.extend(follow_ups);
        self
    }

    /// The tag of this event's payload.
    pub fn tag(&self) -> EventTag {
        self.kind.tag()
    }
}

/// Identifies the module a request originated from.
///
/// Request/response event pairs (batch store and lookup) carry the origin so
/// the serving module can address its response without knowing anything else
/// about the requester.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Module the response should be addressed to.
    pub module: ModuleId,
}

impl Origin {
    /// Create an origin for the given module.
    pub fn new(module: impl Into<ModuleId>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_follow_ups_preserves_order() {
        let ev = Event::new("a", EventKind::Init)
            .with_follow_up(Event::new("b", EventKind::TestingUint(1)))
            .with_follow_up(Event::new("c", EventKind::TestingUint(2)));

        assert_eq!(ev.follow_ups.len(), 2);
        assert_eq!(ev.follow_ups[0].dest, ModuleId::from("b"));
        assert_eq!(ev.follow_ups[1].dest, ModuleId::from("c"));
    }
}
