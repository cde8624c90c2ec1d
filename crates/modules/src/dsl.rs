//! Handler-table modules.
//!
//! [`DslModule`] assembles a [`PassiveModule`] from per-event-kind handlers:
//! a table from [`EventTag`] to handler list replaces hand-written match
//! statements in simple modules. Handlers emit resulting events through an
//! [`EventBuffer`]; everything emitted during one processing step becomes the
//! module's output list.

use latticebft_events::{Event, EventKind, EventList, EventTag, Origin, Transaction};
use latticebft_types::{BatchId, ModuleId, NodeId, SeqNr};
use std::collections::HashMap;

use crate::error::ModuleError;
use crate::module::PassiveModule;

/// Collects the events a handler emits during one processing step.
#[derive(Default)]
pub struct EventBuffer {
    out: EventList,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an event.
    pub fn push(&mut self, event: Event) {
        self.out.push_back(event);
    }

    /// Number of events emitted so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Whether nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consume the buffer, yielding the emitted events.
    pub fn into_list(self) -> EventList {
        self.out
    }
}

type Handler = Box<dyn FnMut(&EventKind, &mut EventBuffer) -> Result<(), ModuleError> + Send>;

/// A passive module built from per-tag handlers.
///
/// Events whose tag has no registered handler fail the processing step with
/// [`ModuleError::NoHandler`]; a module that wants to ignore a kind registers
/// an empty handler for it.
pub struct DslModule {
    module_id: ModuleId,
    handlers: HashMap<EventTag, Vec<Handler>>,
}

impl DslModule {
    /// Create a module with no handlers.
    pub fn new(module_id: impl Into<ModuleId>) -> Self {
        Self {
            module_id: module_id.into(),
            handlers: HashMap::new(),
        }
    }

    /// The ID this module was created for.
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    /// Register a handler for all events tagged `tag`.
    ///
    /// Multiple handlers for one tag run in registration order.
    pub fn upon(
        &mut self,
        tag: EventTag,
        handler: impl FnMut(&EventKind, &mut EventBuffer) -> Result<(), ModuleError> + Send + 'static,
    ) {
        self.handlers
            .entry(tag)
            .or_default()
            .push(Box::new(handler));
    }

    /// Register a handler for [`EventKind::Init`].
    pub fn upon_init(
        &mut self,
        mut handler: impl FnMut(&mut EventBuffer) -> Result<(), ModuleError> + Send + 'static,
    ) {
        self.upon(EventTag::Init, move |_, buf| handler(buf));
    }

    /// Register a handler for [`EventKind::SbDeliver`].
    pub fn upon_sb_deliver(
        &mut self,
        mut handler: impl FnMut(SeqNr, &[u8], bool, &NodeId, &mut EventBuffer) -> Result<(), ModuleError>
            + Send
            + 'static,
    ) {
        self.upon(EventTag::SbDeliver, move |kind, buf| match kind {
            EventKind::SbDeliver {
                sn,
                data,
                aborted,
                leader,
            } => handler(*sn, data, *aborted, leader, buf),
            _ => Ok(()),
        });
    }

    /// Register a handler for [`EventKind::StoreBatch`].
    pub fn upon_store_batch(
        &mut self,
        mut handler: impl FnMut(
                &BatchId,
                &[Transaction],
                &[u8],
                &Origin,
                &mut EventBuffer,
            ) -> Result<(), ModuleError>
            + Send
            + 'static,
    ) {
        self.upon(EventTag::StoreBatch, move |kind, buf| match kind {
            EventKind::StoreBatch {
                batch_id,
                txs,
                metadata,
                origin,
            } => handler(batch_id, txs, metadata, origin, buf),
            _ => Ok(()),
        });
    }

    /// Register a handler for [`EventKind::LookupBatch`].
    pub fn upon_lookup_batch(
        &mut self,
        mut handler: impl FnMut(&BatchId, &Origin, &mut EventBuffer) -> Result<(), ModuleError>
            + Send
            + 'static,
    ) {
        self.upon(EventTag::LookupBatch, move |kind, buf| match kind {
            EventKind::LookupBatch { batch_id, origin } => handler(batch_id, origin, buf),
            _ => Ok(()),
        });
    }

    /// Register a handler for [`EventKind::TestingString`].
    pub fn upon_testing_string(
        &mut self,
        mut handler: impl FnMut(&str, &mut EventBuffer) -> Result<(), ModuleError> + Send + 'static,
    ) {
        self.upon(EventTag::TestingString, move |kind, buf| match kind {
            EventKind::TestingString(value) => handler(value, buf),
            _ => Ok(()),
        });
    }

    /// Register a handler for [`EventKind::TestingUint`].
    pub fn upon_testing_uint(
        &mut self,
        mut handler: impl FnMut(u64, &mut EventBuffer) -> Result<(), ModuleError> + Send + 'static,
    ) {
        self.upon(EventTag::TestingUint, move |kind, buf| match kind {
            EventKind::TestingUint(value) => handler(*value, buf),
            _ => Ok(()),
        });
    }
}

impl PassiveModule for DslModule {
    fn apply_events(&mut self, events: EventList) -> Result<EventList, ModuleError> {
        let mut buf = EventBuffer::new();

        for event in events {
            let tag = event.tag();
            let handlers = self
                .handlers
                .get_mut(&tag)
                .ok_or_else(|| ModuleError::NoHandler {
                    module: self.module_id.clone(),
                    tag,
                })?;
            for handler in handlers.iter_mut() {
                handler(&event.kind, &mut buf)?;
            }
        }

        Ok(buf.into_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latticebft_events::factory;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut module = DslModule::new("probe");
        module.upon_testing_uint(|value, buf| {
            buf.push(factory::testing_uint("sink", value * 10));
            Ok(())
        });
        module.upon_testing_uint(|value, buf| {
            buf.push(factory::testing_uint("sink", value * 100));
            Ok(())
        });

        let out = module
            .apply_events(EventList::of(factory::testing_uint("probe", 7)))
            .expect("apply");

        let values: Vec<u64> = out
            .iter()
            .map(|ev| match ev.kind {
                EventKind::TestingUint(v) => v,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(values, vec![70, 700]);
    }

    #[test]
    fn test_unhandled_tag_errors() {
        let mut module = DslModule::new("probe");
        module.upon_init(|_| Ok(()));

        let err = module
            .apply_events(EventList::of(factory::testing_string("probe", "x")))
            .expect_err("no handler registered");
        assert!(matches!(err, ModuleError::NoHandler { tag, .. } if tag == EventTag::TestingString));
    }

    #[test]
    fn test_buffer_collects_across_events() {
        let mut module = DslModule::new("probe");
        module.upon_testing_uint(|value, buf| {
            buf.push(factory::testing_uint("sink", value + 1));
            Ok(())
        });

        let mut input = EventList::new();
        input.push_back(factory::testing_uint("probe", 1));
        input.push_back(factory::testing_uint("probe", 2));

        let out = module.apply_events(input).expect("apply");
        assert_eq!(out.len(), 2);
    }
}
