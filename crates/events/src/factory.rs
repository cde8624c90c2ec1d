//! Constructor helpers, one per event kind.
//!
//! Modules and tests build events through these rather than spelling out
//! [`EventKind`] variants at every call site.

use latticebft_types::{BatchId, ModuleId, NodeId, RetentionIndex, SeqNr};
use std::time::Duration;

use crate::event::{Event, Origin};
use crate::kind::{EventKind, Transaction};

/// Module initialization trigger.
pub fn init(dest: impl Into<ModuleId>) -> Event {
    Event::new(dest, EventKind::Init)
}

/// Ask a timer module to re-emit `events` after `delay`.
pub fn timer_delay(dest: impl Into<ModuleId>, events: Vec<Event>, delay: Duration) -> Event {
    Event::new(dest, EventKind::TimerDelay { events, delay })
}

/// Ask a timer module to emit `events` every `period`.
pub fn timer_repeat(
    dest: impl Into<ModuleId>,
    events: Vec<Event>,
    period: Duration,
    retention: RetentionIndex,
) -> Event {
    Event::new(
        dest,
        EventKind::TimerRepeat {
            events,
            period,
            retention,
        },
    )
}

/// Cancel timer state filed under a retention index below `retention`.
pub fn timer_garbage_collect(dest: impl Into<ModuleId>, retention: RetentionIndex) -> Event {
    Event::new(dest, EventKind::TimerGarbageCollect { retention })
}

/// A message arrived from replica `from`.
pub fn message_received(dest: impl Into<ModuleId>, from: NodeId, payload: Vec<u8>) -> Event {
    Event::new(dest, EventKind::MessageReceived { from, payload })
}

/// Ask a net module to transmit `payload` to `destinations`.
pub fn send_message(
    dest: impl Into<ModuleId>,
    destinations: Vec<NodeId>,
    payload: Vec<u8>,
) -> Event {
    Event::new(
        dest,
        EventKind::SendMessage {
            destinations,
            payload,
        },
    )
}

/// An ordered-broadcast instance delivered a value.
pub fn sb_deliver(
    dest: impl Into<ModuleId>,
    sn: SeqNr,
    data: Vec<u8>,
    aborted: bool,
    leader: NodeId,
) -> Event {
    Event::new(
        dest,
        EventKind::SbDeliver {
            sn,
            data,
            aborted,
            leader,
        },
    )
}

/// Ask a batch database to store a batch.
pub fn store_batch(
    dest: impl Into<ModuleId>,
    batch_id: BatchId,
    txs: Vec<Transaction>,
    metadata: Vec<u8>,
    origin: Origin,
) -> Event {
    Event::new(
        dest,
        EventKind::StoreBatch {
            batch_id,
            txs,
            metadata,
            origin,
        },
    )
}

/// Acknowledgement that a batch was stored.
pub fn batch_stored(dest: impl Into<ModuleId>, origin: Origin) -> Event {
    Event::new(dest, EventKind::BatchStored { origin })
}

/// Ask a batch database to look up a batch.
pub fn lookup_batch(dest: impl Into<ModuleId>, batch_id: BatchId, origin: Origin) -> Event {
    Event::new(dest, EventKind::LookupBatch { batch_id, origin })
}

/// Response to a `LookupBatch` request.
pub fn lookup_batch_response(
    dest: impl Into<ModuleId>,
    batch_id: BatchId,
    found: bool,
    txs: Vec<Transaction>,
    origin: Origin,
) -> Event {
    Event::new(
        dest,
        EventKind::LookupBatchResponse {
            batch_id,
            found,
            txs,
            origin,
        },
    )
}

/// Opaque string payload, used by tests.
pub fn testing_string(dest: impl Into<ModuleId>, value: impl Into<String>) -> Event {
    Event::new(dest, EventKind::TestingString(value.into()))
}

/// Opaque integer payload, used by tests.
pub fn testing_uint(dest: impl Into<ModuleId>, value: u64) -> Event {
    Event::new(dest, EventKind::TestingUint(value))
}
