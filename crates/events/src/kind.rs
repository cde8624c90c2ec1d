//! Event payload variants.

use latticebft_types::{BatchId, NodeId, RetentionIndex, SeqNr};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::event::{Event, Origin};

/// Raw transaction data carried by batch events.
pub type Transaction = Vec<u8>;

/// Payload of an [`Event`].
///
/// One variant per semantic kind of event the framework routes. The dispatch
/// core never inspects these beyond the destination field of the carrying
/// event; only the destination module interprets the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Module initialization trigger, sent once at node start.
    Init,

    /// Ask a timer module to re-emit `events` after `delay`.
    TimerDelay {
        /// Events to emit when the delay expires.
        events: Vec<Event>,
        /// How long to wait before emitting.
        delay: Duration,
    },

    /// Ask a timer module to emit `events` every `period`.
    TimerRepeat {
        /// Events to emit on every tick.
        events: Vec<Event>,
        /// Tick period.
        period: Duration,
        /// Retention index under which the repetition is filed.
        retention: RetentionIndex,
    },

    /// Cancel timer state filed under a retention index below `retention`.
    TimerGarbageCollect {
        /// Lowest retention index to keep.
        retention: RetentionIndex,
    },

    /// A message arrived from replica `from`.
    MessageReceived {
        /// Sending replica.
        from: NodeId,
        /// Opaque message bytes; serialization happens in the net module.
        payload: Vec<u8>,
    },

    /// Ask a net module to transmit `payload` to `destinations`.
    SendMessage {
        /// Receiving replicas.
        destinations: Vec<NodeId>,
        /// Opaque message bytes.
        payload: Vec<u8>,
    },

    /// An ordered-broadcast instance delivered a value.
    SbDeliver {
        /// Agreement slot the value was decided in.
        sn: SeqNr,
        /// Decided value; empty if the instance aborted.
        data: Vec<u8>,
        /// Whether the instance aborted instead of deciding.
        aborted: bool,
        /// Leader of the instance.
        leader: NodeId,
    },

    /// Ask a batch database to store a batch.
    StoreBatch {
        /// ID the batch is filed under.
        batch_id: BatchId,
        /// Transactions making up the batch.
        txs: Vec<Transaction>,
        /// Opaque metadata stored alongside the batch.
        metadata: Vec<u8>,
        /// Module to address the `BatchStored` acknowledgement to.
        origin: Origin,
    },

    /// Acknowledgement that a batch was stored.
    BatchStored {
        /// Origin copied from the corresponding `StoreBatch` request.
        origin: Origin,
    },

    /// Ask a batch database to look up a batch.
    LookupBatch {
        /// ID of the batch to look up.
        batch_id: BatchId,
        /// Module to address the `LookupBatchResponse` to.
        origin: Origin,
    },

    /// Response to a `LookupBatch` request.
    LookupBatchResponse {
        /// ID the lookup was for.
        batch_id: BatchId,
        /// Whether the batch was present.
        found: bool,
        /// The batch's transactions; empty when not found.
        txs: Vec<Transaction>,
        /// Origin copied from the corresponding `LookupBatch` request.
        origin: Origin,
    },

    /// Opaque string payload, used by tests.
    TestingString(String),

    /// Opaque integer payload, used by tests.
    TestingUint(u64),
}

impl EventKind {
    /// The fieldless tag identifying this payload's variant.
    pub fn tag(&self) -> EventTag {
        match self {
            EventKind::Init => EventTag::Init,
            EventKind::TimerDelay { .. } => EventTag::TimerDelay,
            EventKind::TimerRepeat { .. } => EventTag::TimerRepeat,
            EventKind::TimerGarbageCollect { .. } => EventTag::TimerGarbageCollect,
            EventKind::MessageReceived { .. } => EventTag::MessageReceived,
            EventKind::SendMessage { .. } => EventTag::SendMessage,
            EventKind::SbDeliver { .. } => EventTag::SbDeliver,
            EventKind::StoreBatch { .. } => EventTag::StoreBatch,
            EventKind::BatchStored { .. } => EventTag::BatchStored,
            EventKind::LookupBatch { .. } => EventTag::LookupBatch,
            EventKind::LookupBatchResponse { .. } => EventTag::LookupBatchResponse,
            EventKind::TestingString(_) => EventTag::TestingString,
            EventKind::TestingUint(_) => EventTag::TestingUint,
        }
    }
}

/// Fieldless mirror of [`EventKind`], used as a handler-table key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTag {
    /// See [`EventKind::Init`].
    Init,
    /// See [`EventKind::TimerDelay`].
    TimerDelay,
    /// See [`EventKind::TimerRepeat`].
    TimerRepeat,
    /// See [`EventKind::TimerGarbageCollect`].
    TimerGarbageCollect,
    /// See [`EventKind::MessageReceived`].
    MessageReceived,
    /// See [`EventKind::SendMessage`].
    SendMessage,
    /// See [`EventKind::SbDeliver`].
    SbDeliver,
    /// See [`EventKind::StoreBatch`].
    StoreBatch,
    /// See [`EventKind::BatchStored`].
    BatchStored,
    /// See [`EventKind::LookupBatch`].
    LookupBatch,
    /// See [`EventKind::LookupBatchResponse`].
    LookupBatchResponse,
    /// See [`EventKind::TestingString`].
    TestingString,
    /// See [`EventKind::TestingUint`].
    TestingUint,
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_variant() {
        assert_eq!(EventKind::Init.tag(), EventTag::Init);
        assert_eq!(
            EventKind::TestingString("x".into()).tag(),
            EventTag::TestingString
        );
        assert_eq!(
            EventKind::TimerGarbageCollect {
                retention: RetentionIndex::new(3),
            }
            .tag(),
            EventTag::TimerGarbageCollect
        );
    }
}
