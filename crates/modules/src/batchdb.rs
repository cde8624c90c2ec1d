//! In-memory batch database module.
//!
//! Stores transaction batches in plain maps. Availability modules use it as
//! the node-local backing store for batches referenced by certificates; the
//! test suite uses it as the reference passive module.

use latticebft_events::{factory, Transaction};
use latticebft_types::{BatchId, ModuleId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dsl::DslModule;

#[derive(Default)]
struct BatchDbState {
    batches: HashMap<BatchId, BatchInfo>,
}

struct BatchInfo {
    txs: Vec<Transaction>,
    /// Kept for retention bookkeeping; not returned by lookups.
    #[allow(dead_code)]
    metadata: Vec<u8>,
}

/// Build the batch database module under the given ID.
///
/// The module answers `StoreBatch` with a `BatchStored` acknowledgement and
/// `LookupBatch` with a `LookupBatchResponse`, both addressed to the module
/// named in the request's origin. `Init` is accepted and ignored.
pub fn batch_db(module_id: impl Into<ModuleId>) -> DslModule {
    let mut module = DslModule::new(module_id);
    let state = Arc::new(Mutex::new(BatchDbState::default()));

    module.upon_init(|_buf| Ok(()));

    // On a store request, keep the data in the local maps and acknowledge.
    let store_state = Arc::clone(&state);
    module.upon_store_batch(move |batch_id, txs, metadata, origin, buf| {
        store_state.lock().batches.insert(
            batch_id.clone(),
            BatchInfo {
                txs: txs.to_vec(),
                metadata: metadata.to_vec(),
            },
        );
        buf.push(factory::batch_stored(origin.module.clone(), origin.clone()));
        Ok(())
    });

    // On a lookup request, just check the local map.
    module.upon_lookup_batch(move |batch_id, origin, buf| {
        let state = state.lock();
        match state.batches.get(batch_id) {
            Some(info) => buf.push(factory::lookup_batch_response(
                origin.module.clone(),
                batch_id.clone(),
                true,
                info.txs.clone(),
                origin.clone(),
            )),
            None => buf.push(factory::lookup_batch_response(
                origin.module.clone(),
                batch_id.clone(),
                false,
                Vec::new(),
                origin.clone(),
            )),
        }
        Ok(())
    });

    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::PassiveModule;
    use latticebft_events::{EventKind, EventList, Origin};

    fn apply_one(
        module: &mut DslModule,
        event: latticebft_events::Event,
    ) -> latticebft_events::Event {
        let out = module.apply_events(EventList::of(event)).expect("apply");
        assert_eq!(out.len(), 1);
        out.into_iter().next().expect("one response")
    }

    #[test]
    fn test_store_then_lookup_round() {
        let mut db = batch_db("batchdb");
        let origin = Origin::new("availability");
        let batch_id = BatchId::from_bytes(vec![1, 2, 3]);
        let txs: Vec<Transaction> = vec![vec![0xaa], vec![0xbb]];

        let ack = apply_one(
            &mut db,
            factory::store_batch(
                "batchdb",
                batch_id.clone(),
                txs.clone(),
                b"meta".to_vec(),
                origin.clone(),
            ),
        );
        assert_eq!(ack.dest, ModuleId::from("availability"));
        assert!(matches!(ack.kind, EventKind::BatchStored { .. }));

        let response = apply_one(
            &mut db,
            factory::lookup_batch("batchdb", batch_id.clone(), origin),
        );
        assert_eq!(response.dest, ModuleId::from("availability"));
        match response.kind {
            EventKind::LookupBatchResponse {
                batch_id: got_id,
                found,
                txs: got_txs,
                ..
            } => {
                assert_eq!(got_id, batch_id);
                assert!(found);
                assert_eq!(got_txs, txs);
            }
            other => panic!("expected LookupBatchResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_miss() {
        let mut db = batch_db("batchdb");
        let origin = Origin::new("availability");

        let response = apply_one(
            &mut db,
            factory::lookup_batch("batchdb", BatchId::from_bytes(vec![9]), origin),
        );
        match response.kind {
            EventKind::LookupBatchResponse { found, txs, .. } => {
                assert!(!found);
                assert!(txs.is_empty());
            }
            other => panic!("expected LookupBatchResponse, got {other:?}"),
        }
    }
}
