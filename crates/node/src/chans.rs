//! Work channels connecting the dispatcher to the modules.

use latticebft_events::EventList;
use latticebft_types::ModuleId;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Capacity of each module's inbound channel.
///
/// A single slot keeps the hand-off contract: forwarding a list completes
/// only once the worker has taken the previous one, so dispatcher
/// back-pressure reaches slow modules directly.
pub(crate) const MODULE_CHANNEL_CAPACITY: usize = 1;

/// Capacity of the debug output channel. The debug consumer must drain it;
/// an undrained tap eventually stalls the dispatcher.
pub(crate) const DEBUG_OUT_CAPACITY: usize = 128;

/// The channels wiring a node together.
///
/// All modules write their output into the shared `work_item` queue, from
/// where the dispatcher redistributes lists to the per-module inbound
/// channels. External submissions are funneled through the same queue, as
/// are debug-stepped events (via `debug_in`). The queue is unbounded: it
/// doubles as the pending-work buffer, so module workers never block while
/// re-injecting their output.
pub(crate) struct WorkChans {
    pub(crate) work_item_tx: mpsc::UnboundedSender<EventList>,
    pub(crate) work_item_rx: mpsc::UnboundedReceiver<EventList>,

    pub(crate) debug_in_tx: Option<mpsc::UnboundedSender<EventList>>,
    pub(crate) debug_in_rx: Option<mpsc::UnboundedReceiver<EventList>>,
    pub(crate) debug_out_tx: Option<mpsc::Sender<EventList>>,
    pub(crate) debug_out_rx: Option<mpsc::Receiver<EventList>>,

    pub(crate) module_txs: HashMap<ModuleId, mpsc::Sender<EventList>>,
    pub(crate) module_rxs: HashMap<ModuleId, mpsc::Receiver<EventList>>,
}

impl WorkChans {
    /// Allocate channels for the given module IDs.
    ///
    /// The debug pair is only created when `debug` is set.
    pub(crate) fn new<'a>(module_ids: impl Iterator<Item = &'a ModuleId>, debug: bool) -> Self {
        let (work_item_tx, work_item_rx) = mpsc::unbounded_channel();

        let mut module_txs = HashMap::new();
        let mut module_rxs = HashMap::new();
        for id in module_ids {
            let (tx, rx) = mpsc::channel(MODULE_CHANNEL_CAPACITY);
            module_txs.insert(id.clone(), tx);
            module_rxs.insert(id.clone(), rx);
        }

        let (debug_in_tx, debug_in_rx, debug_out_tx, debug_out_rx) = if debug {
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            let (out_tx, out_rx) = mpsc::channel(DEBUG_OUT_CAPACITY);
            (Some(in_tx), Some(in_rx), Some(out_tx), Some(out_rx))
        } else {
            (None, None, None, None)
        };

        Self {
            work_item_tx,
            work_item_rx,
            debug_in_tx,
            debug_in_rx,
            debug_out_tx,
            debug_out_rx,
            module_txs,
            module_rxs,
        }
    }
}
