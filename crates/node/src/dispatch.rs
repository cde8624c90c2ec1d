//! The routing loop.

use latticebft_events::EventList;
use latticebft_types::ModuleId;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::DebugMode;
use crate::error::NodeError;

/// The central routing loop.
///
/// Pulls event lists off the shared work-item queue (and, when debugging is
/// enabled, off `debug_in`), partitions each list by destination module with
/// a stable split, and forwards every partition to the destination module's
/// inbound channel. Payloads are never inspected beyond the destination
/// field.
pub(crate) struct Dispatcher {
    pub(crate) work_item_rx: mpsc::UnboundedReceiver<EventList>,
    pub(crate) debug_in_rx: Option<mpsc::UnboundedReceiver<EventList>>,
    pub(crate) debug_out_tx: Option<mpsc::Sender<EventList>>,
    pub(crate) module_txs: HashMap<ModuleId, mpsc::Sender<EventList>>,
    pub(crate) debug_mode: DebugMode,
    pub(crate) cancel: CancellationToken,
    pub(crate) exit: CancellationToken,
}

impl Dispatcher {
    pub(crate) async fn run(mut self) -> Result<(), NodeError> {
        debug!(modules = self.module_txs.len(), "dispatcher starting");

        loop {
            let debug_in_rx = &mut self.debug_in_rx;
            let debug_recv = async {
                match debug_in_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            };

            let list = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return Err(NodeError::Stopped),
                _ = self.exit.cancelled() => return Err(NodeError::Stopped),

                maybe = self.work_item_rx.recv() => match maybe {
                    Some(list) => list,
                    None => return Err(NodeError::Stopped),
                },

                maybe = debug_recv => match maybe {
                    Some(list) => list,
                    None => return Err(NodeError::Stopped),
                },
            };

            self.route(list).await?;
        }
    }

    /// Partition one input list by destination and forward each partition.
    async fn route(&self, list: EventList) -> Result<(), NodeError> {
        // An empty list fans out to nothing.
        if list.is_empty() {
            return Ok(());
        }

        trace!(events = list.len(), "routing event list");

        // Stable split: partitions are forwarded in the order their
        // destinations first appear in the input, and events keep their
        // relative order within each partition.
        let mut order: Vec<ModuleId> = Vec::new();
        let mut partitions: HashMap<ModuleId, EventList> = HashMap::new();
        for event in list {
            match partitions.get_mut(&event.dest) {
                Some(partition) => partition.push_back(event),
                None => {
                    let dest = event.dest.clone();
                    order.push(dest.clone());
                    partitions.insert(dest, EventList::of(event));
                }
            }
        }

        for dest in order {
            let Some(partition) = partitions.remove(&dest) else {
                continue;
            };

            match self.debug_mode {
                DebugMode::Off => {
                    self.send_to_module(&dest, partition).await?;
                }
                DebugMode::Tap => {
                    self.send_debug(partition.clone()).await?;
                    self.send_to_module(&dest, partition).await?;
                }
                DebugMode::Divert => {
                    // Observed on the debug output and dropped; the events
                    // never reach a module. The destination must still
                    // resolve to a registered module.
                    if !self.module_txs.contains_key(&dest) {
                        return Err(NodeError::UnknownDestination { destination: dest });
                    }
                    self.send_debug(partition).await?;
                }
            }
        }

        Ok(())
    }

    async fn send_to_module(&self, dest: &ModuleId, events: EventList) -> Result<(), NodeError> {
        let sender =
            self.module_txs
                .get(dest)
                .ok_or_else(|| NodeError::UnknownDestination {
                    destination: dest.clone(),
                })?;

        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(NodeError::Stopped),
            _ = self.exit.cancelled() => Err(NodeError::Stopped),
            result = sender.send(events) => result.map_err(|_| NodeError::Stopped),
        }
    }

    async fn send_debug(&self, events: EventList) -> Result<(), NodeError> {
        let Some(sender) = &self.debug_out_tx else {
            return Ok(());
        };

        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(NodeError::Stopped),
            _ = self.exit.cancelled() => Err(NodeError::Stopped),
            result = sender.send(events) => {
                // A dropped debug consumer disconnects the tap; the events
                // it would have seen are discarded.
                if result.is_err() {
                    debug!("debug output closed, discarding");
                }
                Ok(())
            }
        }
    }
}
