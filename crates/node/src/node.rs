//! Node construction and lifecycle.

use latticebft_events::EventList;
use latticebft_modules::{Module, Modules};
use latticebft_types::ModuleId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::chans::WorkChans;
use crate::config::{DebugMode, NodeConfig};
use crate::dispatch::Dispatcher;
use crate::error::NodeError;
use crate::interceptor::Interceptor;
use crate::notifier::ErrorNotifier;
use crate::workers::{forward_module_output, worker_loop, WorkerContext};

/// A LatticeBFT node: hosts registered modules and routes events between
/// them until cancelled or until the first fatal error.
///
/// Construct with [`Node::new`], drive with [`Node::run`], feed with
/// [`Node::submit`] (or [`Node::step`] for debug injection), and stop with
/// [`Node::stop`] or the cancellation token passed to `run`. A node runs at
/// most once.
pub struct Node {
    work_item_tx: mpsc::UnboundedSender<EventList>,
    debug_in_tx: Option<mpsc::UnboundedSender<EventList>>,
    debug_out_rx: Mutex<Option<mpsc::Receiver<EventList>>>,
    stop_token: CancellationToken,
    notifier: Arc<ErrorNotifier>,
    runtime: Mutex<Option<Runtime>>,
    terminated: AtomicBool,
}

/// State handed to the task fleet when `run` starts.
struct Runtime {
    modules: Vec<(ModuleId, Module)>,
    module_txs: HashMap<ModuleId, mpsc::Sender<EventList>>,
    module_rxs: HashMap<ModuleId, mpsc::Receiver<EventList>>,
    work_item_rx: mpsc::UnboundedReceiver<EventList>,
    debug_in_rx: Option<mpsc::UnboundedReceiver<EventList>>,
    debug_out_tx: Option<mpsc::Sender<EventList>>,
    interceptor: Option<Arc<dyn Interceptor>>,
    debug_mode: DebugMode,
    initial_events: Option<EventList>,
}

impl Node {
    /// Create a node hosting `modules`.
    ///
    /// The module set is immutable from here on; duplicates were already
    /// rejected when it was assembled.
    pub fn new(modules: Modules, config: NodeConfig) -> Self {
        let chans = WorkChans::new(modules.ids(), config.debug != DebugMode::Off);

        let runtime = Runtime {
            modules: modules.into_iter().collect(),
            module_txs: chans.module_txs,
            module_rxs: chans.module_rxs,
            work_item_rx: chans.work_item_rx,
            debug_in_rx: chans.debug_in_rx,
            debug_out_tx: chans.debug_out_tx,
            interceptor: config.interceptor,
            debug_mode: config.debug,
            initial_events: config.initial_events,
        };

        Self {
            work_item_tx: chans.work_item_tx,
            debug_in_tx: chans.debug_in_tx,
            debug_out_rx: Mutex::new(chans.debug_out_rx),
            stop_token: CancellationToken::new(),
            notifier: Arc::new(ErrorNotifier::new()),
            runtime: Mutex::new(Some(runtime)),
            terminated: AtomicBool::new(false),
        }
    }

    /// Drive the node until `cancel` fires, [`stop`](Self::stop) is called,
    /// or a fatal error is latched.
    ///
    /// Returns the latched error, or `Ok(())` when the node was stopped
    /// without one. A second invocation fails with
    /// [`NodeError::AlreadyRunning`].
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), NodeError> {
        let runtime = self
            .runtime
            .lock()
            .take()
            .ok_or(NodeError::AlreadyRunning)?;

        let result = self.drive(runtime, cancel).await;

        // From here on submissions fail synchronously.
        self.stop_token.cancel();
        self.terminated.store(true, Ordering::SeqCst);
        result
    }

    /// Ingest externally produced events.
    ///
    /// Fails with [`NodeError::Stopped`] once the node has terminated.
    /// Events submitted before `run` starts are queued and processed first
    /// thing.
    pub fn submit(&self, events: EventList) -> Result<(), NodeError> {
        if self.is_finished() {
            return Err(NodeError::Stopped);
        }
        self.work_item_tx
            .send(events)
            .map_err(|_| NodeError::Stopped)
    }

    /// Inject events through the debug ingress.
    ///
    /// The injected events flow through the same dispatch path as
    /// [`submit`](Self::submit)ted ones. Requires a debug mode; fails with
    /// [`NodeError::DebugDisabled`] otherwise.
    pub fn step(&self, events: EventList) -> Result<(), NodeError> {
        let Some(debug_in_tx) = &self.debug_in_tx else {
            return Err(NodeError::DebugDisabled);
        };
        if self.is_finished() {
            return Err(NodeError::Stopped);
        }
        debug_in_tx.send(events).map_err(|_| NodeError::Stopped)
    }

    /// Take the debug output receiver.
    ///
    /// Returns `Some` exactly once, and only in `Tap` or `Divert` mode. The
    /// caller must drain it; an undrained debug output eventually stalls the
    /// dispatcher.
    pub fn debug_output(&self) -> Option<mpsc::Receiver<EventList>> {
        self.debug_out_rx.lock().take()
    }

    /// Signal cancellation; `run` returns once all tasks have unwound.
    pub fn stop(&self) {
        self.stop_token.cancel();
    }

    fn is_finished(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
            || self.stop_token.is_cancelled()
            || self.notifier.exit_token().is_cancelled()
    }

    async fn drive(&self, runtime: Runtime, cancel: CancellationToken) -> Result<(), NodeError> {
        let Runtime {
            mut modules,
            module_txs,
            mut module_rxs,
            work_item_rx,
            debug_in_rx,
            debug_out_tx,
            interceptor,
            debug_mode,
            initial_events,
        } = runtime;

        info!(modules = modules.len(), debug = ?debug_mode, "node starting");

        // Active modules hand over their output channels before any task
        // runs; a module that cannot is a construction bug.
        let mut active_outputs = Vec::new();
        for (id, module) in &mut modules {
            if let Module::Active(active) = module {
                let Some(output) = active.take_output() else {
                    let err = NodeError::ModuleFailure {
                        module: id.clone(),
                        reason: "active module yielded no output channel".into(),
                    };
                    self.notifier.fail(err.clone());
                    return Err(err);
                };
                active_outputs.push((id.clone(), output));
            }
        }

        let tracker = TaskTracker::new();
        let run_token = self.stop_token.clone();
        let exit_token = self.notifier.exit_token().clone();

        // Fold the caller's token into the node's own stop token.
        {
            let external = cancel;
            let stop = run_token.clone();
            tracker.spawn(async move {
                tokio::select! {
                    _ = external.cancelled() => stop.cancel(),
                    _ = stop.cancelled() => {}
                }
            });
        }

        // One worker per registered module.
        for (id, module) in modules {
            let inbound = module_rxs
                .remove(&id)
                .expect("an inbound channel exists for every registered module");
            let ctx = WorkerContext {
                module_id: id.clone(),
                work_item_tx: self.work_item_tx.clone(),
                interceptor: interceptor.clone(),
                cancel: run_token.clone(),
                exit: exit_token.clone(),
            };
            self.spawn_unit(
                &tracker,
                format!("worker:{id}"),
                worker_loop(module, inbound, ctx),
            );
        }

        // One forwarder per active module's output channel.
        for (id, output) in active_outputs {
            self.spawn_unit(
                &tracker,
                format!("output:{id}"),
                forward_module_output(
                    id,
                    output,
                    self.work_item_tx.clone(),
                    run_token.clone(),
                    exit_token.clone(),
                ),
            );
        }

        let dispatcher = Dispatcher {
            work_item_rx,
            debug_in_rx,
            debug_out_tx,
            module_txs,
            debug_mode,
            cancel: run_token.clone(),
            exit: exit_token.clone(),
        };
        self.spawn_unit(&tracker, "dispatcher".to_owned(), dispatcher.run());

        if let Some(events) = initial_events {
            if !events.is_empty() && self.work_item_tx.send(events).is_err() {
                debug!("dispatcher gone before initial events were queued");
            }
        }

        // Wait for either termination signal, then unwind everything.
        tokio::select! {
            _ = run_token.cancelled() => info!("node stopping: cancelled"),
            _ = exit_token.cancelled() => info!("node stopping: failure latched"),
        }

        run_token.cancel();
        tracker.close();
        tracker.wait().await;

        match self.notifier.error() {
            Some(err) => {
                error!(error = %err, "node terminated with error");
                Err(err)
            }
            None => {
                info!("node terminated");
                Ok(())
            }
        }
    }

    /// Spawn a supervised task: benign exits are logged, anything else is
    /// latched in the error notifier.
    fn spawn_unit(
        &self,
        tracker: &TaskTracker,
        name: String,
        task: impl Future<Output = Result<(), NodeError>> + Send + 'static,
    ) {
        let notifier = Arc::clone(&self.notifier);
        tracker.spawn(async move {
            match task.await {
                Ok(()) => debug!(task = %name, "task completed"),
                Err(NodeError::Stopped) => debug!(task = %name, "task stopped"),
                Err(err) => {
                    error!(task = %name, error = %err, "task failed");
                    notifier.fail(err);
                }
            }
        });
    }
}
