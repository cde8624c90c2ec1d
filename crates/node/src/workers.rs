//! Per-module worker tasks.

use latticebft_events::EventList;
use latticebft_modules::{Module, PassiveModule};
use latticebft_types::ModuleId;
use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::NodeError;
use crate::interceptor::Interceptor;

/// Everything a worker needs besides its module and inbound channel.
pub(crate) struct WorkerContext {
    pub(crate) module_id: ModuleId,
    pub(crate) work_item_tx: mpsc::UnboundedSender<EventList>,
    pub(crate) interceptor: Option<Arc<dyn Interceptor>>,
    pub(crate) cancel: CancellationToken,
    pub(crate) exit: CancellationToken,
}

/// The processing cycle of one module.
///
/// Repeatedly: read a list from the inbound channel, strip follow-ups,
/// intercept, execute the module, and re-inject the outbound list. Returns
/// `Stopped` on cancellation, exit signal or channel closure; any other
/// error is fatal and is latched by the caller.
pub(crate) async fn worker_loop(
    mut module: Module,
    mut inbound: mpsc::Receiver<EventList>,
    ctx: WorkerContext,
) -> Result<(), NodeError> {
    debug!(module = %ctx.module_id, "worker starting");

    loop {
        let events_in = tokio::select! {
            biased;

            _ = ctx.cancel.cancelled() => return Err(NodeError::Stopped),
            _ = ctx.exit.cancelled() => return Err(NodeError::Stopped),

            maybe = inbound.recv() => match maybe {
                Some(list) => list,
                None => return Err(NodeError::Stopped),
            },
        };

        // Detach follow-ups; they re-enter the loop only after the plain
        // events of this step have been processed.
        let (plain, mut events_out) = events_in.strip_follow_ups();

        if let Some(interceptor) = &ctx.interceptor {
            interceptor.intercept(&plain);
        }

        match &mut module {
            Module::Passive(passive) => {
                // Apply synchronously and add the produced events to the
                // output, behind the pending follow-ups.
                let produced = apply_passive(&ctx.module_id, passive.as_mut(), plain)?;
                events_out.push_back_list(produced);
            }
            Module::Active(active) => {
                // Submit only; results arrive later over the module's own
                // output channel. Not wrapped in a panic guard: active
                // modules own their failure domain.
                active
                    .apply_events(&ctx.cancel, plain)
                    .await
                    .map_err(|err| NodeError::ModuleFailure {
                        module: ctx.module_id.clone(),
                        reason: err.to_string(),
                    })?;
            }
        }

        // Empty lists are dropped; sending them would fan out to nothing.
        if events_out.is_empty() {
            continue;
        }

        if ctx.work_item_tx.send(events_out).is_err() {
            return Err(NodeError::Stopped);
        }
    }
}

/// Invoke a passive module, converting panics into errors.
///
/// Passive modules run inside the worker's own execution context, so an
/// unguarded panic would take the worker down without latching anything.
fn apply_passive(
    module_id: &ModuleId,
    module: &mut dyn PassiveModule,
    events: EventList,
) -> Result<EventList, NodeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| module.apply_events(events))) {
        Ok(Ok(produced)) => Ok(produced),
        Ok(Err(err)) => Err(NodeError::ModuleFailure {
            module: module_id.clone(),
            reason: err.to_string(),
        }),
        Err(payload) => Err(NodeError::ModulePanic {
            module: module_id.clone(),
            message: panic_message(payload.as_ref()),
            backtrace: Backtrace::force_capture().to_string(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}

/// Forward an active module's asynchronously produced events into the loop.
///
/// Ends cleanly when the module drops its output sender (its termination
/// signal), with `Stopped` on cancellation or exit.
pub(crate) async fn forward_module_output(
    module_id: ModuleId,
    mut output: mpsc::Receiver<EventList>,
    work_item_tx: mpsc::UnboundedSender<EventList>,
    cancel: CancellationToken,
    exit: CancellationToken,
) -> Result<(), NodeError> {
    loop {
        let list = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(NodeError::Stopped),
            _ = exit.cancelled() => return Err(NodeError::Stopped),

            maybe = output.recv() => match maybe {
                Some(list) => list,
                None => {
                    debug!(module = %module_id, "active module output closed");
                    return Ok(());
                }
            },
        };

        if list.is_empty() {
            continue;
        }

        if work_item_tx.send(list).is_err() {
            return Err(NodeError::Stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latticebft_events::factory;
    use latticebft_modules::ModuleError;

    struct Panicking;

    impl PassiveModule for Panicking {
        fn apply_events(&mut self, _events: EventList) -> Result<EventList, ModuleError> {
            panic!("kapow");
        }
    }

    #[test]
    fn test_apply_passive_converts_panics() {
        let id = ModuleId::from("boom");
        let mut module = Panicking;

        let err = apply_passive(
            &id,
            &mut module,
            EventList::of(factory::testing_uint("boom", 1)),
        )
        .expect_err("panic must surface as an error");

        match err {
            NodeError::ModulePanic {
                module,
                message,
                backtrace,
            } => {
                assert_eq!(module, id);
                assert!(message.contains("kapow"));
                assert!(!backtrace.is_empty());
            }
            other => panic!("expected ModulePanic, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_passive_passes_module_errors_through() {
        struct Failing;

        impl PassiveModule for Failing {
            fn apply_events(&mut self, _events: EventList) -> Result<EventList, ModuleError> {
                Err(ModuleError::Other(anyhow::anyhow!("storage offline")))
            }
        }

        let id = ModuleId::from("db");
        let err = apply_passive(
            &id,
            &mut Failing,
            EventList::of(factory::testing_uint("db", 1)),
        )
        .expect_err("module error must surface");

        match err {
            NodeError::ModuleFailure { module, reason } => {
                assert_eq!(module, id);
                assert!(reason.contains("storage offline"));
            }
            other => panic!("expected ModuleFailure, got {other:?}"),
        }
    }
}
