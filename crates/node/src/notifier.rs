//! Single-shot failure latch.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::NodeError;

/// The rendezvous point for node termination.
///
/// Holds at most one error. The first [`fail`](Self::fail) latches its error
/// and cancels the exit token; later calls are no-ops. Every task multi-ways
/// its blocking operations with the exit token, so one failing task unwinds
/// the whole node.
pub(crate) struct ErrorNotifier {
    error: Mutex<Option<NodeError>>,
    exit: CancellationToken,
}

impl ErrorNotifier {
    pub(crate) fn new() -> Self {
        Self {
            error: Mutex::new(None),
            exit: CancellationToken::new(),
        }
    }

    /// Latch `err` if nothing is latched yet and signal the exit token.
    pub(crate) fn fail(&self, err: NodeError) {
        let mut slot = self.error.lock();
        if slot.is_some() {
            debug!(error = %err, "error notifier already latched, dropping");
            return;
        }
        *slot = Some(err);
        drop(slot);
        self.exit.cancel();
    }

    /// The latched error, if any.
    pub(crate) fn error(&self) -> Option<NodeError> {
        self.error.lock().clone()
    }

    /// Token that becomes cancelled when an error is latched.
    pub(crate) fn exit_token(&self) -> &CancellationToken {
        &self.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latticebft_types::ModuleId;

    #[test]
    fn test_fail_is_idempotent() {
        let notifier = ErrorNotifier::new();

        let first = NodeError::UnknownDestination {
            destination: ModuleId::from("ghost"),
        };
        let second = NodeError::ModuleFailure {
            module: ModuleId::from("echo"),
            reason: "late".into(),
        };

        notifier.fail(first.clone());
        assert!(notifier.exit_token().is_cancelled());

        notifier.fail(second);
        assert_eq!(notifier.error(), Some(first));
        assert!(notifier.exit_token().is_cancelled());
    }

    #[test]
    fn test_unlatched_notifier_is_quiet() {
        let notifier = ErrorNotifier::new();
        assert!(notifier.error().is_none());
        assert!(!notifier.exit_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_exit_signal_wakes_waiters() {
        let notifier = std::sync::Arc::new(ErrorNotifier::new());

        let waiter = {
            let notifier = notifier.clone();
            tokio::spawn(async move {
                notifier.exit_token().cancelled().await;
            })
        };

        notifier.fail(NodeError::ModuleFailure {
            module: ModuleId::from("echo"),
            reason: "boom".into(),
        });
        waiter.await.expect("waiter joins");
    }
}
