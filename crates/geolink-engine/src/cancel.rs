//! Cooperative cancellation.
//!
//! The host holds a [`CancelHandle`]; the engine holds [`CancelToken`]
//! clones. Cancellation is observed as a *value*, never an error: a timed
//! wait reports [`WaitOutcome::Cancelled`] and the state machine decides
//! what that means in context (skip the action vs. a cancelled-classed
//! failure).

use std::time::Duration;

use tokio::sync::watch;

/// Create a connected handle/token pair.
#[must_use]
pub fn cancellation() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Host-side trigger.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Engine-side observer.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Result of a cancellable timed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    Cancelled,
}

impl CancelToken {
    /// A token that can never fire; the default when a host does not wire
    /// up cancellation.
    #[must_use]
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the sender alive forever so the channel never closes.
        std::mem::forget(tx);
        CancelToken { rx }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancellation fires. If the handle is dropped without
    /// cancelling, this pends forever.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Sleep for `duration` unless cancelled first.
    pub async fn delay(&self, duration: Duration) -> WaitOutcome {
        tokio::select! {
            () = tokio::time::sleep(duration) => WaitOutcome::Completed,
            () = self.cancelled() => WaitOutcome::Cancelled,
        }
    }
}
