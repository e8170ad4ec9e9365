//! Exit coordination for long-running subsystems.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Latch flipped once a subsystem is asked to exit.
///
/// `request` is idempotent and never blocks, so any task may call it any
/// number of times. Every call is counted for diagnostics.
#[derive(Debug, Clone)]
pub struct ExitLatch {
    tx: Arc<watch::Sender<bool>>,
    requests: Arc<AtomicUsize>,
}

impl ExitLatch {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Request exit.
    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(true);
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of times `request` has been called.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Resolve once exit has been requested.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|requested| *requested).await;
    }
}

impl Default for ExitLatch {
    fn default() -> Self {
        Self::new()
    }
}
