//! Host-surface visibility signal.
//!
//! Latest value only: rapid hide/show sequences may be coalesced, and a
//! waiter only ever sees the most recent value.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Read side, held by whoever drives the engine.
#[derive(Debug, Clone)]
pub struct VisibilityMonitor {
    rx: watch::Receiver<bool>,
}

/// Write side, held by the host environment.
#[derive(Debug, Clone)]
pub struct VisibilityReporter {
    tx: Arc<watch::Sender<bool>>,
}

impl VisibilityMonitor {
    pub fn new(initially_visible: bool) -> (Self, VisibilityReporter) {
        let (tx, rx) = watch::channel(initially_visible);
        (Self { rx }, VisibilityReporter { tx: Arc::new(tx) })
    }

    pub fn is_visible(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next change and return the latest value.
    ///
    /// Returns `None` once every reporter is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl VisibilityReporter {
    /// Publish the current visibility. Unchanged values do not wake waiters.
    pub fn set_visible(&self, visible: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
        if changed {
            debug!(visible, "visibility changed");
        }
    }
}
