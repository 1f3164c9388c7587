//! Screen/idle wake lock.
//!
//! The controller owns at most one held lock and is the only thing that
//! touches it. Backends plug in through [`WakeLockBackend`]; an environment
//! without wake-lock support is a normal outcome, reported through
//! `is_supported()` and never as an error.

mod inhibit;

pub use inhibit::InhibitBackend;

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::WakeLockError;

/// A platform capability able to keep the display (or the machine) awake.
pub trait WakeLockBackend: Send {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Whether this environment can hold a wake lock at all.
    /// Queried once, when the controller is built.
    fn is_supported(&self) -> bool;

    /// Acquire a new lock. Only called when supported and nothing is held.
    fn acquire(&mut self) -> Result<Box<dyn WakeLockSentinel>, WakeLockError>;
}

/// A held wake lock. Dropping a sentinel must release it.
pub trait WakeLockSentinel: Send {
    /// True once the environment has released the lock on its own.
    fn is_released(&mut self) -> bool;

    /// Give the lock back. Idempotent.
    fn release(&mut self);
}

/// Backend for environments without wake-lock support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedBackend;

impl WakeLockBackend for UnsupportedBackend {
    fn name(&self) -> &str {
        "unsupported"
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn acquire(&mut self) -> Result<Box<dyn WakeLockSentinel>, WakeLockError> {
        Err(WakeLockError::Rejected("wake lock not supported".into()))
    }
}

/// A lock lost sooner than this after being acquired counts as a quick loss.
const QUICK_LOSS_WINDOW: Duration = Duration::from_secs(5);
/// Consecutive quick losses after which the controller stops requesting.
const MAX_QUICK_LOSSES: u32 = 3;

/// Requests and releases the wake lock on behalf of the engine.
///
/// `is_active()` is a cached view of the real resource; it catches up with
/// involuntary releases on the next [`refresh`](Self::refresh). A backend
/// whose locks keep vanishing right after acquisition is given up on until
/// the controller is rebuilt.
pub struct WakeLockController {
    backend: Box<dyn WakeLockBackend>,
    supported: bool,
    sentinel: Option<Box<dyn WakeLockSentinel>>,
    acquired_at: Option<Instant>,
    quick_losses: u32,
    gave_up: bool,
}

impl WakeLockController {
    pub fn new(backend: impl WakeLockBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn WakeLockBackend>) -> Self {
        let supported = backend.is_supported();
        debug!(backend = backend.name(), supported, "wake lock controller ready");
        Self {
            backend,
            supported,
            sentinel: None,
            acquired_at: None,
            quick_losses: 0,
            gave_up: false,
        }
    }

    pub fn unsupported() -> Self {
        Self::new(UnsupportedBackend)
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_active(&self) -> bool {
        self.sentinel.is_some()
    }

    /// True once repeated quick losses made the controller stop requesting.
    pub fn has_given_up(&self) -> bool {
        self.gave_up
    }

    /// Acquire the lock if supported and not already held.
    ///
    /// Returns whether a lock is held afterwards. A rejected request is
    /// logged and leaves the controller inactive.
    pub fn request(&mut self) -> bool {
        if !self.supported || self.gave_up {
            return false;
        }
        if self.sentinel.is_some() {
            return true;
        }
        match self.backend.acquire() {
            Ok(sentinel) => {
                debug!(backend = self.backend.name(), "wake lock acquired");
                self.sentinel = Some(sentinel);
                self.acquired_at = Some(Instant::now());
                true
            }
            Err(e) => {
                warn!(backend = self.backend.name(), "Wake lock request failed: {}", e);
                false
            }
        }
    }

    /// Release the lock if held. Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        match self.sentinel.take() {
            Some(mut sentinel) => {
                sentinel.release();
                self.acquired_at = None;
                debug!(backend = self.backend.name(), "wake lock released");
                true
            }
            None => false,
        }
    }

    /// Detect a release performed by the environment.
    ///
    /// Returns true when a held lock turned out to be gone.
    pub fn refresh(&mut self) -> bool {
        let lost = self
            .sentinel
            .as_mut()
            .map(|s| s.is_released())
            .unwrap_or(false);
        if lost {
            self.sentinel = None;
            debug!(backend = self.backend.name(), "wake lock released by the environment");
            let quick = self
                .acquired_at
                .take()
                .is_some_and(|at| at.elapsed() < QUICK_LOSS_WINDOW);
            self.quick_losses = if quick { self.quick_losses + 1 } else { 0 };
            if self.quick_losses >= MAX_QUICK_LOSSES {
                self.gave_up = true;
                warn!(
                    backend = self.backend.name(),
                    losses = self.quick_losses,
                    "Wake lock keeps being released right away, no longer requesting it"
                );
            }
        }
        lost
    }
}

impl Drop for WakeLockController {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for WakeLockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WakeLockController")
            .field("backend", &self.backend.name())
            .field("supported", &self.supported)
            .field("active", &self.is_active())
            .field("gave_up", &self.gave_up)
            .finish()
    }
}
