//! In-memory test doubles.

use std::sync::{Arc, Mutex};

use crate::error::WakeLockError;
use crate::wake_lock::{WakeLockBackend, WakeLockSentinel};

#[derive(Debug, Default)]
struct FakeState {
    held: bool,
    /// Bumped on every acquisition so stale sentinels can tell they were replaced.
    generation: u64,
    revoked: bool,
    acquire_count: usize,
    release_count: usize,
    rejections_left: usize,
}

/// Scriptable wake-lock backend.
///
/// Keep a [`FakeWakeLockProbe`] (from [`probe`](Self::probe)) to inspect the
/// lock and to revoke it from the "environment" side.
pub struct FakeWakeLock {
    supported: bool,
    state: Arc<Mutex<FakeState>>,
}

impl FakeWakeLock {
    pub fn supported() -> Self {
        Self {
            supported: true,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn probe(&self) -> FakeWakeLockProbe {
        FakeWakeLockProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl WakeLockBackend for FakeWakeLock {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn acquire(&mut self) -> Result<Box<dyn WakeLockSentinel>, WakeLockError> {
        let mut state = self.state.lock().unwrap();
        if state.rejections_left > 0 {
            state.rejections_left -= 1;
            return Err(WakeLockError::Rejected("scripted rejection".into()));
        }
        state.held = true;
        state.revoked = false;
        state.generation += 1;
        state.acquire_count += 1;
        Ok(Box::new(FakeSentinel {
            generation: state.generation,
            state: Arc::clone(&self.state),
            released: false,
        }))
    }
}

struct FakeSentinel {
    generation: u64,
    state: Arc<Mutex<FakeState>>,
    released: bool,
}

impl WakeLockSentinel for FakeSentinel {
    fn is_released(&mut self) -> bool {
        if self.released {
            return true;
        }
        let state = self.state.lock().unwrap();
        state.generation != self.generation || state.revoked
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut state = self.state.lock().unwrap();
        if state.generation == self.generation && state.held {
            state.held = false;
            state.release_count += 1;
        }
    }
}

impl Drop for FakeSentinel {
    fn drop(&mut self) {
        self.release();
    }
}

/// Observer/driver side of a [`FakeWakeLock`].
#[derive(Clone)]
pub struct FakeWakeLockProbe {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWakeLockProbe {
    pub fn is_held(&self) -> bool {
        self.state.lock().unwrap().held
    }

    pub fn acquire_count(&self) -> usize {
        self.state.lock().unwrap().acquire_count
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().unwrap().release_count
    }

    /// Make the next `n` acquisitions fail.
    pub fn reject_next(&self, n: usize) {
        self.state.lock().unwrap().rejections_left = n;
    }

    /// Simulate the environment taking the lock away.
    pub fn revoke(&self) {
        let mut state = self.state.lock().unwrap();
        state.held = false;
        state.revoked = true;
    }
}
