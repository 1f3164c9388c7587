//! # focusclock Core Library
//!
//! This library provides the core logic for the focusclock countdown timer.
//! The CLI binary is a thin host over the same library: it owns the clock,
//! the terminal and the config file, and feeds the engine.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine; the caller feeds one
//!   `tick()` per elapsed second and reports visibility changes
//! - **Visibility**: Latest-value signal telling whether the host surface
//!   is visible
//! - **Wake Lock**: Controller plus pluggable backends that keep the display
//!   awake while a countdown runs
//! - **Storage**: TOML-based timer definitions and preferences
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`WakeLockController`]: Owner of the wake lock
//! - [`VisibilityMonitor`]: Visibility signal
//! - [`Config`]: Persisted timer list and preferences

pub mod error;
pub mod events;
pub mod storage;
pub mod testing;
pub mod timer;
pub mod visibility;
pub mod wake_lock;

pub use error::{ConfigError, CoreError, ValidationError, WakeLockError};
pub use events::Event;
pub use storage::{Config, EngineConfig};
pub use timer::{
    EngineState, Input, Snapshot, TimerDefinition, TimerEngine, TimerList, TimerPhase,
    WORK_TIMER_ID,
};
pub use visibility::{VisibilityMonitor, VisibilityReporter};
pub use wake_lock::{
    InhibitBackend, UnsupportedBackend, WakeLockBackend, WakeLockController, WakeLockSentinel,
};
