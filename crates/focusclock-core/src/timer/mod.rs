mod definition;
mod engine;
mod snapshot;
mod state;

pub use definition::{builtin_timers, TimerDefinition, TimerList, WORK_TIMER_ID};
pub use engine::TimerEngine;
pub use snapshot::{format_time, Snapshot};
pub use state::{EngineState, Input, TimerPhase, NEAR_ZERO_SECS};
