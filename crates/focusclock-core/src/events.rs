use serde::{Deserialize, Serialize};

/// Every state change of the engine produces an Event.
/// The host renders from snapshots and reacts to events (alert sound,
/// haptic hint, logging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        timer_id: String,
        remaining_secs: u64,
    },
    TimerPaused {
        remaining_secs: u64,
    },
    /// Stopped because the host surface was hidden.
    TimerAutoPaused {
        remaining_secs: u64,
    },
    TimerReset {
        timer_id: String,
        duration_secs: u64,
    },
    TimerSelected {
        timer_id: String,
        duration_secs: u64,
    },
    /// Fired exactly once per completion.
    TimerCompleted {
        timer_id: String,
        /// Whether the completion was added to the session tally.
        counted: bool,
        session_count: u64,
    },
    CompletionDismissed,
    /// Running inside the final seconds; one per tick in that window.
    NearZero {
        remaining_secs: u64,
    },
    WakeLockAcquired,
    WakeLockReleased,
    /// The environment revoked the wake lock on its own.
    WakeLockLost,
}

impl Event {
    /// Short machine-friendly name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerAutoPaused { .. } => "timer_auto_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerSelected { .. } => "timer_selected",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::CompletionDismissed => "completion_dismissed",
            Event::NearZero { .. } => "near_zero",
            Event::WakeLockAcquired => "wake_lock_acquired",
            Event::WakeLockReleased => "wake_lock_released",
            Event::WakeLockLost => "wake_lock_lost",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serialized_tag() {
        let events = [
            Event::TimerStarted {
                timer_id: "work".into(),
                remaining_secs: 10,
            },
            Event::TimerAutoPaused { remaining_secs: 3 },
            Event::TimerCompleted {
                timer_id: "work".into(),
                counted: true,
                session_count: 1,
            },
            Event::CompletionDismissed,
            Event::WakeLockLost,
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }
}
