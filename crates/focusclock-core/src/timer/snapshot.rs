use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::TimerPhase;

/// Read-only view of the engine, rebuilt after every change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: TimerPhase,
    pub selected_id: String,
    pub selected_name: String,
    pub duration_secs: u64,
    pub remaining_secs: u64,
    /// `MM:SS`, minutes not wrapped at the hour.
    pub formatted_time: String,
    pub progress_percent: f64,
    pub is_running: bool,
    pub is_completed: bool,
    pub session_count: u64,
    pub is_visible: bool,
    pub is_wake_lock_active: bool,
    pub is_wake_lock_supported: bool,
    pub was_paused_by_system: bool,
    pub at: DateTime<Utc>,
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_pads_and_keeps_hours_as_minutes() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(5), "00:05");
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(60 * 60 + 1), "60:01");
    }
}
