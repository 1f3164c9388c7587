//! Terminal presentation of engine snapshots and events.

use std::io::Write;
use std::time::Duration;

use focusclock_core::{Event, Snapshot, TimerPhase};

const BAR_WIDTH: usize = 20;
const BELL_REPEATS: usize = 3;
const BELL_GAP: Duration = Duration::from_millis(600);

pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn status_line(snap: &Snapshot) -> String {
    let phase = match snap.phase {
        TimerPhase::Idle if snap.was_paused_by_system => "paused by system",
        TimerPhase::Idle => "idle",
        TimerPhase::Running => "running",
        TimerPhase::Completed => "completed",
    };
    let wake_lock = if !snap.is_wake_lock_supported {
        "n/a"
    } else if snap.is_wake_lock_active {
        "on"
    } else {
        "off"
    };
    format!(
        "[{}] {} [{}] {:>3.0}% {} | sessions: {} | wake lock: {}",
        snap.selected_name,
        snap.formatted_time,
        progress_bar(snap.progress_percent),
        snap.progress_percent,
        phase,
        snap.session_count,
        wake_lock
    )
}

/// One-line user-facing message for notable events.
pub fn event_message(event: &Event) -> Option<String> {
    match event {
        Event::TimerCompleted {
            counted: true,
            session_count,
            ..
        } => Some(format!("Time's up! Focus session #{session_count} done.")),
        Event::TimerCompleted { .. } => Some("Time's up!".to_string()),
        Event::TimerAutoPaused { .. } => {
            Some("Paused because the session was hidden. Type 'start' to continue.".to_string())
        }
        Event::WakeLockLost => Some("The system released the wake lock.".to_string()),
        _ => None,
    }
}

/// Countdown marker for the final seconds, shown only with the alert on.
pub fn near_zero_marker(remaining_secs: u64) -> String {
    format!("  ... {remaining_secs}")
}

/// Tick updates only get a line on whole minutes and in the last seconds.
pub fn tick_worth_printing(snap: &Snapshot) -> bool {
    snap.remaining_secs % 60 == 0 || snap.remaining_secs <= 10
}

pub struct Renderer {
    alert_bell: bool,
}

impl Renderer {
    pub fn new(alert_bell: bool) -> Self {
        Self { alert_bell }
    }

    pub fn status(&self, snap: &Snapshot) {
        println!("{}", status_line(snap));
    }

    /// Lines to print for `events`, in order.
    pub fn lines(&self, events: &[Event]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::NearZero { remaining_secs } if self.alert_bell => {
                    Some(near_zero_marker(*remaining_secs))
                }
                other => event_message(other),
            })
            .collect()
    }

    pub fn events(&self, events: &[Event]) {
        for line in self.lines(events) {
            println!("{line}");
        }
        if !self.alert_bell {
            return;
        }
        if events.iter().any(|e| matches!(e, Event::TimerCompleted { .. })) {
            ring_bell();
        } else if events.iter().any(|e| matches!(e, Event::NearZero { .. })) {
            tap_bell();
        }
    }
}

/// A single short bell for the last seconds of a countdown.
fn tap_bell() {
    print!("\x07");
    let _ = std::io::stdout().flush();
}

/// Ring the terminal bell a few times without blocking the session loop.
fn ring_bell() {
    tokio::spawn(async {
        for i in 0..BELL_REPEATS {
            if i > 0 {
                tokio::time::sleep(BELL_GAP).await;
            }
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
    });
}
