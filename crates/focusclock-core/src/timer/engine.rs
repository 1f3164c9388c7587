//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - the caller is responsible for feeding `tick()` once
//! per elapsed second while the countdown runs, and for reporting
//! visibility changes.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Idle | Completed) -> Idle
//! ```
//!
//! The countdown never runs while the surface is hidden: hiding it while
//! running, or starting while hidden, drops back to `Idle` and marks the
//! pause as system-initiated. Nothing resumes automatically.
//!
//! ## Wake lock
//!
//! After every input the engine holds the wake lock exactly when the
//! countdown is running and the surface is visible.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerList::builtin(), WakeLockController::unsupported());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* render, ring, ... */ }
//! ```

use tracing::{debug, info};

use super::definition::{TimerDefinition, TimerList};
use super::snapshot::{format_time, Snapshot};
use super::state::{EngineState, Input, TimerPhase};
use crate::events::Event;
use crate::wake_lock::WakeLockController;

/// Core timer engine.
#[derive(Debug)]
pub struct TimerEngine {
    timers: TimerList,
    state: EngineState,
    wake_lock: WakeLockController,
    is_visible: bool,
}

impl TimerEngine {
    /// Create an idle engine on the first timer, with the surface visible.
    pub fn new(timers: TimerList, wake_lock: WakeLockController) -> Self {
        let state = EngineState::new(&timers);
        Self {
            timers,
            state,
            wake_lock,
            is_visible: true,
        }
    }

    /// Start on `id` instead of the first timer (falls back when unknown).
    pub fn with_selection(mut self, id: &str) -> Self {
        self.state = EngineState::with_selection(&self.timers, id);
        self
    }

    /// Seed the initial visibility before any input is processed.
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn timers(&self) -> &TimerList {
        &self.timers
    }

    pub fn selected(&self) -> &TimerDefinition {
        self.timers.resolve(self.state.selected_id())
    }

    pub fn phase(&self) -> TimerPhase {
        self.state.phase()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.state.remaining_secs()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn is_completed(&self) -> bool {
        self.state.is_completed()
    }

    pub fn session_count(&self) -> u64 {
        self.state.session_count()
    }

    pub fn was_paused_by_system(&self) -> bool {
        self.state.was_paused_by_system()
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_wake_lock_active(&self) -> bool {
        self.wake_lock.is_active()
    }

    pub fn is_wake_lock_supported(&self) -> bool {
        self.wake_lock.is_supported()
    }

    /// 0.0 .. 100.0 progress through the selected timer.
    pub fn progress_percent(&self) -> f64 {
        let total = self.selected().duration_secs;
        if total == 0 {
            return 0.0;
        }
        let elapsed = total - self.remaining_secs().min(total);
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format_time(self.remaining_secs())
    }

    /// Build a full read-only view for the presentation layer.
    pub fn snapshot(&self) -> Snapshot {
        let selected = self.selected();
        Snapshot {
            phase: self.phase(),
            selected_id: selected.id.clone(),
            selected_name: selected.name.clone(),
            duration_secs: selected.duration_secs,
            remaining_secs: self.remaining_secs(),
            formatted_time: self.formatted_time(),
            progress_percent: self.progress_percent(),
            is_running: self.is_running(),
            is_completed: self.is_completed(),
            session_count: self.session_count(),
            is_visible: self.is_visible,
            is_wake_lock_active: self.is_wake_lock_active(),
            is_wake_lock_supported: self.is_wake_lock_supported(),
            was_paused_by_system: self.was_paused_by_system(),
            at: chrono::Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        self.dispatch(Input::Start)
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.dispatch(Input::Pause)
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.dispatch(Input::Reset)
    }

    /// Switch to `id`. Unknown ids are ignored and produce no events.
    pub fn select_timer(&mut self, id: &str) -> Vec<Event> {
        self.dispatch(Input::Select(id.to_string()))
    }

    pub fn dismiss_completion(&mut self) -> Vec<Event> {
        self.dispatch(Input::DismissCompletion)
    }

    /// Call once per elapsed second.
    pub fn tick(&mut self) -> Vec<Event> {
        self.dispatch(Input::Tick)
    }

    pub fn set_visible(&mut self, visible: bool) -> Vec<Event> {
        self.dispatch(Input::VisibilityChanged(visible))
    }

    /// Apply one input, then bring the wake lock in line with the new state.
    pub fn dispatch(&mut self, input: Input) -> Vec<Event> {
        if let Input::VisibilityChanged(visible) = &input {
            self.is_visible = *visible;
        }
        if let Input::Select(id) = &input {
            if !self.timers.contains(id) {
                debug!(timer_id = %id, "ignoring selection of unknown timer");
            }
        }
        if input != Input::Tick {
            debug!(?input, "engine input");
        }

        let mut events = self.state.apply(&self.timers, input);
        if self.state.is_running() && !self.is_visible {
            let paused = self.state.apply(&self.timers, Input::VisibilityChanged(false));
            events.extend(paused);
        }
        self.sync_wake_lock(&mut events);
        log_events(&events);
        events
    }

    /// Replace the timer definitions (e.g. after the user edited them).
    ///
    /// An in-progress countdown is not rescaled; the new duration applies
    /// from the next reset or selection.
    pub fn set_timers(&mut self, timers: TimerList) -> Vec<Event> {
        self.timers = timers;
        let mut events = Vec::new();
        if self.state.reconcile(&self.timers) {
            let selected = self.selected();
            events.push(Event::TimerSelected {
                timer_id: selected.id.clone(),
                duration_secs: selected.duration_secs,
            });
        }
        self.sync_wake_lock(&mut events);
        log_events(&events);
        events
    }

    /// Pick up wake-lock releases done by the environment and re-request
    /// when still appropriate. Hosts call this between inputs.
    pub fn poll_wake_lock(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.sync_wake_lock(&mut events);
        log_events(&events);
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn sync_wake_lock(&mut self, events: &mut Vec<Event>) {
        if self.wake_lock.refresh() {
            events.push(Event::WakeLockLost);
        }
        let wanted = self.state.is_running() && self.is_visible;
        if wanted {
            if !self.wake_lock.is_active() && self.wake_lock.request() {
                events.push(Event::WakeLockAcquired);
            }
        } else if self.wake_lock.release() {
            events.push(Event::WakeLockReleased);
        }
    }
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::TimerCompleted {
                timer_id,
                counted,
                session_count,
            } => info!(timer_id = %timer_id, counted, session_count, "timer completed"),
            Event::TimerAutoPaused { remaining_secs } => {
                info!(remaining_secs, "surface hidden, countdown paused")
            }
            other => debug!(event = other.kind(), "engine event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWakeLock;
    use crate::timer::definition::TimerDefinition;

    fn list() -> TimerList {
        TimerList::new(vec![
            TimerDefinition::new("work", "Focus", 120),
            TimerDefinition::new("shortBreak", "Short Break", 60),
        ])
        .unwrap()
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(list(), WakeLockController::unsupported());
        assert_eq!(engine.phase(), TimerPhase::Idle);

        assert!(!engine.start().is_empty());
        assert_eq!(engine.phase(), TimerPhase::Running);

        assert!(!engine.pause().is_empty());
        assert_eq!(engine.phase(), TimerPhase::Idle);

        assert!(!engine.start().is_empty());
        assert_eq!(engine.phase(), TimerPhase::Running);
    }

    #[test]
    fn select_unknown_timer_is_noop() {
        let mut engine = TimerEngine::new(list(), WakeLockController::unsupported());
        engine.start();
        engine.tick();
        assert!(engine.select_timer("nope").is_empty());
        assert_eq!(engine.state().selected_id(), "work");
        assert_eq!(engine.remaining_secs(), 119);
        assert!(engine.is_running());
    }

    #[test]
    fn progress_and_formatted_time() {
        let mut engine = TimerEngine::new(list(), WakeLockController::unsupported());
        assert_eq!(engine.progress_percent(), 0.0);
        assert_eq!(engine.formatted_time(), "02:00");
        engine.start();
        for _ in 0..30 {
            engine.tick();
        }
        assert_eq!(engine.progress_percent(), 25.0);
        assert_eq!(engine.formatted_time(), "01:30");
    }

    #[test]
    fn wake_lock_follows_running_and_visibility() {
        let fake = FakeWakeLock::supported();
        let probe = fake.probe();
        let mut engine = TimerEngine::new(list(), WakeLockController::new(fake));

        let events = engine.start();
        assert!(events.contains(&Event::WakeLockAcquired));
        assert!(engine.is_wake_lock_active());

        let events = engine.set_visible(false);
        assert!(events.contains(&Event::WakeLockReleased));
        assert!(!probe.is_held());

        engine.set_visible(true);
        assert!(!engine.is_wake_lock_active());

        engine.start();
        assert!(probe.is_held());
        engine.pause();
        assert!(!probe.is_held());
    }

    #[test]
    fn start_while_hidden_is_paused_by_system() {
        let fake = FakeWakeLock::supported();
        let probe = fake.probe();
        let mut engine =
            TimerEngine::new(list(), WakeLockController::new(fake)).with_visibility(false);

        let events = engine.start();
        assert_eq!(
            events,
            vec![
                Event::TimerStarted {
                    timer_id: "work".into(),
                    remaining_secs: 120,
                },
                Event::TimerAutoPaused { remaining_secs: 120 },
            ]
        );
        assert!(!engine.is_running());
        assert!(engine.was_paused_by_system());
        assert!(!probe.is_held());

        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), 120);
        assert_eq!(probe.acquire_count(), 0);

        engine.set_visible(true);
        engine.start();
        assert!(engine.is_running());
        assert!(probe.is_held());
    }

    #[test]
    fn hide_then_start_never_counts_down() {
        let mut engine = TimerEngine::new(list(), WakeLockController::unsupported());
        engine.set_visible(false);
        for _ in 0..3 {
            engine.start();
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), 120);
        assert_eq!(engine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn revoked_wake_lock_is_requested_again() {
        let fake = FakeWakeLock::supported();
        let probe = fake.probe();
        let mut engine = TimerEngine::new(list(), WakeLockController::new(fake));
        engine.start();

        probe.revoke();
        let events = engine.poll_wake_lock();
        assert_eq!(events, vec![Event::WakeLockLost, Event::WakeLockAcquired]);
        assert!(probe.is_held());
        assert_eq!(probe.acquire_count(), 2);
    }

    #[test]
    fn wake_lock_that_keeps_vanishing_is_abandoned() {
        let fake = FakeWakeLock::supported();
        let probe = fake.probe();
        let mut engine = TimerEngine::new(list(), WakeLockController::new(fake));
        engine.start();

        probe.revoke();
        assert_eq!(engine.poll_wake_lock(), vec![Event::WakeLockLost, Event::WakeLockAcquired]);
        probe.revoke();
        assert_eq!(engine.poll_wake_lock(), vec![Event::WakeLockLost, Event::WakeLockAcquired]);
        probe.revoke();
        assert_eq!(engine.poll_wake_lock(), vec![Event::WakeLockLost]);

        assert!(engine.tick().is_empty());
        assert!(engine.poll_wake_lock().is_empty());
        assert!(!engine.is_wake_lock_active());
        assert_eq!(probe.acquire_count(), 3);
        assert!(engine.is_running());
    }

    #[test]
    fn completion_releases_wake_lock() {
        let fake = FakeWakeLock::supported();
        let probe = fake.probe();
        let mut engine =
            TimerEngine::new(list(), WakeLockController::new(fake)).with_selection("shortBreak");
        engine.start();
        let events: Vec<Event> = (0..60).flat_map(|_| engine.tick()).collect();
        assert!(events.contains(&Event::WakeLockReleased));
        assert!(!probe.is_held());
        assert_eq!(engine.phase(), TimerPhase::Completed);
    }

    #[test]
    fn set_timers_reloads_vanished_selection() {
        let mut engine =
            TimerEngine::new(list(), WakeLockController::unsupported()).with_selection("shortBreak");
        let events = engine.set_timers(TimerList::builtin());
        assert!(events.is_empty());
        assert_eq!(engine.state().selected_id(), "shortBreak");
        assert_eq!(engine.remaining_secs(), 60);

        let only_custom =
            TimerList::new(vec![TimerDefinition::new("custom-1", "Reading", 600)]).unwrap();
        let events = engine.set_timers(only_custom);
        assert_eq!(
            events,
            vec![Event::TimerSelected {
                timer_id: "custom-1".into(),
                duration_secs: 600,
            }]
        );
        assert_eq!(engine.remaining_secs(), 600);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut engine = TimerEngine::new(list(), WakeLockController::unsupported());
        engine.start();
        engine.set_visible(false);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, TimerPhase::Idle);
        assert_eq!(snap.selected_id, "work");
        assert_eq!(snap.selected_name, "Focus");
        assert_eq!(snap.formatted_time, "02:00");
        assert!(snap.was_paused_by_system);
        assert!(!snap.is_visible);
        assert!(!snap.is_wake_lock_supported);
    }
}
