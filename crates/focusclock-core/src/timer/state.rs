//! Countdown state and its transition function.
//!
//! [`EngineState::apply`] is a pure function of `(state, timers, input)`:
//! no clock, no I/O. Time only passes when the host feeds [`Input::Tick`].

use serde::{Deserialize, Serialize};

use super::definition::{TimerDefinition, TimerList};
use crate::events::Event;

/// Final seconds of a running countdown in which every tick emits
/// [`Event::NearZero`].
pub const NEAR_ZERO_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
}

/// Everything that can happen to the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Pause,
    Reset,
    Select(String),
    DismissCompletion,
    /// One second of running time elapsed.
    Tick,
    VisibilityChanged(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    selected_id: String,
    remaining_secs: u64,
    is_running: bool,
    is_completed: bool,
    session_count: u64,
    /// Set when the countdown was stopped because the surface went hidden.
    /// Cleared by any explicit start/pause/reset/select.
    paused_by_system: bool,
}

impl EngineState {
    /// Idle on the first timer of the list.
    pub fn new(timers: &TimerList) -> Self {
        Self::loaded(timers.first())
    }

    /// Idle on `id`, or on the first timer when `id` is unknown.
    pub fn with_selection(timers: &TimerList, id: &str) -> Self {
        Self::loaded(timers.resolve(id))
    }

    fn loaded(timer: &TimerDefinition) -> Self {
        Self {
            selected_id: timer.id.clone(),
            remaining_secs: timer.duration_secs,
            is_running: false,
            is_completed: false,
            session_count: 0,
            paused_by_system: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn selected_id(&self) -> &str {
        &self.selected_id
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    pub fn paused_by_system(&self) -> bool {
        self.paused_by_system
    }

    pub fn was_paused_by_system(&self) -> bool {
        self.paused_by_system && !self.is_running
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.is_completed {
            TimerPhase::Completed
        } else {
            TimerPhase::Idle
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Apply one input and return the events it produced.
    pub fn apply(&mut self, timers: &TimerList, input: Input) -> Vec<Event> {
        match input {
            Input::Start => self.start(timers),
            Input::Pause => self.pause(),
            Input::Reset => self.reset(timers),
            Input::Select(id) => self.select(timers, &id),
            Input::DismissCompletion => self.dismiss_completion(),
            Input::Tick => self.tick(timers),
            Input::VisibilityChanged(visible) => self.visibility_changed(visible),
        }
    }

    /// Re-validate against a replaced timer list.
    ///
    /// A vanished selection falls back to the first timer and is reloaded;
    /// otherwise the countdown is kept and only clamped to the (possibly
    /// shortened) duration. Returns true when the selection moved.
    pub fn reconcile(&mut self, timers: &TimerList) -> bool {
        match timers.get(&self.selected_id) {
            Some(timer) => {
                self.remaining_secs = self.remaining_secs.min(timer.duration_secs);
                false
            }
            None => {
                let first = timers.first();
                self.selected_id = first.id.clone();
                self.load(first.duration_secs);
                true
            }
        }
    }

    fn start(&mut self, timers: &TimerList) -> Vec<Event> {
        self.paused_by_system = false;
        self.is_completed = false;
        let was_running = self.is_running;
        self.is_running = true;

        // Never sit in Running with nothing left to count.
        if self.remaining_secs == 0 {
            return vec![self.complete(timers)];
        }
        if was_running {
            return Vec::new();
        }

        let mut events = vec![Event::TimerStarted {
            timer_id: self.selected_id.clone(),
            remaining_secs: self.remaining_secs,
        }];
        if self.remaining_secs <= NEAR_ZERO_SECS {
            events.push(Event::NearZero {
                remaining_secs: self.remaining_secs,
            });
        }
        events
    }

    fn pause(&mut self) -> Vec<Event> {
        self.paused_by_system = false;
        if !self.is_running {
            return Vec::new();
        }
        self.is_running = false;
        vec![Event::TimerPaused {
            remaining_secs: self.remaining_secs,
        }]
    }

    fn reset(&mut self, timers: &TimerList) -> Vec<Event> {
        let timer = timers.resolve(&self.selected_id);
        let duration_secs = timer.duration_secs;
        let timer_id = timer.id.clone();
        self.load(duration_secs);
        vec![Event::TimerReset {
            timer_id,
            duration_secs,
        }]
    }

    fn select(&mut self, timers: &TimerList, id: &str) -> Vec<Event> {
        let Some(timer) = timers.get(id) else {
            return Vec::new();
        };
        self.selected_id = timer.id.clone();
        self.load(timer.duration_secs);
        vec![Event::TimerSelected {
            timer_id: timer.id.clone(),
            duration_secs: timer.duration_secs,
        }]
    }

    fn dismiss_completion(&mut self) -> Vec<Event> {
        if !self.is_completed {
            return Vec::new();
        }
        self.is_completed = false;
        vec![Event::CompletionDismissed]
    }

    fn tick(&mut self, timers: &TimerList) -> Vec<Event> {
        if !self.is_running {
            return Vec::new();
        }
        if self.remaining_secs == 0 {
            return vec![self.complete(timers)];
        }

        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            vec![self.complete(timers)]
        } else if self.remaining_secs <= NEAR_ZERO_SECS {
            vec![Event::NearZero {
                remaining_secs: self.remaining_secs,
            }]
        } else {
            Vec::new()
        }
    }

    fn visibility_changed(&mut self, visible: bool) -> Vec<Event> {
        // Regaining visibility never resumes.
        if visible || !self.is_running {
            return Vec::new();
        }
        self.is_running = false;
        self.paused_by_system = true;
        vec![Event::TimerAutoPaused {
            remaining_secs: self.remaining_secs,
        }]
    }

    fn complete(&mut self, timers: &TimerList) -> Event {
        let timer = timers.resolve(&self.selected_id);
        self.is_running = false;
        self.is_completed = true;
        let counted = timer.is_focus();
        if counted {
            self.session_count = self.session_count.saturating_add(1);
        }
        Event::TimerCompleted {
            timer_id: timer.id.clone(),
            counted,
            session_count: self.session_count,
        }
    }

    /// Stop and load a fresh countdown of `duration_secs`.
    fn load(&mut self, duration_secs: u64) {
        self.is_running = false;
        self.is_completed = false;
        self.paused_by_system = false;
        self.remaining_secs = duration_secs;
    }
}
