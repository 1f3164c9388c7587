//! Integration tests for the timer engine driven end to end.

use focusclock_core::testing::FakeWakeLock;
use focusclock_core::{
    Event, TimerDefinition, TimerEngine, TimerList, TimerPhase, WakeLockController,
};

fn work_only() -> TimerList {
    TimerList::new(vec![TimerDefinition::new("work", "Focus", 1500)]).unwrap()
}

fn completions(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::TimerCompleted { .. }))
        .count()
}

#[test]
fn test_full_work_session_completes_and_counts() {
    let mut engine = TimerEngine::new(work_only(), WakeLockController::unsupported());
    engine.start();

    let mut events = Vec::new();
    for _ in 0..1500 {
        events.extend(engine.tick());
    }

    assert_eq!(engine.phase(), TimerPhase::Completed);
    assert_eq!(engine.remaining_secs(), 0);
    assert_eq!(engine.session_count(), 1);
    assert_eq!(engine.formatted_time(), "00:00");
    assert_eq!(engine.progress_percent(), 100.0);
    assert_eq!(completions(&events), 1);

    // Extra ticks after completion change nothing.
    assert!(engine.tick().is_empty());
    assert_eq!(engine.session_count(), 1);
}

#[test]
fn test_hide_pauses_and_show_does_not_resume() {
    let mut engine = TimerEngine::new(work_only(), WakeLockController::unsupported());
    engine.start();
    for _ in 0..10 {
        engine.tick();
    }

    engine.set_visible(false);
    assert!(!engine.is_running());
    assert!(engine.was_paused_by_system());
    assert_eq!(engine.remaining_secs(), 1490);

    engine.set_visible(true);
    assert!(!engine.is_running());
    assert!(engine.was_paused_by_system());
    assert_eq!(engine.remaining_secs(), 1490);

    // Ticks delivered while paused do not count down.
    engine.tick();
    assert_eq!(engine.remaining_secs(), 1490);

    engine.start();
    assert!(!engine.was_paused_by_system());
    assert!(engine.is_running());
}

#[test]
fn test_unsupported_wake_lock_is_silent() {
    let fake = FakeWakeLock::unsupported();
    let probe = fake.probe();
    let mut engine = TimerEngine::new(work_only(), WakeLockController::new(fake));
    assert!(!engine.is_wake_lock_supported());

    let mut events = engine.start();
    for _ in 0..5 {
        events.extend(engine.tick());
        events.extend(engine.poll_wake_lock());
    }

    assert!(!engine.is_wake_lock_active());
    assert!(!engine.is_wake_lock_supported());
    assert_eq!(probe.acquire_count(), 0);
    assert!(!events.iter().any(|e| matches!(
        e,
        Event::WakeLockAcquired | Event::WakeLockLost | Event::WakeLockReleased
    )));
}

#[test]
fn test_rejected_wake_lock_does_not_disturb_countdown() {
    let fake = FakeWakeLock::supported();
    let probe = fake.probe();
    probe.reject_next(1);
    let mut engine = TimerEngine::new(work_only(), WakeLockController::new(fake));

    engine.start();
    assert!(engine.is_running());
    assert!(!engine.is_wake_lock_active());

    // Next evaluation tries again.
    engine.tick();
    assert!(engine.is_wake_lock_active());
    assert_eq!(engine.remaining_secs(), 1499);
}

#[test]
fn test_restart_after_completion() {
    let timers = TimerList::new(vec![
        TimerDefinition::new("work", "Focus", 3),
        TimerDefinition::new("shortBreak", "Short Break", 2),
    ])
    .unwrap();
    let mut engine = TimerEngine::new(timers, WakeLockController::unsupported());

    engine.start();
    for _ in 0..3 {
        engine.tick();
    }
    assert!(engine.is_completed());

    // The presentation layer composes restart as reset + start.
    engine.reset();
    engine.start();
    assert!(!engine.is_completed());
    assert_eq!(engine.remaining_secs(), 3);
    for _ in 0..3 {
        engine.tick();
    }
    assert_eq!(engine.session_count(), 2);

    engine.select_timer("shortBreak");
    engine.start();
    for _ in 0..2 {
        engine.tick();
    }
    assert!(engine.is_completed());
    assert_eq!(engine.session_count(), 2);
}

#[test]
fn test_edited_duration_applies_after_reset() {
    let mut engine = TimerEngine::new(work_only(), WakeLockController::unsupported());
    engine.start();
    for _ in 0..100 {
        engine.tick();
    }

    let edited = TimerList::new(vec![TimerDefinition::new("work", "Focus", 3000)]).unwrap();
    engine.set_timers(edited);
    assert_eq!(engine.remaining_secs(), 1400);
    assert!(engine.is_running());

    engine.reset();
    assert_eq!(engine.remaining_secs(), 3000);
}

#[test]
fn test_custom_focus_timer_counts_sessions() {
    let timers = TimerList::new(vec![
        TimerDefinition::new("work", "Focus", 60),
        TimerDefinition::new("custom-1", "Evening focus", 2),
    ])
    .unwrap();
    let mut engine = TimerEngine::new(timers, WakeLockController::unsupported())
        .with_selection("custom-1");
    engine.start();
    engine.tick();
    engine.tick();
    assert_eq!(engine.session_count(), 1);
}
