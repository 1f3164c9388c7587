//! Interactive countdown session.
//!
//! One task owns the engine and serializes every input through a biased
//! `select!`: shutdown, then visibility, then user commands, then the
//! one-second tick. Visibility is polled before ticks so hiding the session
//! is never lost to a same-instant decrement.

use std::time::Duration;

use focusclock_core::{
    Config, Event, InhibitBackend, TimerEngine, VisibilityMonitor, VisibilityReporter,
    WakeLockController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::render::{tick_worth_printing, Renderer};

const HELP: &str = "commands: start | pause | reset | restart | select <id> | dismiss | \
hide | show | status | json | list | help | quit";

/// A line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    /// Reset, then start.
    Restart,
    Select(String),
    Dismiss,
    Hide,
    Show,
    Status,
    Json,
    List,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let command = match (verb.to_lowercase().as_str(), arg) {
        ("start" | "s", None) => Command::Start,
        ("pause" | "p", None) => Command::Pause,
        ("reset" | "r", None) => Command::Reset,
        ("restart", None) => Command::Restart,
        ("select", Some(id)) => Command::Select(id.to_string()),
        ("select", None) => return Err("usage: select <id>".to_string()),
        ("dismiss" | "d", None) => Command::Dismiss,
        ("hide", None) => Command::Hide,
        ("show", None) => Command::Show,
        ("status", None) => Command::Status,
        ("json", None) => Command::Json,
        ("list" | "ls", None) => Command::List,
        ("help" | "?", None) => Command::Help,
        ("quit" | "q" | "exit", None) => Command::Quit,
        _ => return Err(format!("unknown command: {}", line.trim())),
    };
    Ok(Some(command))
}

pub fn run(timer: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config, timer))
}

fn build_engine(config: &Config, timer: Option<&str>) -> TimerEngine {
    let wake_lock = if config.engine.keep_awake {
        WakeLockController::new(InhibitBackend::detect())
    } else {
        WakeLockController::unsupported()
    };
    let engine = TimerEngine::new(config.timers(), wake_lock);
    match timer {
        Some(id) => {
            if !engine.timers().contains(id) {
                warn!("Unknown timer '{}', using '{}'", id, engine.timers().first().id);
            }
            engine.with_selection(id)
        }
        None => engine,
    }
}

async fn session(
    config: Config,
    timer: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = build_engine(&config, timer.as_deref());
    let renderer = Renderer::new(config.engine.alert_bell);
    let (mut visibility, reporter) = VisibilityMonitor::new(true);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(timer_id = %engine.selected().id, "session started");
    println!("{HELP}");
    renderer.status(&engine.snapshot());

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }

            Some(visible) = visibility.changed() => {
                let events = engine.set_visible(visible);
                renderer.events(&events);
                renderer.status(&engine.snapshot());
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                let events = handle_command(&mut engine, &reporter, &renderer, command)?;
                if engine.is_running() && starts_countdown(&events) {
                    // First tick one full second after (re)starting.
                    ticker.reset();
                }
            }

            _ = ticker.tick(), if engine.is_running() => {
                let mut events = engine.tick();
                events.extend(engine.poll_wake_lock());
                renderer.events(&events);
                let snapshot = engine.snapshot();
                if !events.is_empty() || tick_worth_printing(&snapshot) {
                    renderer.status(&snapshot);
                }
            }
        }
    }

    info!(sessions = engine.session_count(), "session ended");
    // Dropping the engine releases any held wake lock.
    drop(engine);
    Ok(())
}

/// Whether `events` begin a fresh second of countdown.
fn starts_countdown(events: &[Event]) -> bool {
    events.iter().any(|e| matches!(e, Event::TimerStarted { .. }))
}

/// Apply one command and print the outcome. Returns the engine events.
fn handle_command(
    engine: &mut TimerEngine,
    reporter: &VisibilityReporter,
    renderer: &Renderer,
    command: Command,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let events: Vec<Event> = match command {
        Command::Start => engine.start(),
        Command::Pause => engine.pause(),
        Command::Reset => engine.reset(),
        Command::Restart => {
            let mut events = engine.reset();
            events.extend(engine.start());
            events
        }
        Command::Select(id) => {
            let events = engine.select_timer(&id);
            if events.is_empty() {
                println!("no timer with id '{id}' (try 'list')");
            }
            events
        }
        Command::Dismiss => engine.dismiss_completion(),
        Command::Hide => {
            reporter.set_visible(false);
            return Ok(Vec::new());
        }
        Command::Show => {
            reporter.set_visible(true);
            return Ok(Vec::new());
        }
        Command::Status => Vec::new(),
        Command::Json => {
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            return Ok(Vec::new());
        }
        Command::List => {
            for timer in engine.timers() {
                let marker = if timer.id == engine.selected().id { "*" } else { " " };
                println!(
                    "{} {:<14} {:<16} {}",
                    marker,
                    timer.id,
                    timer.name,
                    focusclock_core::timer::format_time(timer.duration_secs)
                );
            }
            return Ok(Vec::new());
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(Vec::new());
        }
        Command::Quit => return Ok(Vec::new()),
    };
    renderer.events(&events);
    renderer.status(&engine.snapshot());
    Ok(events)
}
