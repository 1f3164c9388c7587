use clap::Subcommand;
use focusclock_core::Config;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print all timers as JSON
    List,
    /// Add a custom timer
    Add {
        /// Display name
        name: String,
        /// Duration minutes
        #[arg(short, long, default_value = "0")]
        minutes: u64,
        /// Extra duration seconds
        #[arg(short, long, default_value = "0")]
        seconds: u64,
    },
    /// Rename a custom timer or change any timer's duration
    Update {
        /// Timer ID
        id: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New duration minutes
        #[arg(short, long)]
        minutes: Option<u64>,
        /// New extra duration seconds
        #[arg(short, long)]
        seconds: Option<u64>,
    },
    /// Delete a custom timer
    Delete {
        /// Timer ID
        id: String,
    },
    /// Drop custom timers and restore built-in durations
    ResetDefaults,
}

/// Combine `--minutes` and `--seconds`; `None` when neither was given.
fn duration_secs(minutes: Option<u64>, seconds: Option<u64>) -> Option<u64> {
    if minutes.is_none() && seconds.is_none() {
        return None;
    }
    Some(
        minutes
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(seconds.unwrap_or(0)),
    )
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;

    match action {
        TimerAction::List => {
            let timers = config.timers();
            println!("{}", serde_json::to_string_pretty(&timers)?);
        }
        TimerAction::Add {
            name,
            minutes,
            seconds,
        } => {
            let duration = minutes.saturating_mul(60).saturating_add(seconds);
            let id = config.add_timer(&name, duration)?;
            config.save()?;
            println!("{id}");
        }
        TimerAction::Update {
            id,
            name,
            minutes,
            seconds,
        } => {
            config.update_timer(&id, name.as_deref(), duration_secs(minutes, seconds))?;
            config.save()?;
            println!("ok");
        }
        TimerAction::Delete { id } => {
            if !config.delete_timer(&id) {
                return Err(format!("cannot delete '{id}': unknown or built-in timer").into());
            }
            config.save()?;
            println!("deleted {id}");
        }
        TimerAction::ResetDefaults => {
            config.reset_to_defaults();
            config.save()?;
            println!("timers reset to defaults");
        }
    }
    Ok(())
}
