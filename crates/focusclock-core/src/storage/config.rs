//! TOML-based application configuration.
//!
//! Stores:
//! - The user's timer definitions (built-ins plus custom timers)
//! - Engine preferences (wake lock, completion bell)
//!
//! Configuration is stored at `~/.config/focusclock/config.toml`.
//! Built-in timers are never lost: on load the stored list is merged over
//! the built-in set, keeping only user-edited durations for built-in ids.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::data_dir;
use crate::error::{ConfigError, ValidationError};
use crate::timer::{builtin_timers, TimerDefinition, TimerList};

/// Engine preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hold a wake lock while a countdown runs.
    #[serde(default = "default_true")]
    pub keep_awake: bool,
    /// Ring the terminal bell on completion.
    #[serde(default = "default_true")]
    pub alert_bell: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusclock/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default = "builtin_timers")]
    timers: Vec<TimerDefinition>,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keep_awake: true,
            alert_bell: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            timers: builtin_timers(),
        }
    }
}

/// Merge a stored timer list over the built-in set.
///
/// Built-ins come first, in built-in order, taking only a stored (non-zero)
/// duration. Stored custom timers follow in stored order; entries with an
/// empty name, a zero duration, or an id already seen are dropped.
pub fn merge_with_defaults(stored: Vec<TimerDefinition>) -> Vec<TimerDefinition> {
    let defaults = builtin_timers();
    let mut merged: Vec<TimerDefinition> = defaults
        .iter()
        .map(|def| match stored.iter().find(|t| t.id == def.id) {
            Some(user) if user.duration_secs > 0 => TimerDefinition {
                duration_secs: user.duration_secs,
                ..def.clone()
            },
            _ => def.clone(),
        })
        .collect();

    for timer in stored {
        if merged.iter().any(|t| t.id == timer.id) {
            continue;
        }
        if timer.duration_secs == 0 || timer.name.trim().is_empty() {
            debug!(timer_id = %timer.id, "dropping invalid stored timer");
            continue;
        }
        merged.push(TimerDefinition {
            is_protected: false,
            ..timer
        });
    }
    merged
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Parse TOML and merge the timer list over the built-ins.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut cfg: Config = toml::from_str(content)?;
        cfg.timers = merge_with_defaults(cfg.timers);
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Load from disk or return default.
    ///
    /// A missing file writes the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be resolved, the
    /// file cannot be read, or the defaults cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from `path`.
    ///
    /// A missing file yields the defaults. A malformed file is logged and
    /// also yields the defaults; it is left untouched on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        match Self::from_toml(&content) {
            Ok(cfg) => Ok(cfg),
            Err(e) => {
                warn!("Ignoring malformed configuration at {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = self.to_toml().map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Path of the config file inside the data directory.
    pub fn file_path() -> Result<PathBuf, ConfigError> {
        Self::path()
    }

    // ── Engine settings ──────────────────────────────────────────────

    /// Get an engine setting as string by dot-separated key
    /// (e.g. `engine.keep_awake`).
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(&self.engine).ok()?;
        let json = serde_json::json!({ "engine": json });
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set an engine setting by key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is not a boolean.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let invalid = |message: String| ValidationError::InvalidValue {
            field: key.to_string(),
            message,
        };
        let parsed = value
            .parse::<bool>()
            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?;
        match key {
            "engine.keep_awake" => self.engine.keep_awake = parsed,
            "engine.alert_bell" => self.engine.alert_bell = parsed,
            _ => return Err(invalid("unknown config key".into())),
        }
        Ok(())
    }

    // ── Timers ───────────────────────────────────────────────────────

    /// The timer list handed to the engine.
    pub fn timers(&self) -> TimerList {
        TimerList::new(self.timers.clone()).unwrap_or_else(|e| {
            warn!("Invalid timer list, using built-ins: {}", e);
            TimerList::builtin()
        })
    }

    pub fn get_timer(&self, id: &str) -> Option<&TimerDefinition> {
        self.timers.iter().find(|t| t.id == id)
    }

    /// Add a custom timer and return its id.
    pub fn add_timer(&mut self, name: &str, duration_secs: u64) -> Result<String, ValidationError> {
        let name = validate_name(name)?;
        validate_duration(duration_secs)?;

        let base = format!("custom-{}", chrono::Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut n = 1;
        while self.get_timer(&id).is_some() {
            n += 1;
            id = format!("{base}-{n}");
        }

        self.timers.push(TimerDefinition::new(id.clone(), name, duration_secs));
        Ok(id)
    }

    /// Rename and/or change the duration of a timer.
    ///
    /// Built-in timers keep their name; only their duration can change.
    pub fn update_timer(
        &mut self,
        id: &str,
        name: Option<&str>,
        duration_secs: Option<u64>,
    ) -> crate::error::Result<()> {
        let name = name.map(validate_name).transpose()?;
        if let Some(duration_secs) = duration_secs {
            validate_duration(duration_secs)?;
        }

        let timer = self
            .timers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ConfigError::UnknownTimer(id.to_string()))?;

        if let Some(name) = name {
            if timer.is_protected && name != timer.name {
                return Err(ValidationError::InvalidValue {
                    field: "name".into(),
                    message: format!("built-in timer '{id}' cannot be renamed"),
                }
                .into());
            }
            timer.name = name;
        }
        if let Some(duration_secs) = duration_secs {
            timer.duration_secs = duration_secs;
        }
        Ok(())
    }

    /// Delete a custom timer. Built-ins and unknown ids are left alone.
    ///
    /// Returns whether a timer was removed.
    pub fn delete_timer(&mut self, id: &str) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id || t.is_protected);
        self.timers.len() != before
    }

    /// Drop custom timers and restore built-in durations.
    pub fn reset_to_defaults(&mut self) {
        self.timers = builtin_timers();
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(name.to_string())
}

fn validate_duration(duration_secs: u64) -> Result<(), ValidationError> {
    if duration_secs == 0 {
        return Err(ValidationError::InvalidValue {
            field: "duration".into(),
            message: "must be greater than zero".into(),
        });
    }
    Ok(())
}
