//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Timer durations, break cadence, and daily goal
//! - Presence detector parameters (boundary data for the external detector)
//! - Notification preferences
//! - Data retention settings
//!
//! Configuration is stored at `~/.config/vigil/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use super::data_dir;
use crate::error::{ConfigError, EngineError};

/// Timer configuration. Durations are minutes; the engine converts to
/// seconds internally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_sessions_until_long_break")]
    pub sessions_until_long_break: u32,
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
}

impl TimerConfig {
    /// The engine's arithmetic assumes positive durations and a positive
    /// break cadence; reject zeroes at this boundary.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.work_duration == 0 {
            return Err(EngineError::InvalidDuration { field: "work" });
        }
        if self.short_break_duration == 0 {
            return Err(EngineError::InvalidDuration {
                field: "short_break",
            });
        }
        if self.long_break_duration == 0 {
            return Err(EngineError::InvalidDuration { field: "long_break" });
        }
        if self.sessions_until_long_break == 0 {
            return Err(EngineError::InvalidDuration {
                field: "sessions_until_long_break",
            });
        }
        Ok(())
    }
}

/// Parameters handed to the external presence detector. The core never
/// interprets these; they are typed pass-through for the collaborator that
/// produces the per-tick presence/focus booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default = "default_face_scale_factor")]
    pub face_scale_factor: f64,
    #[serde(default = "default_min_neighbors")]
    pub face_min_neighbors: u32,
    #[serde(default = "default_eye_scale_factor")]
    pub eye_scale_factor: f64,
    #[serde(default = "default_min_neighbors")]
    pub eye_min_neighbors: u32,
    #[serde(default = "default_min_eyes_for_focus")]
    pub min_eyes_for_focus: u32,
}

/// Notification preferences, plain data for the glue layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub desktop_notifications: bool,
    #[serde(default = "default_true")]
    pub break_reminders: bool,
}

/// History retention and export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_export_format")]
    pub export_format: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/vigil/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub data: DataConfig,
}

// Default functions
fn default_work_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_until_long_break() -> u32 {
    4
}
fn default_daily_goal() -> u32 {
    8
}
fn default_face_scale_factor() -> f64 {
    1.1
}
fn default_eye_scale_factor() -> f64 {
    1.05
}
fn default_min_neighbors() -> u32 {
    5
}
fn default_min_eyes_for_focus() -> u32 {
    2
}
fn default_true() -> bool {
    true
}
fn default_retention_days() -> u32 {
    90
}
fn default_export_format() -> String {
    "csv".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            sessions_until_long_break: default_sessions_until_long_break(),
            daily_goal: default_daily_goal(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            face_scale_factor: default_face_scale_factor(),
            face_min_neighbors: default_min_neighbors(),
            eye_scale_factor: default_eye_scale_factor(),
            eye_min_neighbors: default_min_neighbors(),
            min_eyes_for_focus: default_min_eyes_for_focus(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            desktop_notifications: true,
            break_reminders: true,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            export_format: default_export_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            detection: DetectionConfig::default(),
            notifications: NotificationsConfig::default(),
            data: DataConfig::default(),
        }
    }
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let invalid = |message: String| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message,
                };
                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/vigil"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing out the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                info!("configuration loaded");
                Ok(cfg)
            }
            Err(_) => {
                info!("no config file found, using defaults");
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning defaults on any error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key, e.g.
    /// `timer.work_duration`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist. The updated
    /// config is re-validated before it is saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.timer.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        self.save()?;
        info!(key, value, "config updated");
        Ok(())
    }
}
