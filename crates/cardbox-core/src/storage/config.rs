//! TOML-based application configuration.
//!
//! Stores the deck location and format plus review behavior:
//! - where the card store lives and how its dates are written
//! - save policy (full rewrite vs merge-upsert)
//! - review loop options (repeat-until-empty, STOP sentinel)
//!
//! Configuration is stored at `~/.config/cardbox/config.toml`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// How `last_reviewed` is written to and parsed from the store.
///
/// One fixed choice per deployment; load and save always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    /// `YYYY-MM-DD`; parsed dates land on midnight.
    Date,
    /// `YYYY-MM-DDTHH:MM:SS`.
    DateTime,
}

impl DatePrecision {
    pub fn format_str(self) -> &'static str {
        match self {
            DatePrecision::Date => "%Y-%m-%d",
            DatePrecision::DateTime => "%Y-%m-%dT%H:%M:%S",
        }
    }

    pub fn parse(self, text: &str) -> Option<NaiveDateTime> {
        match self {
            DatePrecision::Date => NaiveDate::parse_from_str(text, self.format_str())
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN)),
            DatePrecision::DateTime => {
                NaiveDateTime::parse_from_str(text, self.format_str()).ok()
            }
        }
    }

    pub fn format(self, value: NaiveDateTime) -> String {
        value.format(self.format_str()).to_string()
    }
}

impl Default for DatePrecision {
    fn default() -> Self {
        DatePrecision::Date
    }
}

/// What `save` does with records already in the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicy {
    /// Rewrite the file from the given collection. Cards the caller leaves
    /// out are lost, so callers must pass the full deck.
    Replace,
    /// Update box and review date on records whose prompt matches, append
    /// new cards, and leave everything else as found.
    Merge,
}

impl Default for SavePolicy {
    fn default() -> Self {
        SavePolicy::Replace
    }
}

/// Deck storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Card store location. Defaults to `cards.csv` in the data directory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub date_precision: DatePrecision,
    #[serde(default)]
    pub save_policy: SavePolicy,
}

/// Review loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Keep re-running passes until one finds no due cards.
    #[serde(default)]
    pub repeat_until_empty: bool,
    /// Honor the STOP sentinel as an early exit.
    #[serde(default = "default_true")]
    pub allow_stop_sentinel: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            date_precision: DatePrecision::default(),
            save_policy: SavePolicy::default(),
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            repeat_until_empty: false,
            allow_stop_sentinel: true,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/cardbox/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub review: ReviewConfig,
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

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

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|e| invalid(e.to_string()))?;
                        serde_json::Value::Number(n.into())
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
        let dir = data_dir().map_err(|e| ConfigError::DataDir(e.to_string()))?;
        Ok(dir.join("config.toml"))
    }

    /// Resolved card store location: the configured path, or `cards.csv`
    /// in the data directory.
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.deck.store_path {
            Some(path) => Ok(path.clone()),
            None => {
                let dir = data_dir().map_err(|e| ConfigError::DataDir(e.to_string()))?;
                Ok(dir.join("cards.csv"))
            }
        }
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not persist; call
    /// [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be
    /// parsed into the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.deck.store_path, None);
        assert_eq!(cfg.deck.date_precision, DatePrecision::Date);
        assert_eq!(cfg.deck.save_policy, SavePolicy::Replace);
        assert!(!cfg.review.repeat_until_empty);
        assert!(cfg.review.allow_stop_sentinel);
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config::default();
        cfg.deck.store_path = Some(PathBuf::from("/tmp/cards.csv"));
        cfg.deck.save_policy = SavePolicy::Merge;
        cfg.review.repeat_until_empty = true;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.deck.store_path, cfg.deck.store_path);
        assert_eq!(parsed.deck.save_policy, SavePolicy::Merge);
        assert!(parsed.review.repeat_until_empty);
    }

    #[test]
    fn empty_toml_gets_all_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.deck.date_precision, DatePrecision::Date);
        assert!(parsed.review.allow_stop_sentinel);
    }

    #[test]
    fn get_by_dot_path() {
        let cfg = Config::default();
        assert_eq!(cfg.get("deck.date_precision").as_deref(), Some("date"));
        assert_eq!(cfg.get("review.allow_stop_sentinel").as_deref(), Some("true"));
        assert_eq!(cfg.get("deck.nope"), None);
    }

    #[test]
    fn set_bool_and_enum_values() {
        let mut cfg = Config::default();
        cfg.set("review.repeat_until_empty", "true").unwrap();
        assert!(cfg.review.repeat_until_empty);

        cfg.set("deck.save_policy", "merge").unwrap();
        assert_eq!(cfg.deck.save_policy, SavePolicy::Merge);

        cfg.set("deck.date_precision", "datetime").unwrap();
        assert_eq!(cfg.deck.date_precision, DatePrecision::DateTime);
    }

    #[test]
    fn set_store_path() {
        let mut cfg = Config::default();
        cfg.set("deck.store_path", "/tmp/deck.csv").unwrap();
        assert_eq!(cfg.deck.store_path, Some(PathBuf::from("/tmp/deck.csv")));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("deck.bogus", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("review.repeat_until_empty", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("deck.save_policy", "weekly"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn date_precision_round_trip() {
        let date = DatePrecision::Date;
        let parsed = date.parse("2024-01-02").unwrap();
        assert_eq!(date.format(parsed), "2024-01-02");
        assert!(date.parse("2024-01-02T10:00:00").is_none());

        let datetime = DatePrecision::DateTime;
        let parsed = datetime.parse("2024-01-02T10:30:00").unwrap();
        assert_eq!(datetime.format(parsed), "2024-01-02T10:30:00");
        assert!(datetime.parse("2024-01-02").is_none());

        assert!(date.parse("not a date").is_none());
    }
}
