//! Configuration loading from environment variables or a TOML file.
//!
//! Environment values are read from `MEMO_*` variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `MEMO_RECORD_METRICS` | true | Emit hit/miss/preset/reset counters |
//! | `MEMO_TRACE_KEYS` | false | Log full argument keys instead of digests |
//! | `MEMO_INITIAL_CAPACITY` | 8 | Method slots reserved per instance |
//! | `MEMO_SHARD_AMOUNT` | 4 | Lock shards per instance store (power of two, 2..=64) |
//! | `MEMO_LOG_LEVEL` | info | `EnvFilter` directive |
//! | `MEMO_LOG_FORMAT` | json | `json` or `pretty` |
//! | `MEMO_LOG_FILE` | (stderr) | Optional log file path |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memo::{normalize_shard_amount, DEFAULT_SHARD_AMOUNT};
use crate::telemetry::{LogConfig, LogFormat};

const DEFAULT_INITIAL_CAPACITY: usize = 8;
const MAX_INITIAL_CAPACITY: usize = 4096;

/// Per-instance memoization options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoConfig {
    pub record_metrics: bool,
    pub trace_keys: bool,
    pub initial_capacity: usize,
    /// Shards of the store's map, created on the first cached result.
    pub shard_amount: usize,
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            record_metrics: true,
            trace_keys: false,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            shard_amount: DEFAULT_SHARD_AMOUNT,
        }
    }
}

impl MemoConfig {
    /// Clamp sizes to supported ranges.
    pub fn normalized(self) -> Self {
        Self {
            initial_capacity: self.initial_capacity.min(MAX_INITIAL_CAPACITY),
            shard_amount: normalize_shard_amount(self.shard_amount),
            ..self
        }
    }
}

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All configuration: memo options plus logging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub memo: MemoConfig,
    pub log: LogConfig,
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub record_metrics: bool,
    pub trace_keys: bool,
    pub initial_capacity: usize,
    pub shard_amount: usize,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<String>,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a boolean env var (`1/0`, `true/false`, `yes/no`, `on/off`).
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn parse_format(key: &str, default: LogFormat) -> LogFormat {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Load memo options from environment.
fn load_memo_config() -> MemoConfig {
    let record_metrics = parse_bool("MEMO_RECORD_METRICS", true);
    let trace_keys = parse_bool("MEMO_TRACE_KEYS", false);
    let initial_capacity = parse_usize("MEMO_INITIAL_CAPACITY", DEFAULT_INITIAL_CAPACITY);
    let shard_amount = parse_usize("MEMO_SHARD_AMOUNT", DEFAULT_SHARD_AMOUNT);
    MemoConfig {
        record_metrics,
        trace_keys,
        initial_capacity,
        shard_amount,
    }
    .normalized()
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let level = std::env::var("MEMO_LOG_LEVEL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "info".to_string());
    let output_path = std::env::var("MEMO_LOG_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    LogConfig {
        format: parse_format("MEMO_LOG_FORMAT", LogFormat::Json),
        level,
        output_path,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        memo: load_memo_config(),
        log: load_log_config(),
    }
}

impl EnvConfig {
    /// Parse a TOML document with optional `[memo]` and `[log]` tables.
    /// Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut cfg: EnvConfig = toml::from_str(text)?;
        cfg.memo = cfg.memo.normalized();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            record_metrics: self.memo.record_metrics,
            trace_keys: self.memo.trace_keys,
            initial_capacity: self.memo.initial_capacity,
            shard_amount: self.memo.shard_amount,
            log_level: self.log.level.clone(),
            log_format: match self.log.format {
                LogFormat::Json => "json".to_string(),
                LogFormat::Pretty => "pretty".to_string(),
            },
            log_file: self
                .log
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    pub(crate) static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) const ENV_KEYS: &[&str] = &[
        "MEMO_RECORD_METRICS",
        "MEMO_TRACE_KEYS",
        "MEMO_INITIAL_CAPACITY",
        "MEMO_SHARD_AMOUNT",
        "MEMO_LOG_LEVEL",
        "MEMO_LOG_FORMAT",
        "MEMO_LOG_FILE",
    ];

    pub(crate) fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_when_unset() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.memo, MemoConfig::default());
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert!(cfg.log.output_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MEMO_RECORD_METRICS", "off");
        std::env::set_var("MEMO_TRACE_KEYS", "yes");
        std::env::set_var("MEMO_INITIAL_CAPACITY", "32");
        std::env::set_var("MEMO_LOG_LEVEL", "memo_core=debug");
        std::env::set_var("MEMO_LOG_FORMAT", "Pretty");
        let cfg = load();
        clear_env_vars();

        assert!(!cfg.memo.record_metrics);
        assert!(cfg.memo.trace_keys);
        assert_eq!(cfg.memo.initial_capacity, 32);
        assert_eq!(cfg.log.level, "memo_core=debug");
        assert_eq!(cfg.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MEMO_RECORD_METRICS", "maybe");
        std::env::set_var("MEMO_INITIAL_CAPACITY", "-3");
        std::env::set_var("MEMO_LOG_FORMAT", "xml");
        let cfg = load();
        clear_env_vars();

        assert!(cfg.memo.record_metrics);
        assert_eq!(cfg.memo.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert_eq!(cfg.log.format, LogFormat::Json);
    }

    #[test]
    fn test_capacity_is_clamped() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MEMO_INITIAL_CAPACITY", "1000000");
        let cfg = load();
        clear_env_vars();
        assert_eq!(cfg.memo.initial_capacity, MAX_INITIAL_CAPACITY);
    }

    #[test]
    fn test_shard_amount_from_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("MEMO_SHARD_AMOUNT", "16");
        assert_eq!(load().memo.shard_amount, 16);
        std::env::set_var("MEMO_SHARD_AMOUNT", "5");
        assert_eq!(load().memo.shard_amount, 8);
        std::env::set_var("MEMO_SHARD_AMOUNT", "0");
        assert_eq!(load().memo.shard_amount, 2);
        std::env::set_var("MEMO_SHARD_AMOUNT", "lots");
        assert_eq!(load().memo.shard_amount, DEFAULT_SHARD_AMOUNT);
        clear_env_vars();
    }

    #[test]
    fn test_from_toml_normalizes_shards() {
        let cfg = EnvConfig::from_toml_str("[memo]\nshard_amount = 100\n").unwrap();
        assert_eq!(cfg.memo.shard_amount, 64);
    }

    #[test]
    fn test_from_toml() {
        let cfg = EnvConfig::from_toml_str(
            r#"
            [memo]
            trace_keys = true

            [log]
            level = "debug"
            format = "pretty"
            "#,
        )
        .unwrap();
        assert!(cfg.memo.trace_keys);
        assert!(cfg.memo.record_metrics);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let result = EnvConfig::from_toml_str("[memo]\ninitial_capacity = \"many\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[memo]\ninitial_capacity = 64").unwrap();
        let cfg = EnvConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.memo.initial_capacity, 64);

        let missing = EnvConfig::from_file(Path::new("/nonexistent/memo.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_effective_config_serializes() {
        let cfg = EnvConfig::default();
        let json = serde_json::to_value(cfg.effective_config()).unwrap();
        assert_eq!(json["log_format"], "json");
        assert_eq!(json["initial_capacity"], 8);
    }
}
