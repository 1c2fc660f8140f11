//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILNORM_CONFIG` (environment variable) or an explicit `--config` path
//! 2. `~/.config/mailnorm/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailnorm\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::date::{DEFAULT_FUTURE_GRACE_DAYS, MAX_FUTURE_GRACE_DAYS};

/// How already-known messages are treated on re-ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// Leave messages already in the corpus untouched.
    #[default]
    SkipKnown,
    /// Re-parse everything and replace known records in place.
    ForceReparse,
    /// Only retry messages currently in quarantine.
    RedoFailed,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SkipKnown => "skip-known",
            Self::ForceReparse => "force-reparse",
            Self::RedoFailed => "redo-failed",
        })
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Archive and output locations.
    pub paths: PathsConfig,
    /// Normalization run settings.
    pub parse: ParseConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override the directory for log files.
    pub log_dir: Option<PathBuf>,
}

/// Archive and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source archive: one sub-directory per mailing list.
    pub input_dir: PathBuf,
    /// Root for corpora and quarantine directories.
    pub output_dir: PathBuf,
}

/// Normalization run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub mode: ParseMode,
    /// Worker count (0 = number of CPUs).
    pub parallelism: usize,
    /// Lists to process; empty or `["ALL"]` selects every list.
    pub lists: Vec<String>,
    /// Capacity of the per-list memo of raw date strings.
    pub date_memo_size: usize,
    /// Days past "now" still accepted as a valid date.
    pub future_grace_days: i64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./archive"),
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            mode: ParseMode::SkipKnown,
            parallelism: 0,
            lists: Vec::new(),
            date_memo_size: 1024,
            future_grace_days: DEFAULT_FUTURE_GRACE_DAYS,
        }
    }
}

impl ParseConfig {
    /// Whether the list filter selects every list.
    pub fn all_lists(&self) -> bool {
        crate::archive::selects_all(&self.lists)
    }
}

impl Config {
    /// Reject values that are well-formed TOML but unusable.
    pub fn validate(&self) -> Result<(), String> {
        let grace = self.parse.future_grace_days;
        if !(0..=MAX_FUTURE_GRACE_DAYS).contains(&grace) {
            return Err(format!(
                "parse.future_grace_days must be between 0 and {MAX_FUTURE_GRACE_DAYS}, found {grace}"
            ));
        }
        Ok(())
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Config::default(),
    }
}

/// Load configuration from an explicit file, falling back to defaults.
pub fn load_config_from(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Config>(&contents) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "Loaded config");
                    cfg
                }
                Err(reason) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %reason,
                        "Invalid config, using defaults"
                    );
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to parse config, using defaults"
                );
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            Config::default()
        }
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILNORM_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailnorm").join("config.toml"))
}

/// Return the directory for log files.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailnorm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.parse.mode, ParseMode::SkipKnown);
        assert_eq!(cfg.parse.date_memo_size, 1024);
        assert_eq!(cfg.parse.future_grace_days, 3);
        assert!(cfg.parse.all_lists());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[parse]
mode = "force-reparse"
lists = ["netdev", "linux-kernel"]

[paths]
input_dir = "/srv/archive"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.parse.mode, ParseMode::ForceReparse);
        assert!(!cfg.parse.all_lists());
        assert_eq!(cfg.paths.input_dir, PathBuf::from("/srv/archive"));
        // Other fields use defaults
        assert_eq!(cfg.paths.output_dir, PathBuf::from("./output"));
        assert_eq!(cfg.parse.parallelism, 0);
    }

    #[test]
    fn test_all_lists_keyword() {
        let cfg: Config = toml::from_str("[parse]\nlists = [\"ALL\"]\n").expect("parse");
        assert!(cfg.parse.all_lists());
    }

    #[test]
    fn test_out_of_range_grace_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[parse]\nmode = \"force-reparse\"\nfuture_grace_days = 9223372036854775807\n",
        )
        .unwrap();

        let cfg = load_config_from(&path);
        assert_eq!(cfg.parse.future_grace_days, DEFAULT_FUTURE_GRACE_DAYS);
        assert_eq!(cfg.parse.mode, ParseMode::SkipKnown);

        let negative: Config = toml::from_str("[parse]\nfuture_grace_days = -1\n").expect("parse");
        assert!(negative.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(toml::from_str::<Config>("[parse]\nmode = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_load_from_missing_file_defaults() {
        let cfg = load_config_from(Path::new("/nonexistent/mailnorm.toml"));
        assert_eq!(cfg.parse.mode, ParseMode::SkipKnown);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.parse.mode = ParseMode::RedoFailed;
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.parse.mode, ParseMode::RedoFailed);
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
    }
}
