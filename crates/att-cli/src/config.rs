//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use att_core::{ClassifierConfig, FetchStrategy, LatePolicy};
use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Minutes after shift start before a check-in is late, and before shift
    /// end after which a check-out is early.
    pub grace_period_minutes: u32,

    /// With a shift, stays shorter than this are half days.
    pub half_day_threshold_minutes: u32,

    /// `flag-only` or `promote-to-status`.
    pub late_policy: LatePolicy,

    /// `per-range` or `per-day`.
    pub fetch_strategy: FetchStrategy,

    /// Rows per page when `--page-size` is not given.
    pub default_page_size: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("grace_period_minutes", &self.grace_period_minutes)
            .field("half_day_threshold_minutes", &self.half_day_threshold_minutes)
            .field("late_policy", &self.late_policy.as_str())
            .field("fetch_strategy", &self.fetch_strategy.as_str())
            .field("default_page_size", &self.default_page_size)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("att.db"),
            grace_period_minutes: 15,
            half_day_threshold_minutes: 240,
            late_policy: LatePolicy::default(),
            fetch_strategy: FetchStrategy::default(),
            default_page_size: 50,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later layers win: defaults, `~/.config/att/config.toml`, the given
    /// file, then `ATT_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("ATT_").split("__"));

        figment.extract()
    }

    /// Classifier settings derived from this configuration.
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            grace_period: Duration::minutes(i64::from(self.grace_period_minutes)),
            half_day_threshold: Duration::minutes(i64::from(self.half_day_threshold_minutes)),
            late_policy: self.late_policy,
        }
    }
}

/// Returns the platform-specific config directory for att.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("att"))
}

/// Returns the platform-specific data directory for att.
///
/// On Linux: `~/.local/share/att`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("att"))
}
