//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub submission_root: String,
    pub default_drive: String,
    pub network_timeout_secs: u64,
    pub ai_scoring_endpoint: String,
    pub ai_scoring_key: String,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every field has a usable default so that grading can run without any
    /// environment setup; overrides exist for deployment and for tests.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "exam-grader".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "grader=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "grader.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            submission_root: env::var("SUBMISSION_ROOT").unwrap_or_default(),
            default_drive: env::var("DEFAULT_DRIVE").unwrap_or_else(|_| "C:".into()),
            network_timeout_secs: env::var("NETWORK_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            ai_scoring_endpoint: env::var("AI_SCORING_ENDPOINT").unwrap_or_default(),
            ai_scoring_key: env::var("AI_SCORING_KEY").unwrap_or_default(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_submission_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.submission_root = value.into());
    }

    pub fn set_default_drive(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.default_drive = value.into());
    }

    pub fn set_network_timeout_secs(value: u64) {
        AppConfig::set_field(|cfg| cfg.network_timeout_secs = value);
    }

    pub fn set_ai_scoring_endpoint(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.ai_scoring_endpoint = value.into());
    }

    pub fn set_ai_scoring_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.ai_scoring_key = value.into());
    }
}

// --- Convenience accessors used across the workspace ---

/// Root directory holding student submissions, possibly empty when unset.
pub fn submission_root() -> String {
    AppConfig::global().submission_root.clone()
}

/// Drive prefix applied to drive-less absolute exam paths (e.g. `C:`).
pub fn default_drive() -> String {
    AppConfig::global().default_drive.clone()
}

/// Timeout applied to network reachability probes.
pub fn network_timeout_secs() -> u64 {
    AppConfig::global().network_timeout_secs
}

pub fn ai_scoring_endpoint() -> String {
    AppConfig::global().ai_scoring_endpoint.clone()
}

pub fn ai_scoring_key() -> String {
    AppConfig::global().ai_scoring_key.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        unsafe {
            std::env::remove_var("DEFAULT_DRIVE");
            std::env::remove_var("NETWORK_TIMEOUT_SECS");
        }
        AppConfig::reset();
        assert_eq!(default_drive(), "C:");
        assert_eq!(network_timeout_secs(), 5);
    }

    #[test]
    #[serial]
    fn test_setter_overrides() {
        AppConfig::set_default_drive("D:");
        AppConfig::set_network_timeout_secs(1);
        assert_eq!(default_drive(), "D:");
        assert_eq!(network_timeout_secs(), 1);
        AppConfig::reset();
    }
}
