use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Policy applied when every candidate encoding produces replacement
/// artifacts while reading an exam file.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EncodingPolicy {
    /// Fall back to lossy UTF-8 and let the model validator catch the damage.
    Lenient,
    /// Refuse the file with an encoding error.
    Strict,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionLimits {
    /// Upper bound on a single knowledge-point detection, including any I/O
    /// it performs.
    #[serde(default = "default_detection_timeout_secs")]
    pub detection_timeout_secs: u64,

    /// Timeout for network reachability probes. A probe that misses this
    /// deadline resolves to a failed result, never a hang.
    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,

    /// Bound on concurrently running detector calls within one module.
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
}

impl Default for DetectionLimits {
    fn default() -> Self {
        Self {
            detection_timeout_secs: default_detection_timeout_secs(),
            network_timeout_secs: default_network_timeout_secs(),
            max_concurrent_checks: default_max_concurrent_checks(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectionOptions {
    #[serde(default = "default_enable_partial_scoring")]
    pub enable_partial_scoring: bool,

    /// Tolerance for near-miss numeric comparisons (0–1).
    #[serde(default = "default_error_tolerance")]
    pub error_tolerance: f64,

    #[serde(default)]
    pub detailed_logging: bool,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            enable_partial_scoring: default_enable_partial_scoring(),
            error_tolerance: default_error_tolerance(),
            detailed_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PathOptions {
    /// Base directory that drive-less relative exam paths are anchored under.
    /// `None` selects the built-in fallback directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Drive prefix for drive-less absolute exam paths; `None` selects the
    /// configured application default.
    #[serde(default)]
    pub default_drive: Option<String>,
}

/// Per-run grading configuration, supplied by the caller at the grading
/// invocation boundary. Every field is optional in JSON form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub limits: DetectionLimits,

    #[serde(default)]
    pub detection: DetectionOptions,

    #[serde(default)]
    pub paths: PathOptions,

    #[serde(default = "default_encoding_policy")]
    pub encoding_policy: EncodingPolicy,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl GradingConfig {
    pub fn default_config() -> Self {
        GradingConfig {
            limits: DetectionLimits::default(),
            detection: DetectionOptions::default(),
            paths: PathOptions::default(),
            encoding_policy: default_encoding_policy(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid grading config JSON: {e}"))
    }

    /// Drive prefix to apply, preferring the per-run override.
    pub fn drive_prefix(&self) -> String {
        self.paths
            .default_drive
            .clone()
            .unwrap_or_else(crate::config::default_drive)
    }
}

fn default_detection_timeout_secs() -> u64 {
    30
}

fn default_network_timeout_secs() -> u64 {
    5
}

fn default_max_concurrent_checks() -> usize {
    8
}

fn default_enable_partial_scoring() -> bool {
    true
}

fn default_error_tolerance() -> f64 {
    0.1
}

fn default_encoding_policy() -> EncodingPolicy {
    EncodingPolicy::Lenient
}
