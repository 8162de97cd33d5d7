//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default time before a held pointer starts a drag on its own.
pub const DEFAULT_DELAY_MS: u64 = 50;

/// Default displacement that starts a drag immediately.
pub const DEFAULT_DETACH_THRESHOLD: f64 = 2.0;

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraglineConfig {
    /// Default per-surface drag settings.
    #[serde(default)]
    pub drag: DragConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-surface drag recognition settings, read once when a surface is attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    /// Milliseconds before a held pointer starts a drag without moving.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Displacement (device pixels) that starts a drag before the delay elapses.
    #[serde(default = "default_detach_threshold")]
    pub detach_threshold: f64,

    /// How displacement is measured against `detach_threshold`.
    #[serde(default)]
    pub threshold_metric: ThresholdMetric,
}

/// Displacement measure compared against the detach threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdMetric {
    /// `|dx| + |dy|`.
    #[default]
    Manhattan,
    /// `dx + dy` without absolute values. Opposite-signed motion cancels out,
    /// so (+5, -5) never crosses a positive threshold.
    SignedSum,
    /// `sqrt(dx² + dy²)`.
    Euclidean,
}

impl ThresholdMetric {
    /// Measure a displacement.
    pub fn measure(self, dx: f64, dy: f64) -> f64 {
        match self {
            ThresholdMetric::Manhattan => dx.abs() + dy.abs(),
            ThresholdMetric::SignedSum => dx + dy,
            ThresholdMetric::Euclidean => dx.hypot(dy),
        }
    }

    /// Whether the displacement reaches `threshold` (inclusive).
    pub fn reaches(self, dx: f64, dy: f64, threshold: f64) -> bool {
        self.measure(dx, dy) >= threshold
    }

    /// Parse a CLI-style name (`manhattan`, `signed-sum`, `euclidean`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Some(Self::Manhattan),
            "signed-sum" | "signed_sum" | "signed" => Some(Self::SignedSum),
            "euclidean" => Some(Self::Euclidean),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "dragline_controller=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            detach_threshold: DEFAULT_DETACH_THRESHOLD,
            threshold_metric: ThresholdMetric::default(),
        }
    }
}

impl DragConfig {
    /// Override the delay.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Override the detach threshold.
    pub fn with_detach_threshold(mut self, threshold: f64) -> Self {
        self.detach_threshold = threshold;
        self
    }

    /// Override the threshold metric.
    pub fn with_metric(mut self, metric: ThresholdMetric) -> Self {
        self.threshold_metric = metric;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_detach_threshold() -> f64 {
    DEFAULT_DETACH_THRESHOLD
}

impl DraglineConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = config_file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("dragline").join("config.json")
}
