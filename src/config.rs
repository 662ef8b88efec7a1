//! Configuration management for the blood loss risk predictor

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the application root (parent of the
/// artifact directory).
pub const HOME_ENV: &str = "BLOOD_LOSS_RISK_HOME";

/// Entries whose presence marks a directory as the application root.
const ROOT_MARKERS: [&str; 2] = ["config", "models_saved"];

/// Prefix for environment overrides, e.g. `BLOOD_LOSS_RISK__SERVER__BIND_ADDR`.
const ENV_PREFIX: &str = "BLOOD_LOSS_RISK";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Artifact store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the ONNX classifiers and the scaler
    pub models_dir: String,
    /// Scaler file name inside `models_dir`
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Number of threads for ONNX inference per model (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl ArtifactsConfig {
    pub fn models_path(&self) -> PathBuf {
        PathBuf::from(&self.models_dir)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.models_path().join(&self.scaler_file)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the form is served on
    pub bind_addr: String,
}

/// Inference metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries; 0 disables them
    #[serde(default)]
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from `config/config.toml` under the current
    /// directory, falling back to built-in defaults for anything missing.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path. The file is optional;
    /// environment overrides are applied on top.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults = AppConfig::default();

        let config = Config::builder()
            .set_default("artifacts.models_dir", defaults.artifacts.models_dir)?
            .set_default("artifacts.scaler_file", defaults.artifacts.scaler_file)?
            .set_default("artifacts.onnx_threads", defaults.artifacts.onnx_threads as u64)?
            .set_default("server.bind_addr", defaults.server.bind_addr)?
            .set_default(
                "metrics.report_interval_secs",
                defaults.metrics.report_interval_secs,
            )?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Directory the process works from so that relative artifact paths resolve.
///
/// `$BLOOD_LOSS_RISK_HOME` wins when set. Otherwise the nearest ancestor of
/// the executable's directory that holds `config/` or `models_saved/`, which
/// covers both an installed layout and `target/<profile>/` during development.
/// Falls back to the executable's directory.
pub fn app_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let exe_dir = exe
        .parent()
        .with_context(|| format!("{} has no parent directory", exe.display()))?;
    Ok(resolve_root(std::env::var_os(HOME_ENV), exe_dir))
}

fn resolve_root(home: Option<OsString>, exe_dir: &Path) -> PathBuf {
    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return PathBuf::from(home);
    }

    exe_dir
        .ancestors()
        .find(|dir| ROOT_MARKERS.iter().any(|marker| dir.join(marker).is_dir()))
        .unwrap_or(exe_dir)
        .to_path_buf()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactsConfig {
                models_dir: "models_saved".to_string(),
                scaler_file: default_scaler_file(),
                onnx_threads: default_onnx_threads(),
            },
            server: ServerConfig {
                bind_addr: "127.0.0.1:8501".to_string(),
            },
            metrics: MetricsConfig {
                report_interval_secs: 0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
