//! TOML configuration and data-dir resolution.
//!
//! Configuration lives at `<data_dir>/postflow.toml`. Every field has a
//! default so a fresh install runs without any file present: the five
//! provider services point at local development ports and the image-model
//! catalog falls back to the built-in default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use postflow_types::model::ModelCatalogConfig;
use serde::Deserialize;
use thiserror::Error;

use postflow_core::media::registry::ImageModelRegistry;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Top-level configuration for the `pflow` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct PostflowConfig {
    /// Per-step deadline applied by the executor, in seconds.
    #[serde(default = "default_step_deadline_secs")]
    pub step_deadline_secs: u64,
    /// Provider services keyed by provider name.
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Image-model catalog file, relative to the data dir when not absolute.
    #[serde(default = "default_models_file")]
    pub models_file: PathBuf,
}

/// Connection settings for one external tool-providing service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Service base URL; tools are invoked at `<base_url>/tools/<tool>`.
    pub base_url: String,
    /// Environment variable holding the service API key, if any.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds (default 30).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for PostflowConfig {
    fn default() -> Self {
        Self {
            step_deadline_secs: default_step_deadline_secs(),
            providers: default_providers(),
            models_file: default_models_file(),
        }
    }
}

fn default_step_deadline_secs() -> u64 {
    300
}

fn default_models_file() -> PathBuf {
    PathBuf::from("image_models.json")
}

/// The five services the predefined workflows address, on local dev ports.
fn default_providers() -> HashMap<String, ProviderConfig> {
    let service = |port: u16, key_env: &str| ProviderConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        api_key_env: Some(key_env.to_string()),
        timeout_secs: None,
    };
    HashMap::from([
        ("content".to_string(), service(8701, "POSTFLOW_CONTENT_API_KEY")),
        ("image".to_string(), service(8702, "POSTFLOW_IMAGE_API_KEY")),
        ("publisher".to_string(), service(8703, "POSTFLOW_PUBLISHER_API_KEY")),
        ("analytics".to_string(), service(8704, "POSTFLOW_ANALYTICS_API_KEY")),
        ("scheduler".to_string(), service(8705, "POSTFLOW_SCHEDULER_API_KEY")),
    ])
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Resolve the data directory: `POSTFLOW_DATA_DIR`, else `~/.postflow`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("POSTFLOW_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".postflow")
}

/// Load `postflow.toml` from the data dir, falling back to defaults when the
/// file does not exist.
pub fn load_config(data_dir: &Path) -> Result<PostflowConfig, ConfigError> {
    let path = data_dir.join("postflow.toml");
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PostflowConfig::default());
    }
    let content = std::fs::read_to_string(&path)?;
    let config: PostflowConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    tracing::info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load the image-model catalog named by the config, falling back to the
/// built-in default when the file does not exist. Parse failures fall back
/// too, with an error logged, so a bad catalog never blocks startup.
pub fn load_model_catalog(data_dir: &Path, config: &PostflowConfig) -> ModelCatalogConfig {
    let path = if config.models_file.is_absolute() {
        config.models_file.clone()
    } else {
        data_dir.join(&config.models_file)
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no model catalog file, using built-in default");
        return ImageModelRegistry::default_catalog();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "invalid model catalog, using built-in default");
                ImageModelRegistry::default_catalog()
            }
        },
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "unreadable model catalog, using built-in default");
            ImageModelRegistry::default_catalog()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
