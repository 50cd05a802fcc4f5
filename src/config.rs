//! Application configuration
//!
//! Loaded from a camelCase JSON file with the same shape as the web
//! front-end's `config.json`.

use crate::state::FrequencyRange;
use crate::{Result, ToneCanvasError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "TONE_CANVAS_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Configuration for the whole client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Base URL of the backend, without trailing slash
    pub backend_url: String,

    /// Static headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Pitch bounds used by the trace collector
    pub frequency_range: FrequencyRange,

    /// Trace sampling period in milliseconds
    pub sample_period_ms: u64,

    /// Timeout applied to each backend request
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            headers: BTreeMap::new(),
            frequency_range: FrequencyRange::default(),
            sample_period_ms: 50,
            request_timeout_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ToneCanvasError::ConfigError(format!("Invalid config: {}", e)))
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ToneCanvasError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `$TONE_CANVAS_CONFIG` or `./config.json`
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse or validate is an error.
    pub fn discover() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            warn!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Set the backend base URL
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Add a static header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the pitch bounds
    pub fn with_frequency_range(mut self, min: f32, max: f32) -> Self {
        self.frequency_range = FrequencyRange { min, max };
        self
    }

    /// Set the trace sampling period
    pub fn with_sample_period_ms(mut self, period: u64) -> Self {
        self.sample_period_ms = period;
        self
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Backend base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url();
        if url.is_empty() {
            return Err(ToneCanvasError::ConfigError("backendUrl is required".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToneCanvasError::ConfigError(format!(
                "backendUrl must be http(s): {}",
                url
            )));
        }
        if self.sample_period_ms == 0 {
            return Err(ToneCanvasError::ConfigError(
                "samplePeriodMs must be greater than 0".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ToneCanvasError::ConfigError(
                "requestTimeoutMs must be greater than 0".into(),
            ));
        }
        self.frequency_range.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HttpBackend;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.sample_period_ms, 50);
        assert_eq!(config.frequency_range.min, 100.0);
        assert_eq!(config.frequency_range.max, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_web_config_shape() {
        let config = AppConfig::from_json(
            r#"{
                "backendUrl": "http://10.0.0.2:5000/",
                "headers": { "ngrok-skip-browser-warning": "true" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://10.0.0.2:5000");
        assert_eq!(
            config.headers.get("ngrok-skip-browser-warning").map(String::as_str),
            Some("true")
        );
        // Unspecified fields keep their defaults
        assert_eq!(config.sample_period_ms, 50);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(AppConfig::default().with_backend_url("").validate().is_err());
        assert!(AppConfig::default()
            .with_backend_url("ftp://host")
            .validate()
            .is_err());
        assert!(AppConfig::default().with_sample_period_ms(0).validate().is_err());
        assert!(AppConfig::default()
            .with_frequency_range(f32::NAN, 10.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_zero_request_timeout_is_rejected() {
        let config = AppConfig::from_json(
            r#"{ "backendUrl": "http://localhost:8000", "requestTimeoutMs": 0 }"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ToneCanvasError::ConfigError(ref m) if m.contains("requestTimeoutMs")));
        assert!(HttpBackend::new(&config).is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AppConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ToneCanvasError::ConfigError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("tone_canvas_{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{ "backendUrl": "https://example.org", "samplePeriodMs": 20 }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.sample_period_ms, 20);
        assert_eq!(config.sample_period(), Duration::from_millis(20));

        std::fs::remove_file(&path).ok();
    }
}
