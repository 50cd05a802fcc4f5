//! Tone Canvas - desktop client for the pitch-tracing audio experiment
//!
//! The client renders a drawing canvas, plays corpus clips served by the
//! backend, records microphone clips and submits pointer traces.

pub mod audio;
pub mod backend;
pub mod config;
pub mod controls;
pub mod state;
pub mod trace;
pub mod ui;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ToneCanvasError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Backend returned {status} for {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Malformed response: {0}")]
    DecodeError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),
}

impl From<std::io::Error> for ToneCanvasError {
    fn from(e: std::io::Error) -> Self {
        ToneCanvasError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for ToneCanvasError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ToneCanvasError::DecodeError(e.to_string())
        } else {
            ToneCanvasError::NetworkError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ToneCanvasError {
    fn from(e: serde_json::Error) -> Self {
        ToneCanvasError::DecodeError(e.to_string())
    }
}

impl From<hound::Error> for ToneCanvasError {
    fn from(e: hound::Error) -> Self {
        ToneCanvasError::AudioProcessingError(format!("WAV error: {}", e))
    }
}

impl ToneCanvasError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors only fail the current action; the user can press
    /// the button again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Backend may come back
            ToneCanvasError::NetworkError(_) => true,
            ToneCanvasError::HttpStatus { .. } => true,
            ToneCanvasError::DecodeError(_) => true,
            // Hardware/device errors may require user intervention
            ToneCanvasError::AudioDeviceError(_) => false,
            ToneCanvasError::AudioProcessingError(_) => true,
            ToneCanvasError::IOError(_) => false,
            ToneCanvasError::ConfigError(_) => false,
            ToneCanvasError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            ToneCanvasError::NetworkError(_) => {
                "Could not reach the backend. Please check the connection.".to_string()
            }
            ToneCanvasError::HttpStatus { status, .. } => {
                format!("Backend rejected the request ({}).", status)
            }
            ToneCanvasError::DecodeError(_) => {
                "Backend sent an unexpected response.".to_string()
            }
            ToneCanvasError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            ToneCanvasError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            ToneCanvasError::IOError(_) => "File system error occurred.".to_string(),
            ToneCanvasError::ConfigError(_) => {
                "Configuration error. Please check config.json.".to_string()
            }
            ToneCanvasError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ToneCanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_are_recoverable() {
        assert!(ToneCanvasError::NetworkError("refused".into()).is_recoverable());
        assert!(ToneCanvasError::HttpStatus {
            endpoint: "/api/switch-wav-file".into(),
            status: 500
        }
        .is_recoverable());
        assert!(!ToneCanvasError::AudioDeviceError("none".into()).is_recoverable());
    }

    #[test]
    fn test_status_message_names_code() {
        let err = ToneCanvasError::HttpStatus {
            endpoint: "/api/get-progress".into(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Backend returned 404 for /api/get-progress");
        assert!(err.user_message().contains("404"));
    }
}
