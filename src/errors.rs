// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the application skeleton
//!
//! Device errors are recoverable and stay inside the capture path. Bootstrap
//! and view errors are configuration defects and end the process at startup.

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("View error: {0}")]
    View(#[from] ViewError),
}

/// Capture device errors
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("No capture device at index {0}")]
    NotFound(u32),

    #[error("Device is not open")]
    NotOpen,

    #[error("Failed to open device {id}: {reason}")]
    OpenFailed { id: u32, reason: String },

    #[error("Camera {0} is running, stop it first")]
    Busy(u32),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Fatal wiring errors raised while resolving an application
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no application named '{0}' is registered")]
    UnknownApp(String),

    #[error("application '{0}' has no designated entry point")]
    NoEntryPoint(String),

    #[error("entry point of '{0}' declares no controller binding")]
    NoControllerBinding(String),

    #[error("controller '{controller}' could not be constructed: {source}")]
    ControllerConstruction {
        controller: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// View description errors
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("required widget '{0}' is missing from the view")]
    MissingWidget(String),

    #[error("slider '{0}' has no paired label in the view")]
    MissingSliderLabel(String),

    #[error("unknown widget name '{0}'")]
    UnknownWidget(String),

    #[error("widget '{0}' cannot be registered as hidable")]
    NotHidable(String),
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this system")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        let err: AppError = CameraError::NotOpen.into();
        assert!(err.to_string().starts_with("Camera error:"));

        let err: AppError = BootstrapError::NoEntryPoint("dev".into()).into();
        assert!(err.to_string().contains("no designated entry point"));

        let err: AppError = ViewError::MissingSliderLabel("sliderA".into()).into();
        assert!(err.to_string().contains("sliderA"));
    }

    #[test]
    fn construction_error_keeps_cause() {
        let err = BootstrapError::ControllerConstruction {
            controller: "demo::Broken",
            source: anyhow::anyhow!("model file missing"),
        };
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("model file missing"));
    }
}
