use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for sentry operations.
pub type BotResult<T> = Result<T, BotError>;

/// The error type for everything between frame capture and fire control.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {description}")]
    InvalidConfig { description: String },

    #[error(
        "Region '{name}' [{x},{y},{width},{height}] exceeds capture bounds ({bound_width}x{bound_height})"
    )]
    RegionOutOfBounds {
        name: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bound_width: u32,
        bound_height: u32,
    },

    #[error("Template directory not readable: {path:?}: {source}")]
    TemplateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Template asset '{name}' could not be loaded from {path:?}: {source}")]
    TemplateAsset {
        name: String,
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Capture provider unavailable after {attempts} attempt(s): {description}")]
    CaptureUnavailable { attempts: u32, description: String },

    #[error("Capture connection lost: {description}")]
    CaptureConnectionLost { description: String },

    #[error("Failed to decode frame {path:?}: {source}")]
    FrameDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Frame {seq} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        seq: u64,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Actuator rejected '{operation}': {description}")]
    ActuatorRejected {
        operation: String,
        description: String,
    },

    #[error("Trigger channel closed")]
    ChannelClosed,

    #[error("I/O failure: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BotError {
    /// Errors that must stop the process before the frame loop starts
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            BotError::ConfigRead { .. }
                | BotError::ConfigParse { .. }
                | BotError::InvalidConfig { .. }
                | BotError::RegionOutOfBounds { .. }
                | BotError::TemplateDirectory { .. }
                | BotError::TemplateAsset { .. }
                | BotError::CaptureUnavailable { .. }
        )
    }

    /// Check if this error means the capture provider must be re-established
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, BotError::CaptureConnectionLost { .. })
    }

    pub fn actuator(operation: impl Into<String>, description: impl Into<String>) -> Self {
        BotError::ActuatorRejected {
            operation: operation.into(),
            description: description.into(),
        }
    }
}
