//! Error types and handling
//!
//! Common error types used across the booth pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CaptureError;
use crate::export::ExportError;
use crate::geometry::GeometryError;
use crate::recorder::RecordError;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum BoothError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Human-readable notice for the host UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNotice {
    pub code: String,
    pub message: String,
}

impl From<&BoothError> for UserNotice {
    fn from(error: &BoothError) -> Self {
        let code = match error {
            BoothError::Capture(CaptureError::DeviceAccess(_)) => "DEVICE_ACCESS",
            BoothError::Capture(_) => "CAPTURE_ERROR",
            BoothError::Record(RecordError::UnsupportedPlatform(_)) => "UNSUPPORTED_PLATFORM",
            BoothError::Record(_) => "RECORDING_ERROR",
            BoothError::Export(ExportError::Exhausted(_)) => "EXPORT_EXHAUSTED",
            BoothError::Geometry(_) => "GEOMETRY_ERROR",
            BoothError::Serialization(_) => "SERIALIZATION_ERROR",
        };

        UserNotice {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using BoothError
pub type BoothResult<T> = Result<T, BoothError>;
