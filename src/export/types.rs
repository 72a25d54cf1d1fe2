//! Export types
//!
//! Requests, outcomes, and error types for the export fallback chain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::CapturedResult;

/// A finished binary to persist, plus delivery hints.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub bytes: Arc<Vec<u8>>,
    /// Suggested filename, extension included
    pub filename: String,
    pub mime_type: String,
    /// Skip the native save dialog and go straight to a download.
    pub prefer_download: bool,
}

impl ExportRequest {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            filename: filename.into(),
            mime_type: mime_type.into(),
            prefer_download: false,
        }
    }

    pub fn from_result(result: &CapturedResult) -> Self {
        Self {
            bytes: result.bytes.clone(),
            filename: result.filename.clone(),
            mime_type: result.mime_type.clone(),
            prefer_download: false,
        }
    }
}

/// Which strategy delivered the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyKind {
    /// Share sheet inside an in-app browser
    InAppShare,
    /// Native save-as dialog
    SaveDialog,
    /// General share sheet
    Share,
    /// Opened in a new browsing context
    NewTab,
    /// Direct download
    Download,
}

/// Outcome of a single strategy attempt.
#[derive(Debug)]
pub enum Attempt {
    /// The file was handed to the platform; the chain stops here.
    Delivered,
    /// Preconditions not met; try the next strategy.
    NotApplicable,
    /// The strategy ran and failed; swallowed, try the next strategy.
    Failed(anyhow::Error),
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("every export strategy failed, including the final download fallback: {0}")]
    Exhausted(String),
}

impl From<ExportError> for String {
    fn from(e: ExportError) -> String {
        e.to_string()
    }
}
