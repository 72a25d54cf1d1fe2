//! Booth configuration
//!
//! Recognized options, typically supplied through the page URL query
//! string, with a JSON form for embedded hosts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::error::BoothResult;

pub const DEFAULT_START_BACKGROUND: &str = "tela-inicial.png";
pub const DEFAULT_OVERLAY_PATH: &str = "moldura.png";
pub const DEFAULT_MAX_RECORDING_SECS: u64 = 20;

/// Runtime configuration for a booth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Background image for the pre-capture screen.
    #[serde(rename = "capa")]
    pub start_background: String,

    /// Overlay graphic path; omitted from composition when it fails to load.
    #[serde(rename = "moldura")]
    pub overlay_path: String,

    /// Maximum recording duration in seconds.
    #[serde(rename = "dur")]
    pub max_recording_secs: u64,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            start_background: DEFAULT_START_BACKGROUND.to_string(),
            overlay_path: DEFAULT_OVERLAY_PATH.to_string(),
            max_recording_secs: DEFAULT_MAX_RECORDING_SECS,
        }
    }
}

impl BoothConfig {
    /// Parse a URL query string (`?capa=a.png&moldura=b.png&dur=30`).
    ///
    /// Unknown keys are ignored; empty or malformed values fall back to
    /// the defaults.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or_default();
            let raw = parts.next().unwrap_or_default();
            let value = urlencoding::decode(raw)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            if value.is_empty() {
                continue;
            }

            match key {
                "capa" => config.start_background = value,
                "moldura" => config.overlay_path = value,
                "dur" => {
                    if let Ok(secs) = value.parse::<u64>() {
                        if secs > 0 {
                            config.max_recording_secs = secs;
                        }
                    }
                }
                _ => {}
            }
        }

        config
    }

    /// Parse the JSON form (same keys as the query string).
    pub fn from_json(json: &str) -> BoothResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn max_recording_duration(&self) -> Duration {
        Duration::from_secs(self.max_recording_secs)
    }
}
