//! Host export capabilities
//!
//! Platform primitives the export strategies are built on. Failures are
//! reported as opaque errors; the driver swallows them and advances the
//! chain.

use async_trait::async_trait;

use super::types::ExportRequest;

/// Share sheet accepting file attachments.
#[async_trait]
pub trait FileShare: Send + Sync {
    /// Whether the platform can share this file at all.
    fn can_share(&self, request: &ExportRequest) -> bool;

    /// Invoke the share sheet; resolves once the user completes or
    /// dismisses it.
    async fn share(&self, request: &ExportRequest) -> anyhow::Result<()>;
}

/// Native save-as dialog, present only on some platforms.
#[async_trait]
pub trait SaveDialog: Send + Sync {
    fn is_available(&self) -> bool;

    async fn save(&self, request: &ExportRequest) -> anyhow::Result<()>;
}

/// Object-URL and navigation primitives backing downloads.
pub trait DownloadSink: Send + Sync {
    /// Materialize a temporary URL for the binary.
    fn create_url(&self, request: &ExportRequest) -> String;

    /// Release a temporary URL.
    fn revoke_url(&self, url: &str);

    /// Trigger a browser-native download of the URL under the given
    /// filename (a synthesized, immediately-invoked anchor click).
    fn trigger_download(&self, url: &str, filename: &str) -> anyhow::Result<()>;

    /// Open the URL in a new browsing context; `false` when the context
    /// could not be opened.
    fn open_in_new_context(&self, url: &str) -> bool;

    /// Navigate the current context to the URL.
    fn navigate_current(&self, url: &str);
}
