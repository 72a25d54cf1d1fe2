//! Export strategy objects
//!
//! Each strategy wraps one platform path for persisting a finished
//! binary. The driver tries them in order; a strategy reports
//! delivered, not-applicable, or failed, and never panics the chain.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Duration;

use super::capabilities::{DownloadSink, FileShare, SaveDialog};
use super::environment::BrowserEnvironment;
use super::types::{Attempt, ExportRequest, StrategyKind};

/// Grace period before a temporary URL handed to another browsing
/// context is released.
const URL_REVOKE_GRACE: Duration = Duration::from_secs(15);

#[async_trait]
pub trait ExportStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn attempt(&self, request: &ExportRequest) -> Attempt;
}

/// Share sheet restricted to in-app browser contexts, where plain
/// downloads tend to be hijacked or dropped.
pub struct InAppShare {
    pub environment: BrowserEnvironment,
    pub share: Arc<dyn FileShare>,
}

#[async_trait]
impl ExportStrategy for InAppShare {
    fn kind(&self) -> StrategyKind {
        StrategyKind::InAppShare
    }

    async fn attempt(&self, request: &ExportRequest) -> Attempt {
        if !self.environment.is_in_app() || !self.share.can_share(request) {
            return Attempt::NotApplicable;
        }
        match self.share.share(request).await {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// Native save-as dialog, only offered on Android-like contexts and
/// skipped when the caller prefers a plain download.
pub struct NativeSaveDialog {
    pub environment: BrowserEnvironment,
    pub dialog: Arc<dyn SaveDialog>,
}

#[async_trait]
impl ExportStrategy for NativeSaveDialog {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SaveDialog
    }

    async fn attempt(&self, request: &ExportRequest) -> Attempt {
        if !self.environment.is_android() || !self.dialog.is_available() || request.prefer_download
        {
            return Attempt::NotApplicable;
        }
        match self.dialog.save(request).await {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// General share sheet, any context.
pub struct ShareSheet {
    pub share: Arc<dyn FileShare>,
}

#[async_trait]
impl ExportStrategy for ShareSheet {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Share
    }

    async fn attempt(&self, request: &ExportRequest) -> Attempt {
        if !self.share.can_share(request) {
            return Attempt::NotApplicable;
        }
        match self.share.share(request).await {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// New-tab fallback for platforms that mishandle programmatic downloads
/// (iOS). Falls back further to in-place navigation when the new
/// context cannot open; the temporary URL is released after a grace
/// delay so the other context can finish reading it.
pub struct NewTabFallback {
    pub environment: BrowserEnvironment,
    pub sink: Arc<dyn DownloadSink>,
}

#[async_trait]
impl ExportStrategy for NewTabFallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NewTab
    }

    async fn attempt(&self, request: &ExportRequest) -> Attempt {
        if !self.environment.is_ios() {
            return Attempt::NotApplicable;
        }

        let url = self.sink.create_url(request);
        if !self.sink.open_in_new_context(&url) {
            tracing::debug!("new context blocked, navigating in place");
            self.sink.navigate_current(&url);
        }

        let sink = self.sink.clone();
        tokio::spawn(async move {
            tokio::time::sleep(URL_REVOKE_GRACE).await;
            sink.revoke_url(&url);
        });

        Attempt::Delivered
    }
}

/// Direct download: the unconditional final fallback. Always executable
/// on entry; only its own failure can exhaust the chain.
pub struct DirectDownload {
    pub sink: Arc<dyn DownloadSink>,
}

#[async_trait]
impl ExportStrategy for DirectDownload {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Download
    }

    async fn attempt(&self, request: &ExportRequest) -> Attempt {
        let url = self.sink.create_url(request);
        let outcome = self.sink.trigger_download(&url, &request.filename);
        self.sink.revoke_url(&url);
        match outcome {
            Ok(()) => Attempt::Delivered,
            Err(e) => Attempt::Failed(e),
        }
    }
}
