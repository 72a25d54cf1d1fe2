//! Recording session clock
//!
//! Derives an `MM:SS` display from a fixed start instant, ticking once
//! per second until stopped by the recorder's finalize path.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// Format elapsed whole seconds as zero-padded `MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Publishes the elapsed-time display for an active recording.
pub struct SessionClock {
    display_tx: watch::Sender<String>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionClock {
    pub fn new() -> Self {
        let (display_tx, _) = watch::channel(format_elapsed(0));
        Self {
            display_tx,
            ticker: None,
        }
    }

    /// Receiver for the formatted display value.
    pub fn display(&self) -> watch::Receiver<String> {
        self.display_tx.subscribe()
    }

    /// Start ticking from `origin`, updating the display immediately and
    /// then once per second. Restarting cancels any prior ticker.
    pub fn start(&mut self, origin: Instant) {
        self.stop();

        let display_tx = self.display_tx.clone();
        display_tx.send_replace(format_elapsed(elapsed_secs(origin)));

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                display_tx.send_replace(format_elapsed(elapsed_secs(origin)));
            }
        }));
    }

    /// Stop ticking; the last published value stays visible.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.stop();
    }
}

fn elapsed_secs(origin: Instant) -> u64 {
    Instant::now().saturating_duration_since(origin).as_secs()
}
