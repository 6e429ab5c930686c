//! Signal recording with timeouts.

use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use wallet_view::signals::WalletSignal;

/// Default wait for an expected signal.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Collects signals from a subscription and waits for specific ones.
pub struct SignalRecorder {
    rx: broadcast::Receiver<WalletSignal>,
    seen: Vec<WalletSignal>,
    timeout: Duration,
}

impl SignalRecorder {
    /// Wrap a subscription.
    pub fn new(rx: broadcast::Receiver<WalletSignal>) -> Self {
        Self {
            rx,
            seen: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the wait used by [`expect`](Self::expect).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every signal received so far.
    pub fn seen(&self) -> &[WalletSignal] {
        &self.seen
    }

    /// Next signal, or `None` after the timeout.
    pub async fn next(&mut self) -> Option<WalletSignal> {
        loop {
            match tokio::time::timeout(self.timeout, self.rx.recv()).await {
                Ok(Ok(signal)) => {
                    self.seen.push(signal.clone());
                    return Some(signal);
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "signal recorder lagged");
                }
                Ok(Err(RecvError::Closed)) | Err(_) => return None,
            }
        }
    }

    /// Wait for the first signal matching `pred`, skipping others.
    ///
    /// Panics with the signals seen so far if none arrives in time.
    pub async fn expect<F>(&mut self, what: &str, pred: F) -> WalletSignal
    where
        F: Fn(&WalletSignal) -> bool,
    {
        while let Some(signal) = self.next().await {
            if pred(&signal) {
                return signal;
            }
        }
        panic!("timed out waiting for {what}; saw {:#?}", self.seen);
    }

    /// Collect matching signals until `stop` matches (inclusive).
    pub async fn collect_until<F, S>(&mut self, keep: F, stop: S) -> Vec<WalletSignal>
    where
        F: Fn(&WalletSignal) -> bool,
        S: Fn(&WalletSignal) -> bool,
    {
        let mut out = Vec::new();
        while let Some(signal) = self.next().await {
            let done = stop(&signal);
            if keep(&signal) {
                out.push(signal);
            }
            if done {
                return out;
            }
        }
        panic!("timed out collecting signals; saw {:#?}", self.seen);
    }

    /// Everything already queued, without waiting.
    pub fn drain(&mut self) -> Vec<WalletSignal> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(signal) => {
                    self.seen.push(signal.clone());
                    out.push(signal);
                }
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return out,
            }
        }
    }
}
