//! # Progress Coordination
//!
//! Tracks the single long-running wallet operation (rescan, import, backup),
//! its percent complete and cooperative cancellation.
//!
//! At most one [`PendingOperation`] exists at a time; `begin` while one is live
//! fails with [`BusyError::AlreadyRunning`]. Handles are generation-tagged so a
//! late `update`/`end` for an operation that already finished is dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::{BusyError, CancelError};

/// Kind of long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Re-scan the ledger for wallet transactions
    Rescan,
    /// Import a private key
    Import,
    /// Write a wallet backup
    Backup,
}

impl OperationKind {
    /// Whether the kind honours cancellation requests at all.
    ///
    /// A key import is a single atomic write.
    #[must_use]
    pub fn supports_cancellation(self) -> bool {
        match self {
            Self::Rescan | Self::Backup => true,
            Self::Import => false,
        }
    }

    /// Whether the operation needs unlocked key material while it runs.
    #[must_use]
    pub fn requires_key_material(self) -> bool {
        matches!(self, Self::Import)
    }

    /// Whether the wallet file must not be re-encrypted while the operation
    /// runs (it copies or extends the key store).
    #[must_use]
    pub fn pins_wallet_file(self) -> bool {
        matches!(self, Self::Import | Self::Backup)
    }

    /// Default progress title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Rescan => "Rescanning...",
            Self::Import => "Importing private key...",
            Self::Backup => "Backing up wallet...",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rescan => "rescan",
            Self::Import => "import",
            Self::Backup => "backup",
        })
    }
}

/// Opaque reference to a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressHandle(u64);

impl ProgressHandle {
    /// Raw generation number (for logging).
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Terminal outcome of a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationOutcome {
    /// Completed normally
    Success,
    /// Stopped after a cancellation request
    Cancelled,
    /// Failed with a reason
    Failed(String),
}

/// The live long-running operation.
#[derive(Debug)]
pub struct PendingOperation {
    handle: ProgressHandle,
    kind: OperationKind,
    progress_percent: u8,
    cancellable: bool,
    cancel_requested: bool,
    cancel_tx: watch::Sender<bool>,
}

impl PendingOperation {
    /// Handle identifying this operation.
    #[must_use]
    pub fn handle(&self) -> ProgressHandle {
        self.handle
    }

    /// Operation kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Last reported percent, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    /// Whether a cancel request would currently be accepted.
    #[must_use]
    pub fn cancellable(&self) -> bool {
        self.cancellable
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }
}

/// Progress notifications produced by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Percent changed
    Updated {
        /// Operation handle
        handle: ProgressHandle,
        /// Operation kind
        kind: OperationKind,
        /// Clamped percent
        percent: u8,
    },
    /// Operation ended
    Finished {
        /// Operation handle
        handle: ProgressHandle,
        /// Operation kind
        kind: OperationKind,
        /// How it ended
        outcome: OperationOutcome,
    },
}

/// Tracks at most one pending operation.
#[derive(Debug, Default)]
pub struct ProgressCoordinator {
    next_id: u64,
    pending: Option<PendingOperation>,
}

impl ProgressCoordinator {
    /// Create an idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live operation, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingOperation> {
        self.pending.as_ref()
    }

    /// Kind of the live operation, if any.
    #[must_use]
    pub fn pending_kind(&self) -> Option<OperationKind> {
        self.pending.as_ref().map(PendingOperation::kind)
    }

    /// Whether the live operation needs unlocked key material.
    #[must_use]
    pub fn key_material_in_use(&self) -> bool {
        self.pending_kind()
            .is_some_and(OperationKind::requires_key_material)
    }

    /// Start tracking a new operation at 0%.
    pub fn begin(&mut self, kind: OperationKind) -> Result<ProgressHandle, BusyError> {
        if let Some(existing) = &self.pending {
            tracing::debug!(requested = ?kind, running = ?existing.kind, "operation rejected");
            return Err(BusyError::AlreadyRunning(existing.kind));
        }

        self.next_id += 1;
        let handle = ProgressHandle(self.next_id);
        let (cancel_tx, _cancel_rx) = watch::channel(false);
        self.pending = Some(PendingOperation {
            handle,
            kind,
            progress_percent: 0,
            cancellable: kind.supports_cancellation(),
            cancel_requested: false,
            cancel_tx,
        });
        tracing::info!(handle = handle.id(), ?kind, "operation started");
        Ok(handle)
    }

    /// Cancellation signal for the operation, `None` if the handle is stale.
    pub fn cancellation(&self, handle: ProgressHandle) -> Option<CancellationSignal> {
        self.live(handle).map(|op| CancellationSignal {
            rx: op.cancel_tx.subscribe(),
        })
    }

    /// Record progress. Stale handles are ignored.
    pub fn update(&mut self, handle: ProgressHandle, percent: i32) -> Option<ProgressEvent> {
        let Some(op) = self.live_mut(handle) else {
            tracing::debug!(handle = handle.id(), percent, "dropping stale progress update");
            return None;
        };
        let clamped = percent.clamp(0, 100) as u8;
        op.progress_percent = clamped;
        Some(ProgressEvent::Updated {
            handle,
            kind: op.kind,
            percent: clamped,
        })
    }

    /// Mark the operation as past its point of no return.
    ///
    /// Returns false for a stale handle.
    pub fn commit(&mut self, handle: ProgressHandle) -> bool {
        match self.live_mut(handle) {
            Some(op) => {
                op.cancellable = false;
                true
            }
            None => false,
        }
    }

    /// Request cooperative cancellation.
    ///
    /// The operation keeps running until it reports a terminal outcome.
    pub fn cancel(&mut self, handle: ProgressHandle) -> Result<(), CancelError> {
        let op = self.live_mut(handle).ok_or(CancelError::Stale)?;
        if !op.cancellable {
            return Err(CancelError::NotCancellable(op.kind));
        }
        op.cancel_requested = true;
        op.cancel_tx.send_replace(true);
        tracing::info!(handle = handle.id(), kind = ?op.kind, "cancellation requested");
        Ok(())
    }

    /// Destroy the operation. Stale handles are ignored.
    pub fn end(
        &mut self,
        handle: ProgressHandle,
        outcome: OperationOutcome,
    ) -> Option<ProgressEvent> {
        if self.live(handle).is_none() {
            tracing::debug!(handle = handle.id(), ?outcome, "dropping stale completion");
            return None;
        }
        let op = self.pending.take()?;
        tracing::info!(handle = handle.id(), kind = ?op.kind, ?outcome, "operation finished");
        Some(ProgressEvent::Finished {
            handle,
            kind: op.kind,
            outcome,
        })
    }

    fn live(&self, handle: ProgressHandle) -> Option<&PendingOperation> {
        self.pending.as_ref().filter(|op| op.handle == handle)
    }

    fn live_mut(&mut self, handle: ProgressHandle) -> Option<&mut PendingOperation> {
        self.pending.as_mut().filter(|op| op.handle == handle)
    }
}

// ============================================================================
// Worker-side helpers
// ============================================================================

/// Cooperative cancellation flag observed by the running operation.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Check without waiting.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is requested.
    ///
    /// Pends forever once the operation has ended without a request.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Report emitted by a running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressReport {
    /// Percent complete
    Percent(i32),
    /// Past the point of no return; cancellation no longer possible
    Committed,
}

type ReportSink = Arc<dyn Fn(ProgressHandle, ProgressReport) + Send + Sync>;

/// Forwards progress from a worker back to the coordination task.
#[derive(Clone)]
pub struct ProgressReporter {
    handle: ProgressHandle,
    sink: ReportSink,
}

impl ProgressReporter {
    /// Create a reporter that hands reports to `sink`.
    pub fn new<F>(handle: ProgressHandle, sink: F) -> Self
    where
        F: Fn(ProgressHandle, ProgressReport) + Send + Sync + 'static,
    {
        Self {
            handle,
            sink: Arc::new(sink),
        }
    }

    /// A reporter that discards everything.
    pub fn detached(handle: ProgressHandle) -> Self {
        Self::new(handle, |_, _| {})
    }

    /// Report percent complete.
    pub fn percent(&self, percent: i32) {
        (self.sink)(self.handle, ProgressReport::Percent(percent));
    }

    /// Report the point of no return.
    pub fn commit(&self) {
        (self.sink)(self.handle, ProgressReport::Committed);
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Everything a long-running wallet operation receives.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Operation handle
    pub handle: ProgressHandle,
    /// Cooperative cancellation flag
    pub cancellation: CancellationSignal,
    /// Progress sink
    pub reporter: ProgressReporter,
}
