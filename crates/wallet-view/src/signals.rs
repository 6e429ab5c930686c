//! # Outward Signals
//!
//! Typed events published to the presentation shell on a broadcast channel.
//! Any number of frontends may subscribe; publishing with none is a no-op.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::encryption::EncryptionState;
use crate::notifications::TransactionNotification;
use crate::progress::{OperationKind, OperationOutcome};
use crate::router::NavigationTarget;

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageSeverity {
    /// Informational
    Information,
    /// Something the user should look at
    Warning,
    /// An operation failed
    Error,
}

/// Why the shell should ask for a passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassphrasePurpose {
    /// Unlock the wallet
    Unlock,
}

/// Auxiliary dialogs the shell may open on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogRequest {
    /// Sign a message, optionally with a pre-selected address
    SignMessage {
        /// Pre-filled address
        address: Option<String>,
    },
    /// Verify a message, optionally with a pre-selected address
    VerifyMessage {
        /// Pre-filled address
        address: Option<String>,
    },
    /// Addresses previously sent to
    UsedSendingAddresses,
    /// Addresses previously handed out for receiving
    UsedReceivingAddresses,
    /// Print paper wallets
    PaperWallets,
    /// Debug console / information window
    Debug,
    /// Insert a comment into the block chain
    BlockchainComment,
    /// Register or look up an openname
    OpenName,
}

/// Every event the coordinator publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "debug-serialize", derive(Serialize))]
pub enum WalletSignal {
    /// Raise the main window
    ShowNormalIfMinimized,
    /// Report something to the user
    Message {
        /// Title
        title: String,
        /// Body
        body: String,
        /// Severity
        severity: MessageSeverity,
    },
    /// The encryption state changed (or was re-announced)
    EncryptionStatusChanged(EncryptionState),
    /// A new transaction appeared
    IncomingTransaction(TransactionNotification),
    /// The current page changed
    PageChanged(NavigationTarget),
    /// Show, update or close (at 100) a progress indicator
    ShowProgress {
        /// Title
        title: String,
        /// Percent complete, 0..=100
        percent: u8,
        /// Whether a cancel button should be offered
        cancellable: bool,
    },
    /// A long-running operation reached a terminal outcome
    OperationFinished {
        /// Operation kind
        kind: OperationKind,
        /// How it ended
        outcome: OperationOutcome,
    },
    /// Show or hide the out-of-sync warning
    OutOfSyncWarning(bool),
    /// Ask the user for a passphrase
    PassphraseRequested(PassphrasePurpose),
    /// Open an auxiliary dialog
    OpenDialog(DialogRequest),
    /// The shell should exit (backup-and-quit finished)
    QuitRequested,
}

impl WalletSignal {
    /// Build a message signal.
    pub fn message(
        title: impl Into<String>,
        body: impl Into<String>,
        severity: MessageSeverity,
    ) -> Self {
        Self::Message {
            title: title.into(),
            body: body.into(),
            severity,
        }
    }
}

/// Broadcast publisher for [`WalletSignal`]s.
#[derive(Debug, Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<WalletSignal>,
}

impl SignalBus {
    /// Create a bus retaining up to `capacity` undelivered signals per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future signals.
    pub fn subscribe(&self) -> broadcast::Receiver<WalletSignal> {
        self.tx.subscribe()
    }

    /// Publish a signal.
    pub fn emit(&self, signal: WalletSignal) {
        tracing::trace!(?signal, "emit");
        // No subscribers is not an error: the shell may not be attached yet.
        let _ = self.tx.send(signal);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
