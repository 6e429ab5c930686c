//! # Model Boundary: Wallet and Client Collaborators
//!
//! This module defines the traits and event types through which the
//! coordinator talks to the two external collaborators:
//!
//! - the **wallet model**, which owns the ledger and key material and performs
//!   every slow operation (encryption, backup, import, rescan)
//! - the **client model**, which is wallet-agnostic and reports network sync
//!
//! ```text
//! wallet-view (pure)              wallet runtime
//! ┌──────────────────────┐        ┌───────────────────┐
//! │ WalletViewCoordinator│        │ implements        │
//! │   ┌──────────────┐   │◄───────│   WalletModel     │
//! │   │ WalletModel  │   │        │   RecordAccessor  │
//! │   └──────────────┘   │        └───────────────────┘
//! │  inbox ◄── WalletEvent / ClientEvent (any thread)   │
//! └──────────────────────┘
//! ```
//!
//! Events are delivered through `CoordinatorHandle`, which marshals them onto
//! the coordination task; models never call into the coordinator directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::encryption::{EncryptionState, Passphrase};
use crate::errors::BackendError;
use crate::progress::OperationContext;

// =============================================================================
// Ledger records
// =============================================================================

/// Stable identifier of a ledger record (transaction hash plus output slot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Create a record id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scope under which records were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentScope {
    /// Top level of the ledger
    #[default]
    Root,
    /// Children of a grouping record
    Nested(RecordId),
}

/// Detailed fields of one ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Stable record identifier
    pub id: RecordId,
    /// Transaction time shown to the user
    pub date: DateTime<Utc>,
    /// When the wallet first saw the record
    pub inserted_at: DateTime<Utc>,
    /// Credit minus debit, in base units
    pub net_amount: i64,
    /// Reward / coinbase record
    pub generated: bool,
    /// Counterparty or receiving address
    pub address: String,
}

/// Notification that records `[start, end)` were inserted under `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionEvent {
    /// Parent scope
    pub parent: ParentScope,
    /// First inserted index
    pub start: usize,
    /// One past the last inserted index
    pub end: usize,
}

impl InsertionEvent {
    /// Insertion at the ledger root.
    #[must_use]
    pub fn root(start: usize, end: usize) -> Self {
        Self {
            parent: ParentScope::Root,
            start,
            end,
        }
    }

    /// Number of inserted records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check for an empty range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves a record index to its fields.
///
/// Returns `None` when the index no longer resolves (for example after a
/// concurrent reorganisation).
pub trait RecordAccessor: Send + Sync {
    /// Look up the record at `index` under `parent`.
    fn record(&self, parent: &ParentScope, index: usize) -> Option<LedgerRecord>;
}

// =============================================================================
// Import material
// =============================================================================

/// Private key text handed to the wallet for import. Zeroized, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyText(Zeroizing<String>);

impl PrivateKeyText {
    /// Wrap key text.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the secret for handing to the wallet model.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PrivateKeyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyText(<redacted>)")
    }
}

/// How a long-running operation ended from the wallet's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCompletion {
    /// Ran to completion
    Completed,
    /// Honoured a cancellation request
    Cancelled,
}

// =============================================================================
// Wallet model
// =============================================================================

/// Capability trait for the wallet collaborator.
///
/// Every async method may be slow (disk I/O, key derivation); the coordinator
/// only calls them from worker tasks.
#[async_trait]
pub trait WalletModel: Send + Sync {
    /// Current encryption flag of the wallet file.
    fn encryption_status(&self) -> EncryptionState;

    /// Encrypt an unencrypted wallet.
    async fn encrypt_wallet(&self, passphrase: &Passphrase) -> Result<(), BackendError>;

    /// Unlock the key material.
    async fn unlock(
        &self,
        passphrase: &Passphrase,
        for_spending_only: bool,
    ) -> Result<(), BackendError>;

    /// Lock the key material.
    async fn lock(&self) -> Result<(), BackendError>;

    /// Replace the passphrase, preserving the lock state.
    async fn change_passphrase(
        &self,
        old: &Passphrase,
        new: &Passphrase,
    ) -> Result<(), BackendError>;

    /// Write a backup of the wallet file to `destination`.
    async fn backup(
        &self,
        destination: &Path,
        ctx: OperationContext,
    ) -> Result<TaskCompletion, BackendError>;

    /// Import a private key.
    async fn import_private_key(
        &self,
        key: &PrivateKeyText,
        ctx: OperationContext,
    ) -> Result<TaskCompletion, BackendError>;

    /// Re-scan the ledger for wallet transactions.
    async fn rescan(&self, ctx: OperationContext) -> Result<TaskCompletion, BackendError>;

    /// Accessor used to resolve inserted record indices.
    fn record_accessor(&self) -> Arc<dyn RecordAccessor>;
}

/// Events pushed by the wallet model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Records were inserted into the ledger
    RecordsInserted(InsertionEvent),
    /// Progress of a wallet-driven operation (0 starts, 100 ends)
    ShowProgress {
        /// Progress title
        title: String,
        /// Percent complete
        percent: i32,
    },
    /// The wallet's encryption flag changed outside the coordinator
    EncryptionStatusObserved(EncryptionState),
}

/// Events pushed by the client (network) model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Network sync progress
    SyncProgress {
        /// Progress title
        title: String,
        /// Percent complete
        percent: i32,
    },
    /// Whether the chain tip is stale
    OutOfSync(bool),
    /// Whether the client is in initial block download
    InitialSync(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_len() {
        assert_eq!(InsertionEvent::root(3, 5).len(), 2);
        assert!(InsertionEvent::root(5, 5).is_empty());
        assert!(InsertionEvent::root(6, 5).is_empty());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKeyText::new("5Kb8kLf9zgWQnogidDA76MzPL6TsZZY36hWXMssSzNydYXYB9KF");
        assert_eq!(format!("{key:?}"), "PrivateKeyText(<redacted>)");
    }
}
