//! # Encryption Lifecycle
//!
//! The wallet's encryption/lock state and the guarded transitions around it.
//!
//! ```text
//! Unencrypted ──encrypt──▶ Locked ◀──lock── UnlockedForSpendingOnly
//!                            │  ▲                 │
//!                          unlock└──lock──┐   full-unlock
//!                            ▼            │       ▼
//!                      UnlockedFully ◀────┴───────┘
//! ```

mod machine;
mod passphrase;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use machine::{
    dispatch, CredentialOp, CredentialRequest, CredentialTicket, Transition, WalletStateMachine,
};
pub use passphrase::{Passphrase, PassphrasePolicy};

/// Whether the wallet's key material is protected and currently accessible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionState {
    /// No passphrase protects the keys
    Unencrypted,
    /// Keys are encrypted and inaccessible
    Locked,
    /// Keys are usable for spending only
    UnlockedForSpendingOnly,
    /// Keys are fully accessible
    UnlockedFully,
}

impl EncryptionState {
    /// Check whether a passphrase protects the wallet.
    #[must_use]
    pub fn is_encrypted(self) -> bool {
        !matches!(self, Self::Unencrypted)
    }

    /// Check whether the wallet is in either unlocked state.
    #[must_use]
    pub fn is_unlocked(self) -> bool {
        matches!(self, Self::UnlockedForSpendingOnly | Self::UnlockedFully)
    }

    /// Check whether new private keys may be written.
    #[must_use]
    pub fn allows_key_import(self) -> bool {
        matches!(self, Self::Unencrypted | Self::UnlockedFully)
    }

    /// Get a short label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unencrypted => "Unencrypted",
            Self::Locked => "Locked",
            Self::UnlockedForSpendingOnly => "Unlocked for spending only",
            Self::UnlockedFully => "Unlocked",
        }
    }
}

impl fmt::Display for EncryptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
