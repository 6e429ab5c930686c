//! Wallet encryption state machine.
//!
//! Transitions are two-phase so the slow wallet call can run off the
//! coordination task:
//!
//! 1. [`WalletStateMachine::begin`] checks the precondition and reserves the
//!    credential lock, returning a [`CredentialTicket`]
//! 2. the caller runs [`dispatch`] against the wallet model
//! 3. [`WalletStateMachine::finish`] applies the result
//!
//! The async convenience methods (`encrypt`, `unlock`, `lock`,
//! `change_passphrase`) run all three steps inline.

use std::sync::Arc;

use super::{EncryptionState, Passphrase, PassphrasePolicy};
use crate::errors::{
    BackendError, ChangeError, CredentialError, EncryptionError, LockError, UnlockError,
};
use crate::models::WalletModel;
use crate::progress::OperationKind;

/// A credential operation with its secrets.
#[derive(Debug, Clone)]
pub enum CredentialRequest {
    /// Encrypt an unencrypted wallet
    Encrypt {
        /// New passphrase
        passphrase: Passphrase,
    },
    /// Unlock a locked wallet
    Unlock {
        /// Current passphrase
        passphrase: Passphrase,
        /// Grant spending access only
        for_spending_only: bool,
    },
    /// Lock an unlocked wallet
    Lock,
    /// Replace the passphrase
    ChangePassphrase {
        /// Current passphrase
        old: Passphrase,
        /// Replacement passphrase
        new: Passphrase,
    },
}

impl CredentialRequest {
    /// The operation without its secrets.
    #[must_use]
    pub fn op(&self) -> CredentialOp {
        match self {
            Self::Encrypt { .. } => CredentialOp::Encrypt,
            Self::Unlock {
                for_spending_only, ..
            } => CredentialOp::Unlock {
                for_spending_only: *for_spending_only,
            },
            Self::Lock => CredentialOp::Lock,
            Self::ChangePassphrase { .. } => CredentialOp::ChangePassphrase,
        }
    }
}

/// Secret-free description of a credential operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialOp {
    /// Encrypt
    Encrypt,
    /// Unlock
    Unlock {
        /// Spending-only access
        for_spending_only: bool,
    },
    /// Lock
    Lock,
    /// Change passphrase
    ChangePassphrase,
}

impl CredentialOp {
    /// State reached on success; `None` leaves the state unchanged.
    #[must_use]
    pub fn target(self) -> Option<EncryptionState> {
        match self {
            Self::Encrypt | Self::Lock => Some(EncryptionState::Locked),
            Self::Unlock {
                for_spending_only: true,
            } => Some(EncryptionState::UnlockedForSpendingOnly),
            Self::Unlock {
                for_spending_only: false,
            } => Some(EncryptionState::UnlockedFully),
            Self::ChangePassphrase => None,
        }
    }
}

/// Proof that a credential operation passed its precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket holds the credential lock until passed to `finish`"]
pub struct CredentialTicket {
    id: u64,
    op: CredentialOp,
}

impl CredentialTicket {
    /// The reserved operation.
    pub fn op(&self) -> CredentialOp {
        self.op
    }
}

/// A state change produced by a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before
    pub from: EncryptionState,
    /// State after
    pub to: EncryptionState,
}

/// Owns the encryption state and enforces the legal transitions.
pub struct WalletStateMachine {
    model: Arc<dyn WalletModel>,
    policy: PassphrasePolicy,
    state: EncryptionState,
    in_flight: Option<CredentialTicket>,
    next_ticket: u64,
    faulted: bool,
}

impl WalletStateMachine {
    /// Create a machine mirroring the wallet's current encryption flag.
    pub fn new(model: Arc<dyn WalletModel>, policy: PassphrasePolicy) -> Self {
        let state = model.encryption_status();
        tracing::debug!(?state, "encryption state initialised from wallet");
        Self {
            model,
            policy,
            state,
            in_flight: None,
            next_ticket: 0,
            faulted: false,
        }
    }

    /// Pure read of the current state.
    #[must_use]
    pub fn current_state(&self) -> EncryptionState {
        self.state
    }

    /// Whether a credential operation holds the lock.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a fatal backend failure froze the machine.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// The wallet-operations capability this machine drives.
    pub fn model(&self) -> &Arc<dyn WalletModel> {
        &self.model
    }

    /// Check a request against the current state and reserve the credential lock.
    ///
    /// `pending` is the kind of the live long-running operation, if any. Lock
    /// is refused while it needs key material; encryption and passphrase
    /// changes are refused while it pins the wallet file.
    pub fn begin(
        &mut self,
        request: &CredentialRequest,
        pending: Option<OperationKind>,
    ) -> Result<CredentialTicket, CredentialError> {
        if self.faulted {
            return Err(CredentialError::Faulted);
        }
        if self.in_flight.is_some() {
            return Err(CredentialError::OperationInProgress);
        }
        let key_material_in_use = pending.is_some_and(OperationKind::requires_key_material);
        let wallet_file_pinned = pending.is_some_and(OperationKind::pins_wallet_file);

        match (request, self.state) {
            (CredentialRequest::Encrypt { .. }, state) if state.is_encrypted() => {
                return Err(CredentialError::AlreadyEncrypted);
            }
            (CredentialRequest::Encrypt { .. }, _) if wallet_file_pinned => {
                return Err(CredentialError::OperationInProgress);
            }
            (CredentialRequest::Encrypt { passphrase }, _) => self.policy.check(passphrase)?,

            (CredentialRequest::Unlock { .. }, EncryptionState::Unencrypted) => {
                return Err(CredentialError::NotEncrypted);
            }
            (CredentialRequest::Unlock { .. }, EncryptionState::Locked) => {}
            (
                CredentialRequest::Unlock {
                    for_spending_only: false,
                    ..
                },
                EncryptionState::UnlockedForSpendingOnly,
            ) => {}
            (CredentialRequest::Unlock { .. }, _) => {
                return Err(CredentialError::AlreadyUnlocked);
            }

            (CredentialRequest::Lock, EncryptionState::Unencrypted) => {
                return Err(CredentialError::NotEncrypted);
            }
            (CredentialRequest::Lock, EncryptionState::Locked) => {
                return Err(CredentialError::NotUnlocked);
            }
            (CredentialRequest::Lock, _) if key_material_in_use => {
                return Err(CredentialError::OperationInProgress);
            }
            (CredentialRequest::Lock, _) => {}

            (CredentialRequest::ChangePassphrase { .. }, EncryptionState::Unencrypted) => {
                return Err(CredentialError::NotEncrypted);
            }
            (CredentialRequest::ChangePassphrase { .. }, _) if wallet_file_pinned => {
                return Err(CredentialError::OperationInProgress);
            }
            (CredentialRequest::ChangePassphrase { new, .. }, _) => self.policy.check(new)?,
        }

        self.next_ticket += 1;
        let ticket = CredentialTicket {
            id: self.next_ticket,
            op: request.op(),
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Apply the wallet model's result and release the credential lock.
    ///
    /// Returns the transition when the state changed.
    pub fn finish(
        &mut self,
        ticket: CredentialTicket,
        result: Result<(), BackendError>,
    ) -> Result<Option<Transition>, CredentialError> {
        if self.in_flight != Some(ticket) {
            return Err(CredentialError::Stale);
        }
        self.in_flight = None;

        if let Err(e) = result {
            return Err(match e {
                BackendError::WrongPassphrase => CredentialError::WrongPassphrase,
                BackendError::Failed(reason) => {
                    tracing::warn!(op = ?ticket.op, %reason, "credential operation failed");
                    CredentialError::BackendFailure(reason)
                }
                BackendError::Fatal(reason) => {
                    tracing::warn!(op = ?ticket.op, %reason, "fatal wallet failure; freezing encryption state");
                    self.faulted = true;
                    CredentialError::BackendFailure(reason)
                }
            });
        }

        let Some(to) = ticket.op.target() else {
            tracing::info!(op = ?ticket.op, state = ?self.state, "credential operation succeeded");
            return Ok(None);
        };
        let from = self.state;
        self.state = to;
        tracing::info!(?from, ?to, "encryption state changed");
        Ok(Some(Transition { from, to }))
    }

    /// Mirror an encryption flag observed outside the coordinator.
    ///
    /// Ignored while a credential operation is in flight or after a fault.
    pub fn reconcile(&mut self, observed: EncryptionState) -> Option<Transition> {
        if self.faulted || self.in_flight.is_some() || observed == self.state {
            return None;
        }
        let from = self.state;
        self.state = observed;
        tracing::info!(?from, to = ?observed, "encryption state reconciled with wallet");
        Some(Transition { from, to: observed })
    }

    /// Run a request inline: begin, call the wallet, finish.
    pub async fn execute(
        &mut self,
        request: CredentialRequest,
        pending: Option<OperationKind>,
    ) -> Result<Option<Transition>, CredentialError> {
        let ticket = self.begin(&request, pending)?;
        let model = Arc::clone(&self.model);
        let result = dispatch(model.as_ref(), &request).await;
        self.finish(ticket, result)
    }

    /// Encrypt an unencrypted wallet; the wallet ends `Locked`.
    pub async fn encrypt(&mut self, passphrase: Passphrase) -> Result<(), EncryptionError> {
        self.execute(CredentialRequest::Encrypt { passphrase }, None)
            .await
            .map(|_| ())
    }

    /// Unlock a locked wallet, or upgrade spending-only access to full access.
    pub async fn unlock(
        &mut self,
        passphrase: Passphrase,
        for_spending_only: bool,
    ) -> Result<(), UnlockError> {
        self.execute(
            CredentialRequest::Unlock {
                passphrase,
                for_spending_only,
            },
            None,
        )
        .await
        .map(|_| ())
    }

    /// Lock an unlocked wallet.
    pub async fn lock(&mut self, pending: Option<OperationKind>) -> Result<(), LockError> {
        self.execute(CredentialRequest::Lock, pending)
            .await
            .map(|_| ())
    }

    /// Replace the passphrase without changing the lock state.
    pub async fn change_passphrase(
        &mut self,
        old: Passphrase,
        new: Passphrase,
        pending: Option<OperationKind>,
    ) -> Result<(), ChangeError> {
        self.execute(CredentialRequest::ChangePassphrase { old, new }, pending)
            .await
            .map(|_| ())
    }
}

/// Call the wallet model for a credential request.
pub async fn dispatch(
    model: &dyn WalletModel,
    request: &CredentialRequest,
) -> Result<(), BackendError> {
    match request {
        CredentialRequest::Encrypt { passphrase } => model.encrypt_wallet(passphrase).await,
        CredentialRequest::Unlock {
            passphrase,
            for_spending_only,
        } => model.unlock(passphrase, *for_spending_only).await,
        CredentialRequest::Lock => model.lock().await,
        CredentialRequest::ChangePassphrase { old, new } => {
            model.change_passphrase(old, new).await
        }
    }
}
