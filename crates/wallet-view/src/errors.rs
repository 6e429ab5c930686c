//! Categorized coordinator errors
//!
//! Provides structured error types that enable:
//! - Categorized error handling (credential vs concurrency vs validation)
//! - Message severity routing for the presentation shell
//! - Silent dropping of benign races (stale references)

use std::fmt;

use thiserror::Error;

pub use crate::signals::MessageSeverity;

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Wrong/weak passphrase, already encrypted, not encrypted
    Credential,
    /// Another operation is already in progress
    Concurrency,
    /// Malformed payment request or address
    Validation,
    /// Underlying crypto or storage failure
    Backend,
    /// Progress handle or record index no longer valid
    StaleReference,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Credential | Self::Validation)
    }

    /// Check if retrying after the current operation completes may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Concurrency)
    }

    /// Stale references are benign races and never reach the user.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::StaleReference)
    }

    /// Get the message severity for this category.
    #[must_use]
    pub fn severity(&self) -> MessageSeverity {
        match self {
            Self::Credential => MessageSeverity::Warning,
            Self::Concurrency => MessageSeverity::Information,
            Self::Validation => MessageSeverity::Warning,
            Self::Backend => MessageSeverity::Error,
            Self::StaleReference => MessageSeverity::Information,
        }
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Credential => "Passphrase",
            Self::Concurrency => "Busy",
            Self::Validation => "Invalid Input",
            Self::Backend => "Wallet Error",
            Self::StaleReference => "Stale",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Credential => "Check the passphrase and try again",
            Self::Concurrency => "Wait for the current operation to finish and retry",
            Self::Validation => "Check the address and amount",
            Self::Backend => "The wallet reported an internal error",
            Self::StaleReference => "No action needed",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Backend Errors
// ============================================================================

/// Failure reported by the wallet model for a delegated operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The supplied passphrase does not decrypt the key material
    #[error("the passphrase entered was incorrect")]
    WrongPassphrase,
    /// The operation failed and left the wallet unchanged
    #[error("{0}")]
    Failed(String),
    /// The operation failed and the wallet is in an unknown state
    #[error("fatal wallet error: {0}")]
    Fatal(String),
}

impl BackendError {
    /// Create a recoverable failure.
    pub fn failed(why: impl Into<String>) -> Self {
        Self::Failed(why.into())
    }

    /// Create a fatal failure.
    pub fn fatal(why: impl Into<String>) -> Self {
        Self::Fatal(why.into())
    }

    /// Check whether this failure should freeze the encryption state.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

// ============================================================================
// Credential Errors
// ============================================================================

/// Errors from encryption state transitions.
///
/// One enum covers all four credential operations; each operation documents
/// the subset of variants it can return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// `encrypt` on a wallet that is already encrypted
    #[error("wallet is already encrypted")]
    AlreadyEncrypted,
    /// `unlock`, `lock` or `changePassphrase` on an unencrypted wallet
    #[error("wallet is not encrypted")]
    NotEncrypted,
    /// `unlock` when the requested access is already granted
    #[error("wallet is already unlocked")]
    AlreadyUnlocked,
    /// `lock` on a wallet that is already locked
    #[error("wallet is not unlocked")]
    NotUnlocked,
    /// The new passphrase does not meet the policy
    #[error("passphrase does not meet the policy: {0}")]
    WeakPassphrase(String),
    /// Uniform rejection of a passphrase, malformed or wrong alike
    #[error("the passphrase entered was incorrect")]
    WrongPassphrase,
    /// A credential operation or key-material user is already live
    #[error("another operation is in progress")]
    OperationInProgress,
    /// The underlying crypto operation failed
    #[error("wallet backend failure: {0}")]
    BackendFailure(String),
    /// A previous fatal failure froze the state machine
    #[error("wallet is in a failed state; transitions are disabled")]
    Faulted,
    /// Completion does not match the operation in flight
    #[error("credential operation is no longer in flight")]
    Stale,
}

impl CredentialError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyEncrypted
            | Self::NotEncrypted
            | Self::AlreadyUnlocked
            | Self::NotUnlocked
            | Self::WeakPassphrase(_)
            | Self::WrongPassphrase => ErrorCategory::Credential,
            Self::OperationInProgress => ErrorCategory::Concurrency,
            Self::BackendFailure(_) | Self::Faulted => ErrorCategory::Backend,
            Self::Stale => ErrorCategory::StaleReference,
        }
    }
}

/// Errors from `encrypt`: `AlreadyEncrypted`, `WeakPassphrase`, `BackendFailure`.
pub type EncryptionError = CredentialError;
/// Errors from `unlock`: `WrongPassphrase`, `NotEncrypted`, `AlreadyUnlocked`.
pub type UnlockError = CredentialError;
/// Errors from `lock`: `OperationInProgress`, `NotUnlocked`, `NotEncrypted`.
pub type LockError = CredentialError;
/// Errors from `changePassphrase`: `WrongPassphrase`, `WeakPassphrase`, `NotEncrypted`.
pub type ChangeError = CredentialError;

// ============================================================================
// Progress Errors
// ============================================================================

/// Error from starting a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusyError {
    /// A pending operation already exists
    #[error("a {0} operation is already running")]
    AlreadyRunning(crate::progress::OperationKind),
}

impl BusyError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Concurrency
    }
}

/// Error from requesting cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    /// The operation cannot be cancelled (kind or point of no return)
    #[error("the {0} operation cannot be cancelled")]
    NotCancellable(crate::progress::OperationKind),
    /// The handle refers to an operation that already ended
    #[error("operation handle is stale")]
    Stale,
}

impl CancelError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotCancellable(_) => ErrorCategory::Concurrency,
            Self::Stale => ErrorCategory::StaleReference,
        }
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Reasons a payment request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentRequestError {
    /// The address is not valid for the active network
    #[error("invalid payment address: {0}")]
    InvalidAddress(String),
    /// The amount is outside `(0, max_money]`
    #[error("payment amount {0} is out of range")]
    AmountOutOfRange(i64),
}

impl PaymentRequestError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file extension is neither `.toml` nor `.json`
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    /// The file content could not be parsed
    #[error("invalid config: {0}")]
    Parse(String),
    /// A value is out of its allowed range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

// ============================================================================
// Umbrella Error
// ============================================================================

/// Any error the coordinator can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletViewError {
    /// Encryption state transition failed
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// Long-running operation could not start
    #[error(transparent)]
    Busy(#[from] BusyError),
    /// Cancellation request failed
    #[error(transparent)]
    Cancel(#[from] CancelError),
    /// Payment request rejected
    #[error(transparent)]
    PaymentRequest(#[from] PaymentRequestError),
    /// Wallet model failure outside a credential transition
    #[error("wallet backend failure: {0}")]
    Backend(#[from] BackendError),
    /// The wallet must be unlocked first
    #[error("wallet is locked")]
    WalletLocked,
    /// The coordinator task has stopped
    #[error("wallet view coordinator is not running")]
    Disconnected,
}

impl WalletViewError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Credential(e) => e.category(),
            Self::Busy(e) => e.category(),
            Self::Cancel(e) => e.category(),
            Self::PaymentRequest(e) => e.category(),
            Self::Backend(_) | Self::Disconnected => ErrorCategory::Backend,
            Self::WalletLocked => ErrorCategory::Credential,
        }
    }

    /// Title used when surfacing this error as a message.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Credential(CredentialError::OperationInProgress)
            | Self::Busy(_)
            | Self::Cancel(_) => "Operation in progress",
            Self::Credential(_) | Self::WalletLocked => "Wallet encryption",
            Self::PaymentRequest(_) => "Payment request",
            Self::Backend(_) | Self::Disconnected => "Wallet error",
        }
    }
}
