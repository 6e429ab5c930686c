//! Passphrase handling and strength policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::errors::CredentialError;

/// A wallet passphrase. Zeroized on drop, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(Zeroizing<String>);

impl Passphrase {
    /// Wrap a passphrase.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the secret for handing to the wallet model.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Length in characters.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Minimum requirements for a new passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassphrasePolicy {
    /// Minimum number of characters
    pub min_length: usize,
    /// Reject passphrases made only of whitespace
    pub reject_whitespace_only: bool,
}

impl Default for PassphrasePolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            reject_whitespace_only: true,
        }
    }
}

impl PassphrasePolicy {
    /// Check a new passphrase against the policy.
    pub fn check(&self, passphrase: &Passphrase) -> Result<(), CredentialError> {
        let secret = passphrase.expose();
        if secret.is_empty() {
            return Err(CredentialError::WeakPassphrase(
                "passphrase is empty".to_string(),
            ));
        }
        if self.reject_whitespace_only && secret.trim().is_empty() {
            return Err(CredentialError::WeakPassphrase(
                "passphrase contains only whitespace".to_string(),
            ));
        }
        if passphrase.char_count() < self.min_length {
            return Err(CredentialError::WeakPassphrase(format!(
                "passphrase must be at least {} characters",
                self.min_length
            )));
        }
        Ok(())
    }
}
