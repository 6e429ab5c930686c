//! # Wallet View
//!
//! Per-wallet coordination layer of a desktop wallet: routes user intents to
//! wallet operations and reflects the wallet's asynchronous state changes back
//! to the presentation shell as typed signals.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   WalletViewCoordinator                  │
//! │  ┌──────────────────┐ ┌────────────────────┐             │
//! │  │WalletStateMachine│ │NotificationPipeline│             │
//! │  └──────────────────┘ └────────────────────┘             │
//! │  ┌───────────────────┐ ┌──────────┐                      │
//! │  │ProgressCoordinator│ │PageRouter│                      │
//! │  └───────────────────┘ └──────────┘                      │
//! └──────────────────────────────────────────────────────────┘
//!         ▲ WalletModel / events           │ WalletSignal
//!         │                                ▼
//!   wallet + client models         presentation shells
//! ```
//!
//! The wallet and client models are injected at construction; no rendering
//! is modelled here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wallet_view::prelude::*;
//!
//! let (coordinator, handle) = WalletViewCoordinator::new(config, wallet, Utc::now())?;
//! let mut signals = handle.subscribe();
//! coordinator.spawn();
//!
//! handle.dispatch(Intent::Navigate(NavigationTarget::History))?;
//! while let Ok(signal) = signals.recv().await {
//!     // render
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod encryption;
pub mod errors;
pub mod models;
pub mod notifications;
pub mod progress;
pub mod router;
pub mod signals;

pub use config::CoordinatorConfig;
pub use coordinator::{
    CoordinatorHandle, CoordinatorSnapshot, Intent, PendingSnapshot, WalletViewCoordinator,
};
pub use encryption::{EncryptionState, Passphrase, PassphrasePolicy, WalletStateMachine};
pub use errors::{ErrorCategory, WalletViewError};
pub use models::{ClientEvent, RecordAccessor, WalletEvent, WalletModel};
pub use notifications::{NotificationPipeline, TransactionNotification};
pub use progress::ProgressCoordinator;
pub use router::{NavigationTarget, PageRouter, PaymentRequest};
pub use signals::{SignalBus, WalletSignal};

/// Commonly used types for shells and model implementations.
pub mod prelude {
    pub use crate::config::CoordinatorConfig;
    pub use crate::coordinator::{CoordinatorHandle, Intent, WalletViewCoordinator};
    pub use crate::encryption::{EncryptionState, Passphrase};
    pub use crate::errors::{BackendError, ErrorCategory, WalletViewError};
    pub use crate::models::{
        ClientEvent, InsertionEvent, LedgerRecord, PrivateKeyText, RecordAccessor, RecordId,
        TaskCompletion, WalletEvent, WalletModel,
    };
    pub use crate::notifications::{DisplayUnit, TransactionKind, TransactionNotification};
    pub use crate::progress::{OperationContext, OperationKind, OperationOutcome};
    pub use crate::router::{NavigationTarget, PaymentRequest, SendPrefill};
    pub use crate::signals::{DialogRequest, MessageSeverity, WalletSignal};
    pub use chrono::Utc;
}
