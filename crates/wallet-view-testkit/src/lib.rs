//! Wallet View Testing Infrastructure
//!
//! In-memory stand-ins for the wallet and client collaborators, plus helpers
//! for building ledger records and asserting on published signals.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wallet_view::prelude::*;
//! use wallet_view_testkit::*;
//!
//! # async fn demo() {
//! let wallet = MemoryWallet::encrypted("correct horse");
//! let (coordinator, handle) =
//!     WalletViewCoordinator::new(CoordinatorConfig::default(), Arc::new(wallet.clone()), Utc::now())
//!         .unwrap();
//! let mut signals = SignalRecorder::new(handle.subscribe());
//! coordinator.spawn();
//! # }
//! ```

pub mod ledger;
pub mod recorder;
pub mod wallet;

pub use ledger::{test_address, LedgerFixture};
pub use recorder::SignalRecorder;
pub use wallet::{FailPoint, MemoryWallet};
