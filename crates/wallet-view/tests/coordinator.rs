#![allow(
    missing_docs,
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::all
)]
//! # Coordinator Integration Tests
//!
//! Drive a running `WalletViewCoordinator` through its handle against the
//! in-memory wallet, asserting on the published signals.

use assert_matches::assert_matches;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use wallet_view::prelude::*;
use wallet_view::signals::PassphrasePurpose;
use wallet_view::CoordinatorHandle;
use wallet_view_testkit::{test_address, FailPoint, LedgerFixture, MemoryWallet, SignalRecorder};

const PASSPHRASE: &str = "correct horse";

struct Harness {
    handle: CoordinatorHandle,
    signals: SignalRecorder,
    wallet: MemoryWallet,
    task: JoinHandle<()>,
}

impl Harness {
    fn start(wallet: MemoryWallet) -> Self {
        Self::start_with(wallet, CoordinatorConfig::default(), Utc::now())
    }

    fn start_with(wallet: MemoryWallet, config: CoordinatorConfig, watermark: DateTime<Utc>) -> Self {
        let (coordinator, handle) =
            WalletViewCoordinator::new(config, Arc::new(wallet.clone()), watermark).unwrap();
        let signals = SignalRecorder::new(handle.subscribe());
        let task = coordinator.spawn();
        Self {
            handle,
            signals,
            wallet,
            task,
        }
    }

    fn send(&self, intent: Intent) {
        self.handle.dispatch(intent).unwrap();
    }

    /// Everything published before a status round-trip.
    async fn settle(&mut self) -> Vec<WalletSignal> {
        self.send(Intent::RefreshEncryptionStatus);
        self.signals
            .collect_until(
                |s| !matches!(s, WalletSignal::EncryptionStatusChanged(_)),
                |s| matches!(s, WalletSignal::EncryptionStatusChanged(_)),
            )
            .await
    }

    async fn expect_state(&mut self, state: EncryptionState) {
        self.signals
            .expect("encryption state change", |s| {
                *s == WalletSignal::EncryptionStatusChanged(state)
            })
            .await;
    }

    async fn expect_message(&mut self, severity: MessageSeverity) -> (String, String) {
        match self
            .signals
            .expect("message", |s| {
                matches!(s, WalletSignal::Message { severity: sev, .. } if *sev == severity)
            })
            .await
        {
            WalletSignal::Message { title, body, .. } => (title, body),
            _ => unreachable!(),
        }
    }

    async fn expect_finished(&mut self, kind: OperationKind) -> OperationOutcome {
        match self
            .signals
            .expect("operation finished", |s| {
                matches!(s, WalletSignal::OperationFinished { kind: k, .. } if *k == kind)
            })
            .await
        {
            WalletSignal::OperationFinished { outcome, .. } => outcome,
            _ => unreachable!(),
        }
    }

    async fn unlock_fully(&mut self) {
        self.send(Intent::Unlock {
            passphrase: Passphrase::new(PASSPHRASE),
            for_spending_only: false,
        });
        self.expect_state(EncryptionState::UnlockedFully).await;
    }
}

fn messages(signals: &[WalletSignal]) -> Vec<&WalletSignal> {
    signals
        .iter()
        .filter(|s| matches!(s, WalletSignal::Message { .. }))
        .collect()
}

// ============================================================================
// Encryption lifecycle
// ============================================================================

#[tokio::test]
async fn test_encrypt_then_unlock_scenario() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::Unencrypted
    );

    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new(PASSPHRASE),
    });
    h.expect_state(EncryptionState::Locked).await;
    h.signals
        .expect("unlock prompt", |s| {
            *s == WalletSignal::PassphraseRequested(PassphrasePurpose::Unlock)
        })
        .await;

    h.send(Intent::Unlock {
        passphrase: Passphrase::new("wrong"),
        for_spending_only: false,
    });
    let (_, body) = h.expect_message(MessageSeverity::Warning).await;
    assert_eq!(body, "the passphrase entered was incorrect");
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::Locked
    );

    h.unlock_fully().await;
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::UnlockedFully
    );
}

#[tokio::test]
async fn test_weak_passphrase_never_reaches_wallet() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new("short"),
    });
    let (title, body) = h.expect_message(MessageSeverity::Warning).await;
    assert_eq!(title, "Wallet encryption");
    assert!(body.starts_with("passphrase does not meet the policy"));
    assert!(h.wallet.calls().is_empty());
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::Unencrypted
    );
}

#[tokio::test]
async fn test_spending_only_then_full_unlock() {
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.send(Intent::Unlock {
        passphrase: Passphrase::new(PASSPHRASE),
        for_spending_only: true,
    });
    h.expect_state(EncryptionState::UnlockedForSpendingOnly).await;
    h.unlock_fully().await;

    h.send(Intent::Unlock {
        passphrase: Passphrase::new(PASSPHRASE),
        for_spending_only: true,
    });
    let (_, body) = h.expect_message(MessageSeverity::Warning).await;
    assert_eq!(body, "wallet is already unlocked");
}

#[tokio::test]
async fn test_change_passphrase_keeps_lock_state() {
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.send(Intent::ChangePassphrase {
        old: Passphrase::new(PASSPHRASE),
        new: Passphrase::new("battery staple"),
    });
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert!(body.contains("successfully changed"));
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::Locked
    );

    h.send(Intent::Unlock {
        passphrase: Passphrase::new("battery staple"),
        for_spending_only: false,
    });
    h.expect_state(EncryptionState::UnlockedFully).await;
}

#[tokio::test]
async fn test_fatal_backend_failure_freezes_state() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.wallet
        .fail_next(FailPoint::Encrypt, BackendError::fatal("wallet file corrupted"));
    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new(PASSPHRASE),
    });
    let (_, body) = h.expect_message(MessageSeverity::Error).await;
    assert!(body.contains("wallet file corrupted"));
    assert!(h.handle.snapshot().await.unwrap().faulted);

    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new(PASSPHRASE),
    });
    let (_, body) = h.expect_message(MessageSeverity::Error).await;
    assert_eq!(body, "wallet is in a failed state; transitions are disabled");
    assert_eq!(h.wallet.calls(), ["encrypt_wallet"]);
}

#[tokio::test]
async fn test_external_encryption_change_is_mirrored() {
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.wallet.force_state(EncryptionState::UnlockedFully);
    h.handle
        .wallet_event(WalletEvent::EncryptionStatusObserved(
            EncryptionState::UnlockedFully,
        ))
        .unwrap();
    h.expect_state(EncryptionState::UnlockedFully).await;
}

#[tokio::test]
async fn test_request_unlock_only_prompts_when_locked() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.send(Intent::RequestUnlock);
    let seen = h.settle().await;
    assert!(!seen.contains(&WalletSignal::PassphraseRequested(PassphrasePurpose::Unlock)));

    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.send(Intent::RequestUnlock);
    let seen = h.settle().await;
    assert!(seen.contains(&WalletSignal::PassphraseRequested(PassphrasePurpose::Unlock)));
}

// ============================================================================
// Long-running operations
// ============================================================================

#[tokio::test]
async fn test_lock_refused_while_import_holds_key_material() {
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.unlock_fully().await;

    h.wallet.hold();
    h.send(Intent::ImportPrivateKey {
        key: PrivateKeyText::new("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"),
    });
    h.signals
        .expect("import progress", |s| {
            matches!(s, WalletSignal::ShowProgress { cancellable: false, percent: 0, .. })
        })
        .await;

    h.send(Intent::Lock);
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "another operation is in progress");

    h.send(Intent::CancelOperation);
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "the import operation cannot be cancelled");

    h.wallet.release();
    assert_eq!(
        h.expect_finished(OperationKind::Import).await,
        OperationOutcome::Success
    );
    assert_eq!(h.wallet.imported_keys().len(), 1);

    h.send(Intent::Lock);
    h.expect_state(EncryptionState::Locked).await;
}

#[tokio::test]
async fn test_encrypt_refused_while_import_runs() {
    let mut h = Harness::start(MemoryWallet::unencrypted());

    h.wallet.hold();
    h.send(Intent::ImportPrivateKey {
        key: PrivateKeyText::new("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"),
    });
    h.signals
        .expect("import progress", |s| {
            matches!(s, WalletSignal::ShowProgress { percent: 0, .. })
        })
        .await;

    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new(PASSPHRASE),
    });
    let (title, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(title, "Operation in progress");
    assert_eq!(body, "another operation is in progress");
    assert_eq!(
        h.handle.current_state().await.unwrap(),
        EncryptionState::Unencrypted
    );

    h.wallet.release();
    assert_eq!(
        h.expect_finished(OperationKind::Import).await,
        OperationOutcome::Success
    );
    assert_eq!(h.wallet.calls(), ["import_private_key"]);

    h.send(Intent::EncryptWallet {
        passphrase: Passphrase::new(PASSPHRASE),
    });
    h.expect_state(EncryptionState::Locked).await;
}

#[tokio::test]
async fn test_rekey_refused_while_backup_runs() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("wallet.bak");
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.unlock_fully().await;

    h.wallet.hold();
    h.send(Intent::Backup {
        destination: destination.clone(),
        quit_after: false,
    });
    h.signals
        .expect("backup progress", |s| {
            matches!(s, WalletSignal::ShowProgress { percent: 0, .. })
        })
        .await;

    h.send(Intent::ChangePassphrase {
        old: Passphrase::new(PASSPHRASE),
        new: Passphrase::new("battery staple"),
    });
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "another operation is in progress");

    h.wallet.release();
    assert_eq!(
        h.expect_finished(OperationKind::Backup).await,
        OperationOutcome::Success
    );
    assert_eq!(h.wallet.calls(), ["unlock", "backup"]);
    assert!(destination.exists());

    h.send(Intent::ChangePassphrase {
        old: Passphrase::new(PASSPHRASE),
        new: Passphrase::new("battery staple"),
    });
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert!(body.contains("successfully changed"));
}

#[tokio::test]
async fn test_long_operation_refused_while_unlock_in_flight() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));

    h.wallet.hold();
    h.send(Intent::Unlock {
        passphrase: Passphrase::new(PASSPHRASE),
        for_spending_only: false,
    });
    h.send(Intent::Rescan);
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "another operation is in progress");

    h.send(Intent::Backup {
        destination: dir.path().join("wallet.bak"),
        quit_after: false,
    });
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "another operation is in progress");

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.credential_busy);
    assert_eq!(snapshot.pending, None);

    h.wallet.release();
    h.expect_state(EncryptionState::UnlockedFully).await;
    assert_eq!(h.wallet.calls(), ["unlock"]);
}

#[tokio::test]
async fn test_import_refused_while_locked() {
    let mut h = Harness::start(MemoryWallet::encrypted(PASSPHRASE));
    h.send(Intent::ImportPrivateKey {
        key: PrivateKeyText::new("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"),
    });
    let (_, body) = h.expect_message(MessageSeverity::Warning).await;
    assert_eq!(body, "wallet is locked");
    h.signals
        .expect("unlock prompt", |s| {
            *s == WalletSignal::PassphraseRequested(PassphrasePurpose::Unlock)
        })
        .await;
    assert!(h.wallet.calls().is_empty());
}

#[tokio::test]
async fn test_rescan_is_exclusive_and_cancellable() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.wallet.hold();
    h.send(Intent::Rescan);
    h.signals
        .expect("rescan progress", |s| {
            matches!(s, WalletSignal::ShowProgress { cancellable: true, .. })
        })
        .await;

    h.send(Intent::ImportPrivateKey {
        key: PrivateKeyText::new("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"),
    });
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "a rescan operation is already running");

    let pending = h.handle.snapshot().await.unwrap().pending.unwrap();
    assert_eq!(pending.kind, OperationKind::Rescan);

    h.send(Intent::CancelOperation);
    assert_eq!(
        h.expect_finished(OperationKind::Rescan).await,
        OperationOutcome::Cancelled
    );
    assert_eq!(h.handle.snapshot().await.unwrap().pending, None);
    assert_eq!(h.wallet.calls(), ["rescan"]);
}

#[tokio::test]
async fn test_rescan_reports_progress_to_completion() {
    let mut h = Harness::start(MemoryWallet::unencrypted().with_steps(4));
    h.send(Intent::Rescan);
    let percents: Vec<u8> = h
        .signals
        .collect_until(
            |s| matches!(s, WalletSignal::ShowProgress { .. }),
            |s| matches!(s, WalletSignal::OperationFinished { .. }),
        )
        .await
        .into_iter()
        .filter_map(|s| match s {
            WalletSignal::ShowProgress { percent, .. } => Some(percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, [0, 25, 50, 75, 100, 100]);
}

#[tokio::test]
async fn test_backup_cannot_be_cancelled_after_commit() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("wallet.bak");
    let wallet = MemoryWallet::unencrypted()
        .with_steps(4)
        .with_step_delay(Duration::from_millis(200));
    let mut h = Harness::start(wallet);

    h.send(Intent::Backup {
        destination: destination.clone(),
        quit_after: false,
    });
    h.signals
        .expect("commit", |s| {
            matches!(s, WalletSignal::ShowProgress { percent: 50, cancellable: false, .. })
        })
        .await;

    h.send(Intent::CancelOperation);
    let (_, body) = h.expect_message(MessageSeverity::Information).await;
    assert_eq!(body, "the backup operation cannot be cancelled");

    assert_eq!(
        h.expect_finished(OperationKind::Backup).await,
        OperationOutcome::Success
    );
    assert!(destination.exists());
}

#[tokio::test]
async fn test_backup_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("wallet.bak");
    let mut h = Harness::start(MemoryWallet::unencrypted());

    h.send(Intent::Backup {
        destination: destination.clone(),
        quit_after: true,
    });
    assert_eq!(
        h.expect_finished(OperationKind::Backup).await,
        OperationOutcome::Success
    );
    h.signals
        .expect("quit", |s| *s == WalletSignal::QuitRequested)
        .await;
    assert_eq!(h.wallet.backups(), vec![destination]);
}

#[tokio::test]
async fn test_backup_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.wallet
        .fail_next(FailPoint::Backup, BackendError::failed("disk full"));

    h.send(Intent::Backup {
        destination: dir.path().join("wallet.bak"),
        quit_after: true,
    });
    assert_eq!(
        h.expect_finished(OperationKind::Backup).await,
        OperationOutcome::Failed("disk full".to_string())
    );
    let (title, body) = h.expect_message(MessageSeverity::Error).await;
    assert_eq!(title, "Wallet error");
    assert!(body.contains("disk full"));

    let seen = h.settle().await;
    assert!(!seen.contains(&WalletSignal::QuitRequested));
}

#[tokio::test]
async fn test_externally_started_progress() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.handle
        .wallet_event(WalletEvent::ShowProgress {
            title: "Rescanning...".to_string(),
            percent: 30,
        })
        .unwrap();
    h.signals
        .expect("progress", |s| {
            matches!(s, WalletSignal::ShowProgress { percent: 30, cancellable: false, .. })
        })
        .await;
    let pending = h.handle.snapshot().await.unwrap().pending.unwrap();
    assert_eq!(pending.kind, OperationKind::Rescan);
    assert!(!pending.cancellable);

    h.send(Intent::ShowProgress {
        title: "Rescanning...".to_string(),
        percent: 100,
    });
    assert_eq!(
        h.expect_finished(OperationKind::Rescan).await,
        OperationOutcome::Success
    );
    assert_eq!(h.handle.snapshot().await.unwrap().pending, None);
}

#[tokio::test]
async fn test_cancel_without_operation_is_silent() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.send(Intent::CancelOperation);
    let seen = h.settle().await;
    assert!(messages(&seen).is_empty());
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_notifications_follow_insertion_order() {
    let start = Utc::now();
    let ledger = Arc::new(LedgerFixture::with_records(vec![LedgerFixture::received(
        "old",
        1_000,
        LedgerFixture::at(start, -60),
    )]));
    let wallet = MemoryWallet::unencrypted().with_ledger(Arc::clone(&ledger));
    let mut h = Harness::start_with(wallet, CoordinatorConfig::default(), start);

    let later = LedgerFixture::at(start, 1);
    let first = ledger.append([
        LedgerFixture::received("a", 100, later),
        LedgerFixture::sent("b", 200, later),
        LedgerFixture::generated("c", 300, later),
    ]);
    let second = ledger.append([
        LedgerFixture::received("d", 400, later),
        LedgerFixture::received("e", 500, later),
    ]);
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(InsertionEvent::root(0, 1)))
        .unwrap();
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(first.clone()))
        .unwrap();
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(second))
        .unwrap();
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(first))
        .unwrap();

    let amounts: Vec<i64> = h
        .settle()
        .await
        .into_iter()
        .filter_map(|s| match s {
            WalletSignal::IncomingTransaction(n) => Some(n.amount),
            _ => None,
        })
        .collect();
    assert_eq!(amounts, [100, -200, 300, 400, 500]);
}

#[tokio::test]
async fn test_display_unit_and_initial_sync() {
    let start = Utc::now();
    let ledger = Arc::new(LedgerFixture::new());
    let wallet = MemoryWallet::unencrypted().with_ledger(Arc::clone(&ledger));
    let mut h = Harness::start_with(wallet, CoordinatorConfig::default(), start);
    let later = LedgerFixture::at(start, 5);

    h.handle.client_event(ClientEvent::InitialSync(true)).unwrap();
    let event = ledger.append([LedgerFixture::received("during-sync", 100, later)]);
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(event))
        .unwrap();
    h.handle.client_event(ClientEvent::InitialSync(false)).unwrap();

    h.send(Intent::SetDisplayUnit(DisplayUnit::Milli));
    let event = ledger.append([LedgerFixture::received("after-sync", 150_000_000, later)]);
    h.handle
        .wallet_event(WalletEvent::RecordsInserted(event))
        .unwrap();

    let notes: Vec<TransactionNotification> = h
        .settle()
        .await
        .into_iter()
        .filter_map(|s| match s {
            WalletSignal::IncomingTransaction(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, TransactionKind::Received);
    assert_eq!(notes[0].unit, DisplayUnit::Milli);
    assert_eq!(notes[0].formatted_amount, "+1500.00000 mFTC");
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_payment_request_routing() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.send(Intent::Navigate(NavigationTarget::Receive));

    let rejected = h
        .handle
        .handle_payment_request(PaymentRequest::to("not-an-address").with_amount(10))
        .await
        .unwrap();
    assert!(!rejected);
    let (title, _) = h.expect_message(MessageSeverity::Warning).await;
    assert_eq!(title, "Payment request");
    assert_eq!(
        h.handle.current_target().await.unwrap(),
        NavigationTarget::Receive
    );

    let address = test_address(3);
    let accepted = h
        .handle
        .handle_payment_request(
            PaymentRequest::to(address.clone())
                .with_amount(25_000)
                .with_message("invoice 42"),
        )
        .await
        .unwrap();
    assert!(accepted);
    h.signals
        .expect("raise window", |s| *s == WalletSignal::ShowNormalIfMinimized)
        .await;

    let target = h.handle.current_target().await.unwrap();
    let prefill = target.prefill().unwrap();
    assert_eq!(prefill.address, address);
    assert_eq!(prefill.amount, Some(25_000));
    assert_eq!(prefill.message.as_deref(), Some("invoice 42"));
}

#[tokio::test]
async fn test_navigation_and_dialogs() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.send(Intent::Navigate(NavigationTarget::send_to("")));
    h.signals
        .expect("send page", |s| {
            *s == WalletSignal::PageChanged(NavigationTarget::Send { prefill: None })
        })
        .await;

    h.send(Intent::OpenDialog(DialogRequest::SignMessage {
        address: Some(test_address(1)),
    }));
    h.signals
        .expect("dialog", |s| matches!(s, WalletSignal::OpenDialog(_)))
        .await;

    for dialog in [DialogRequest::BlockchainComment, DialogRequest::OpenName] {
        h.send(Intent::OpenDialog(dialog.clone()));
        h.signals
            .expect("dialog", |s| *s == WalletSignal::OpenDialog(dialog.clone()))
            .await;
    }
    assert_eq!(
        h.handle.current_target().await.unwrap(),
        NavigationTarget::Send { prefill: None }
    );
}

#[tokio::test]
async fn test_client_events_are_forwarded() {
    let mut h = Harness::start(MemoryWallet::unencrypted());
    h.handle.client_event(ClientEvent::OutOfSync(true)).unwrap();
    h.handle
        .client_event(ClientEvent::SyncProgress {
            title: "Synchronizing".to_string(),
            percent: 140,
        })
        .unwrap();
    h.send(Intent::ShowOutOfSyncWarning(false));

    let seen = h.settle().await;
    assert_eq!(seen[0], WalletSignal::OutOfSyncWarning(true));
    assert_matches!(
        &seen[1],
        WalletSignal::ShowProgress { percent: 100, cancellable: false, .. }
    );
    assert_eq!(seen[2], WalletSignal::OutOfSyncWarning(false));
}

#[tokio::test]
async fn test_handle_reports_disconnect_after_shutdown() {
    let h = Harness::start(MemoryWallet::unencrypted());
    h.handle.shutdown().unwrap();
    h.task.await.unwrap();
    assert_eq!(
        h.handle.dispatch(Intent::Lock),
        Err(WalletViewError::Disconnected)
    );
}
