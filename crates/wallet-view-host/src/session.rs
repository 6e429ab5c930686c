//! Scripted demo session.

use anyhow::{bail, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use wallet_view::prelude::*;
use wallet_view_testkit::{test_address, LedgerFixture, MemoryWallet};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

fn print_signal(signal: &WalletSignal, json: bool) {
    if json {
        match serde_json::to_string(signal) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize signal"),
        }
        return;
    }
    match signal {
        WalletSignal::Message {
            title,
            body,
            severity,
        } => println!("[{severity:?}] {title}: {body}"),
        WalletSignal::IncomingTransaction(n) => println!("[notify] {}\n{}", n.title(), n.body()),
        WalletSignal::ShowProgress {
            title,
            percent,
            cancellable,
        } => println!(
            "[progress] {title} {percent}%{}",
            if *cancellable { " (cancellable)" } else { "" }
        ),
        other => println!("[signal] {other:?}"),
    }
}

/// Print signals until `pred` matches one.
async fn until<F>(
    rx: &mut broadcast::Receiver<WalletSignal>,
    json: bool,
    what: &str,
    pred: F,
) -> Result<()>
where
    F: Fn(&WalletSignal) -> bool,
{
    loop {
        match tokio::time::timeout(STEP_TIMEOUT, rx.recv()).await {
            Ok(Ok(signal)) => {
                print_signal(&signal, json);
                if pred(&signal) {
                    return Ok(());
                }
            }
            Ok(Err(broadcast::error::RecvError::Lagged(n))) => {
                tracing::warn!(skipped = n, "output lagged");
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => bail!("coordinator stopped"),
            Err(_) => bail!("timed out waiting for {what}"),
        }
    }
}

fn is_state(signal: &WalletSignal, state: EncryptionState) -> bool {
    matches!(signal, WalletSignal::EncryptionStatusChanged(s) if *s == state)
}

fn is_warning(signal: &WalletSignal) -> bool {
    matches!(
        signal,
        WalletSignal::Message {
            severity: MessageSeverity::Warning,
            ..
        }
    )
}

fn is_finished(signal: &WalletSignal, kind: OperationKind) -> bool {
    matches!(signal, WalletSignal::OperationFinished { kind: k, .. } if *k == kind)
}

/// Run the demo against an in-memory wallet.
pub async fn run(
    config: CoordinatorConfig,
    passphrase: &str,
    backup: PathBuf,
    json: bool,
) -> Result<()> {
    let started = Utc::now();
    let ledger = Arc::new(LedgerFixture::with_records(vec![LedgerFixture::received(
        "genesis-payout",
        50 * 100_000_000,
        LedgerFixture::at(started, -3600),
    )]));
    let wallet = MemoryWallet::unencrypted()
        .with_ledger(Arc::clone(&ledger))
        .with_steps(5)
        .with_step_delay(Duration::from_millis(50));

    let (coordinator, handle) =
        WalletViewCoordinator::new(config, Arc::new(wallet.clone()), started)?;
    let mut rx = handle.subscribe();
    let task = coordinator.spawn();

    handle.dispatch(Intent::Navigate(NavigationTarget::History))?;
    until(&mut rx, json, "page change", |s| {
        matches!(s, WalletSignal::PageChanged(_))
    })
    .await?;

    handle.dispatch(Intent::EncryptWallet {
        passphrase: Passphrase::new(passphrase),
    })?;
    until(&mut rx, json, "encryption", |s| {
        is_state(s, EncryptionState::Locked)
    })
    .await?;

    handle.dispatch(Intent::Unlock {
        passphrase: Passphrase::new("not the passphrase"),
        for_spending_only: false,
    })?;
    until(&mut rx, json, "unlock refusal", is_warning).await?;

    handle.dispatch(Intent::Unlock {
        passphrase: Passphrase::new(passphrase),
        for_spending_only: false,
    })?;
    until(&mut rx, json, "unlock", |s| {
        is_state(s, EncryptionState::UnlockedFully)
    })
    .await?;

    let now = Utc::now();
    let event = ledger.append([
        LedgerFixture::received("tx-1", 125_000_000, now),
        LedgerFixture::sent("tx-2", 40_000_000, now),
    ]);
    handle.wallet_event(WalletEvent::RecordsInserted(event))?;
    until(&mut rx, json, "notifications", |s| {
        matches!(s, WalletSignal::IncomingTransaction(n) if n.kind == TransactionKind::Sent)
    })
    .await?;

    let request = PaymentRequest::to(test_address(7))
        .with_amount(10_000_000)
        .with_label("demo");
    let accepted = handle.handle_payment_request(request).await?;
    until(&mut rx, json, "send page", |s| {
        matches!(s, WalletSignal::PageChanged(NavigationTarget::Send { prefill: Some(SendPrefill { .. }) }))
    })
    .await?;
    println!("payment request accepted: {accepted}");

    handle.dispatch(Intent::Rescan)?;
    until(&mut rx, json, "rescan", |s| is_finished(s, OperationKind::Rescan)).await?;

    handle.dispatch(Intent::Backup {
        destination: backup.clone(),
        quit_after: false,
    })?;
    until(&mut rx, json, "backup", |s| is_finished(s, OperationKind::Backup)).await?;

    handle.dispatch(Intent::Lock)?;
    until(&mut rx, json, "lock", |s| is_state(s, EncryptionState::Locked)).await?;

    let snapshot = handle.snapshot().await?;
    println!(
        "final state: {} on {} page; backups: {:?}",
        snapshot.encryption,
        snapshot.target.title(),
        wallet.backups()
    );

    handle.shutdown()?;
    task.await?;
    Ok(())
}
