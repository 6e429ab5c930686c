//! In-memory wallet model.
//!
//! Tracks an encryption flag and passphrase, runs scripted long operations
//! that report progress and honour cancellation, and serves records from a
//! shared [`LedgerFixture`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use wallet_view::encryption::{EncryptionState, Passphrase};
use wallet_view::errors::BackendError;
use wallet_view::models::{PrivateKeyText, RecordAccessor, TaskCompletion, WalletModel};
use wallet_view::progress::OperationContext;

use crate::ledger::LedgerFixture;

/// Wallet call that can be made to fail once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// `encrypt_wallet`
    Encrypt,
    /// `unlock`
    Unlock,
    /// `lock`
    Lock,
    /// `change_passphrase`
    ChangePassphrase,
    /// `backup`
    Backup,
    /// `import_private_key`
    Import,
    /// `rescan`
    Rescan,
}

#[derive(Debug)]
struct WalletState {
    passphrase: Option<String>,
    state: EncryptionState,
    failures: HashMap<FailPoint, BackendError>,
    imported: Vec<String>,
    backups: Vec<PathBuf>,
    calls: Vec<&'static str>,
}

/// Scripted wallet for tests and the headless host.
#[derive(Debug, Clone)]
pub struct MemoryWallet {
    state: Arc<Mutex<WalletState>>,
    ledger: Arc<LedgerFixture>,
    steps: u32,
    step_delay: Duration,
    gate: Arc<watch::Sender<bool>>,
}

impl MemoryWallet {
    fn with_state(state: EncryptionState, passphrase: Option<&str>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            state: Arc::new(Mutex::new(WalletState {
                passphrase: passphrase.map(str::to_string),
                state,
                failures: HashMap::new(),
                imported: Vec::new(),
                backups: Vec::new(),
                calls: Vec::new(),
            })),
            ledger: Arc::new(LedgerFixture::new()),
            steps: 4,
            step_delay: Duration::from_millis(5),
            gate: Arc::new(gate),
        }
    }

    /// Wallet without a passphrase.
    pub fn unencrypted() -> Self {
        Self::with_state(EncryptionState::Unencrypted, None)
    }

    /// Encrypted, locked wallet.
    pub fn encrypted(passphrase: &str) -> Self {
        Self::with_state(EncryptionState::Locked, Some(passphrase))
    }

    /// Serve records from a shared ledger.
    #[must_use]
    pub fn with_ledger(mut self, ledger: Arc<LedgerFixture>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Number of progress steps a long operation takes.
    #[must_use]
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps.max(1);
        self
    }

    /// Pause between progress steps.
    #[must_use]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// The shared ledger.
    pub fn ledger(&self) -> Arc<LedgerFixture> {
        Arc::clone(&self.ledger)
    }

    /// Make the next call at `point` fail with `error`.
    pub fn fail_next(&self, point: FailPoint, error: BackendError) {
        self.state.lock().failures.insert(point, error);
    }

    /// Hold credential calls and long operations until [`release`](Self::release).
    ///
    /// Long operations park before their first step; credential calls park
    /// after they are recorded in [`calls`](Self::calls).
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Let held operations proceed.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Change the encryption flag behind the coordinator's back.
    pub fn force_state(&self, state: EncryptionState) {
        self.state.lock().state = state;
    }

    /// Keys imported so far.
    pub fn imported_keys(&self) -> Vec<String> {
        self.state.lock().imported.clone()
    }

    /// Destinations of successful backups.
    pub fn backups(&self) -> Vec<PathBuf> {
        self.state.lock().backups.clone()
    }

    /// Names of wallet calls, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    fn enter(&self, name: &'static str, point: FailPoint) -> Result<(), BackendError> {
        let mut guard = self.state.lock();
        guard.calls.push(name);
        match guard.failures.remove(&point) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn check_passphrase(&self, passphrase: &Passphrase) -> Result<(), BackendError> {
        match self.state.lock().passphrase.as_deref() {
            Some(stored) if stored == passphrase.expose() => Ok(()),
            _ => Err(BackendError::WrongPassphrase),
        }
    }

    /// Wait until the gate is open.
    async fn wait_for_release(&self) {
        let mut rx = self.gate.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Wait for the gate, or for cancellation.
    async fn wait_for_gate(&self, ctx: &OperationContext) {
        tokio::select! {
            () = self.wait_for_release() => {}
            () = ctx.cancellation.cancelled() => {}
        }
    }

    /// Step through progress; `commit_at` is the step after which cancel is refused.
    async fn run_steps(&self, ctx: &OperationContext, commit_at: Option<u32>) -> TaskCompletion {
        self.wait_for_gate(ctx).await;
        for step in 1..=self.steps {
            if ctx.cancellation.is_cancelled() && commit_at.map_or(true, |c| step <= c) {
                return TaskCompletion::Cancelled;
            }
            tokio::time::sleep(self.step_delay).await;
            ctx.reporter.percent((step * 100 / self.steps) as i32);
            if commit_at == Some(step) {
                ctx.reporter.commit();
            }
        }
        TaskCompletion::Completed
    }
}

#[async_trait]
impl WalletModel for MemoryWallet {
    fn encryption_status(&self) -> EncryptionState {
        self.state.lock().state
    }

    async fn encrypt_wallet(&self, passphrase: &Passphrase) -> Result<(), BackendError> {
        self.enter("encrypt_wallet", FailPoint::Encrypt)?;
        self.wait_for_release().await;
        let mut guard = self.state.lock();
        guard.passphrase = Some(passphrase.expose().to_string());
        guard.state = EncryptionState::Locked;
        Ok(())
    }

    async fn unlock(
        &self,
        passphrase: &Passphrase,
        for_spending_only: bool,
    ) -> Result<(), BackendError> {
        self.enter("unlock", FailPoint::Unlock)?;
        self.wait_for_release().await;
        self.check_passphrase(passphrase)?;
        self.state.lock().state = if for_spending_only {
            EncryptionState::UnlockedForSpendingOnly
        } else {
            EncryptionState::UnlockedFully
        };
        Ok(())
    }

    async fn lock(&self) -> Result<(), BackendError> {
        self.enter("lock", FailPoint::Lock)?;
        self.wait_for_release().await;
        self.state.lock().state = EncryptionState::Locked;
        Ok(())
    }

    async fn change_passphrase(
        &self,
        old: &Passphrase,
        new: &Passphrase,
    ) -> Result<(), BackendError> {
        self.enter("change_passphrase", FailPoint::ChangePassphrase)?;
        self.wait_for_release().await;
        self.check_passphrase(old)?;
        self.state.lock().passphrase = Some(new.expose().to_string());
        Ok(())
    }

    async fn backup(
        &self,
        destination: &Path,
        ctx: OperationContext,
    ) -> Result<TaskCompletion, BackendError> {
        self.enter("backup", FailPoint::Backup)?;
        let commit_at = self.steps.div_ceil(2);
        if self.run_steps(&ctx, Some(commit_at)).await == TaskCompletion::Cancelled {
            return Ok(TaskCompletion::Cancelled);
        }
        let body = serde_json::to_vec_pretty(&self.ledger.records())
            .map_err(|e| BackendError::failed(e.to_string()))?;
        std::fs::write(destination, body).map_err(|e| BackendError::failed(e.to_string()))?;
        self.state.lock().backups.push(destination.to_path_buf());
        Ok(TaskCompletion::Completed)
    }

    async fn import_private_key(
        &self,
        key: &PrivateKeyText,
        ctx: OperationContext,
    ) -> Result<TaskCompletion, BackendError> {
        self.enter("import_private_key", FailPoint::Import)?;
        if key.expose().trim().is_empty() {
            return Err(BackendError::failed("invalid private key encoding"));
        }
        // Import is atomic: cancellation is never honoured.
        self.run_steps(&ctx, Some(0)).await;
        self.state.lock().imported.push(key.expose().to_string());
        Ok(TaskCompletion::Completed)
    }

    async fn rescan(&self, ctx: OperationContext) -> Result<TaskCompletion, BackendError> {
        self.enter("rescan", FailPoint::Rescan)?;
        Ok(self.run_steps(&ctx, None).await)
    }

    fn record_accessor(&self) -> Arc<dyn RecordAccessor> {
        self.ledger.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_view::progress::{OperationKind, ProgressCoordinator, ProgressReporter};

    #[tokio::test]
    async fn test_unlock_checks_passphrase() {
        let wallet = MemoryWallet::encrypted("secret phrase");
        assert_eq!(
            wallet.unlock(&Passphrase::new("nope"), false).await,
            Err(BackendError::WrongPassphrase)
        );
        wallet
            .unlock(&Passphrase::new("secret phrase"), true)
            .await
            .unwrap();
        assert_eq!(
            wallet.encryption_status(),
            EncryptionState::UnlockedForSpendingOnly
        );
    }

    #[tokio::test]
    async fn test_failure_injection_fires_once() {
        let wallet = MemoryWallet::unencrypted();
        wallet.fail_next(FailPoint::Encrypt, BackendError::failed("disk full"));
        let p = Passphrase::new("long enough");
        assert!(wallet.encrypt_wallet(&p).await.is_err());
        assert!(wallet.encrypt_wallet(&p).await.is_ok());
        assert_eq!(wallet.calls(), ["encrypt_wallet", "encrypt_wallet"]);
    }

    #[tokio::test]
    async fn test_hold_parks_credential_calls() {
        let wallet = MemoryWallet::encrypted("secret phrase");
        wallet.hold();
        let call = tokio::spawn({
            let wallet = wallet.clone();
            async move { wallet.lock().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(wallet.calls(), ["lock"]);
        assert!(!call.is_finished());

        wallet.release();
        call.await.unwrap().unwrap();
        assert_eq!(wallet.encryption_status(), EncryptionState::Locked);
    }

    #[test]
    fn test_ledger_is_shared_with_accessor() {
        let wallet = MemoryWallet::unencrypted();
        wallet
            .ledger()
            .append([LedgerFixture::received("a", 5, chrono::Utc::now())]);
        let accessor = wallet.record_accessor();
        assert!(accessor
            .record(&wallet_view::models::ParentScope::Root, 0)
            .is_some());
    }

    #[tokio::test]
    async fn test_backup_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("wallet.bak");
        let wallet = MemoryWallet::unencrypted().with_step_delay(Duration::ZERO);
        let mut progress = ProgressCoordinator::new();
        let handle = progress.begin(OperationKind::Backup).unwrap();
        let ctx = OperationContext {
            handle,
            cancellation: progress.cancellation(handle).unwrap(),
            reporter: ProgressReporter::detached(handle),
        };
        assert_eq!(
            wallet.backup(&dest, ctx).await.unwrap(),
            TaskCompletion::Completed
        );
        assert!(dest.exists());
        assert_eq!(wallet.backups(), vec![dest]);
    }
}
