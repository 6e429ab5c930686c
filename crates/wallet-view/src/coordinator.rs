//! # Wallet View Coordinator
//!
//! Composes the encryption state machine, notification pipeline, progress
//! coordinator and page router behind one inbox.
//!
//! ```text
//! presentation shell ──Intent──┐
//! wallet model ─────WalletEvent┤                        ┌─▶ WalletStateMachine
//! client model ─────ClientEvent┼─▶ inbox ─▶ run loop ───┼─▶ NotificationPipeline
//! workers ──────────completions┘   (mpsc)   (one task)  ├─▶ ProgressCoordinator
//!                                                        └─▶ PageRouter
//!                                        │
//!                                        └──▶ SignalBus (broadcast) ─▶ shells
//! ```
//!
//! Every mutation happens on the run loop. Slow wallet calls are spawned as
//! worker tasks and report back through the same inbox, so no component
//! needs its own locking.

use chrono::{DateTime, Utc};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::config::CoordinatorConfig;
use crate::encryption::{
    dispatch, CredentialOp, CredentialRequest, CredentialTicket, EncryptionState, Passphrase,
    WalletStateMachine,
};
use crate::errors::{
    BackendError, CancelError, ConfigError, CredentialError, ErrorCategory, WalletViewError,
};
use crate::models::{ClientEvent, PrivateKeyText, TaskCompletion, WalletEvent, WalletModel};
use crate::notifications::{DisplayUnit, NotificationPipeline};
use crate::progress::{
    OperationContext, OperationKind, OperationOutcome, ProgressCoordinator, ProgressEvent,
    ProgressHandle, ProgressReport, ProgressReporter,
};
use crate::router::{AddressFormat, NavigationTarget, PageRouter, PaymentRequest};
use crate::signals::{
    DialogRequest, MessageSeverity, PassphrasePurpose, SignalBus, WalletSignal,
};

// ============================================================================
// Intents
// ============================================================================

/// User intents accepted from the presentation shell.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Switch the current page
    Navigate(NavigationTarget),
    /// Open an auxiliary dialog
    OpenDialog(DialogRequest),
    /// Encrypt the wallet with a new passphrase
    EncryptWallet {
        /// New passphrase
        passphrase: Passphrase,
    },
    /// Unlock the wallet
    Unlock {
        /// Current passphrase
        passphrase: Passphrase,
        /// Grant spending access only
        for_spending_only: bool,
    },
    /// Lock the wallet
    Lock,
    /// Replace the passphrase
    ChangePassphrase {
        /// Current passphrase
        old: Passphrase,
        /// Replacement passphrase
        new: Passphrase,
    },
    /// Ask for a passphrase if the wallet is locked
    RequestUnlock,
    /// Republish the current encryption state
    RefreshEncryptionStatus,
    /// Back up the wallet file
    Backup {
        /// Destination path
        destination: PathBuf,
        /// Request shutdown after a successful backup
        quit_after: bool,
    },
    /// Import a private key
    ImportPrivateKey {
        /// Key text
        key: PrivateKeyText,
    },
    /// Rescan the chain for wallet transactions
    Rescan,
    /// Cancel the live long-running operation
    CancelOperation,
    /// Change the unit used for notifications
    SetDisplayUnit(DisplayUnit),
    /// Show or hide the out-of-sync warning
    ShowOutOfSyncWarning(bool),
    /// Show progress for work started outside the coordinator
    ShowProgress {
        /// Title
        title: String,
        /// Percent complete; 100 closes the indicator
        percent: i32,
    },
}

// ============================================================================
// Snapshot
// ============================================================================

/// Live long-running operation, as seen by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSnapshot {
    /// Operation kind
    pub kind: OperationKind,
    /// Percent complete
    pub percent: u8,
    /// Whether cancel is still possible
    pub cancellable: bool,
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSnapshot {
    /// Encryption state
    pub encryption: EncryptionState,
    /// Current page
    pub target: NavigationTarget,
    /// Live operation
    pub pending: Option<PendingSnapshot>,
    /// Whether a credential operation is in flight
    pub credential_busy: bool,
    /// Whether a fatal wallet failure froze the encryption state
    pub faulted: bool,
}

// ============================================================================
// Inbox
// ============================================================================

enum Inbound {
    Intent(Intent),
    Wallet(WalletEvent),
    Client(ClientEvent),
    CredentialDone {
        ticket: CredentialTicket,
        result: Result<(), BackendError>,
    },
    TaskDone {
        handle: ProgressHandle,
        result: Result<TaskCompletion, BackendError>,
    },
    Progress {
        handle: ProgressHandle,
        report: ProgressReport,
    },
    PaymentRequest {
        request: PaymentRequest,
        reply: oneshot::Sender<bool>,
    },
    Snapshot(oneshot::Sender<CoordinatorSnapshot>),
    Shutdown,
}

impl std::fmt::Debug for Inbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intent(intent) => f.debug_tuple("Intent").field(intent).finish(),
            Self::Wallet(event) => f.debug_tuple("Wallet").field(event).finish(),
            Self::Client(event) => f.debug_tuple("Client").field(event).finish(),
            Self::CredentialDone { ticket, .. } => f
                .debug_struct("CredentialDone")
                .field("op", &ticket.op())
                .finish_non_exhaustive(),
            Self::TaskDone { handle, .. } => f
                .debug_struct("TaskDone")
                .field("handle", &handle.id())
                .finish_non_exhaustive(),
            Self::Progress { handle, report } => f
                .debug_struct("Progress")
                .field("handle", &handle.id())
                .field("report", report)
                .finish(),
            Self::PaymentRequest { request, .. } => f
                .debug_struct("PaymentRequest")
                .field("request", request)
                .finish_non_exhaustive(),
            Self::Snapshot(_) => f.write_str("Snapshot"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable entry point for the shell and the external models.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Inbound>,
    bus: SignalBus,
}

impl CoordinatorHandle {
    fn send(&self, msg: Inbound) -> Result<(), WalletViewError> {
        self.tx.send(msg).map_err(|_| WalletViewError::Disconnected)
    }

    /// Submit a user intent.
    pub fn dispatch(&self, intent: Intent) -> Result<(), WalletViewError> {
        self.send(Inbound::Intent(intent))
    }

    /// Deliver an event from the wallet model.
    pub fn wallet_event(&self, event: WalletEvent) -> Result<(), WalletViewError> {
        self.send(Inbound::Wallet(event))
    }

    /// Deliver an event from the client model.
    pub fn client_event(&self, event: ClientEvent) -> Result<(), WalletViewError> {
        self.send(Inbound::Client(event))
    }

    /// Validate a payment request and, if accepted, open a pre-filled Send page.
    pub async fn handle_payment_request(
        &self,
        request: PaymentRequest,
    ) -> Result<bool, WalletViewError> {
        let (reply, rx) = oneshot::channel();
        self.send(Inbound::PaymentRequest { request, reply })?;
        rx.await.map_err(|_| WalletViewError::Disconnected)
    }

    /// Read the coordinator's state.
    pub async fn snapshot(&self) -> Result<CoordinatorSnapshot, WalletViewError> {
        let (reply, rx) = oneshot::channel();
        self.send(Inbound::Snapshot(reply))?;
        rx.await.map_err(|_| WalletViewError::Disconnected)
    }

    /// Current encryption state.
    pub async fn current_state(&self) -> Result<EncryptionState, WalletViewError> {
        Ok(self.snapshot().await?.encryption)
    }

    /// Current page.
    pub async fn current_target(&self) -> Result<NavigationTarget, WalletViewError> {
        Ok(self.snapshot().await?.target)
    }

    /// Subscribe to outward signals.
    pub fn subscribe(&self) -> broadcast::Receiver<WalletSignal> {
        self.bus.subscribe()
    }

    /// Stop the run loop after the messages already queued.
    pub fn shutdown(&self) -> Result<(), WalletViewError> {
        self.send(Inbound::Shutdown)
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Title of a progress indicator started outside the coordinator.
struct ExternalProgress {
    handle: ProgressHandle,
    title: String,
}

/// The per-wallet coordinator. Owns every component; driven by [`run`](Self::run).
pub struct WalletViewCoordinator {
    wallet: Arc<dyn WalletModel>,
    state: WalletStateMachine,
    notifications: NotificationPipeline,
    progress: ProgressCoordinator,
    router: PageRouter,
    address_format: AddressFormat,
    bus: SignalBus,
    inbox: mpsc::UnboundedSender<Inbound>,
    rx: mpsc::UnboundedReceiver<Inbound>,
    external_progress: Option<ExternalProgress>,
    quit_after_backup: Option<ProgressHandle>,
}

impl WalletViewCoordinator {
    /// Build a coordinator for one open wallet.
    ///
    /// `watermark` marks the end of the initial ledger load; only records
    /// inserted after it produce notifications.
    pub fn new(
        config: CoordinatorConfig,
        wallet: Arc<dyn WalletModel>,
        watermark: DateTime<Utc>,
    ) -> Result<(Self, CoordinatorHandle), ConfigError> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let bus = SignalBus::new(config.signal_capacity);
        let state = WalletStateMachine::new(Arc::clone(&wallet), config.passphrase.clone());
        let notifications = NotificationPipeline::new(
            wallet.record_accessor(),
            config.display.unit,
            config.display.ticker.clone(),
            watermark,
        )
        .with_initial_sync_suppression(config.notifications.suppress_during_initial_sync)
        .with_dedup_capacity(config.notifications.dedup_capacity);

        let handle = CoordinatorHandle {
            tx: tx.clone(),
            bus: bus.clone(),
        };
        let coordinator = Self {
            wallet,
            state,
            notifications,
            progress: ProgressCoordinator::new(),
            router: PageRouter::new(config.network.max_money),
            address_format: config.network.address_format(),
            bus,
            inbox: tx,
            rx,
            external_progress: None,
            quit_after_backup: None,
        };
        tracing::info!(
            state = ?coordinator.state.current_state(),
            %watermark,
            "wallet view coordinator created"
        );
        Ok((coordinator, handle))
    }

    /// Process inbox messages until shutdown.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if self.handle(msg).is_break() {
                break;
            }
        }
        tracing::info!("wallet view coordinator stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    fn handle(&mut self, msg: Inbound) -> ControlFlow<()> {
        tracing::trace!(?msg, "inbound");
        match msg {
            Inbound::Intent(intent) => self.handle_intent(intent),
            Inbound::Wallet(event) => self.handle_wallet_event(event),
            Inbound::Client(event) => self.handle_client_event(event),
            Inbound::CredentialDone { ticket, result } => self.credential_done(ticket, result),
            Inbound::TaskDone { handle, result } => self.task_done(handle, result),
            Inbound::Progress { handle, report } => self.progress_report(handle, report),
            Inbound::PaymentRequest { request, reply } => {
                let accepted = self.payment_request(request);
                let _ = reply.send(accepted);
            }
            Inbound::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            Inbound::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            encryption: self.state.current_state(),
            target: self.router.current().clone(),
            pending: self.progress.pending().map(|op| PendingSnapshot {
                kind: op.kind(),
                percent: op.progress_percent(),
                cancellable: op.cancellable(),
            }),
            credential_busy: self.state.is_busy(),
            faulted: self.state.is_faulted(),
        }
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Navigate(target) => {
                let current = self.router.navigate(target).clone();
                self.bus.emit(WalletSignal::PageChanged(current));
            }
            Intent::OpenDialog(dialog) => self.bus.emit(WalletSignal::OpenDialog(dialog)),
            Intent::EncryptWallet { passphrase } => {
                self.start_credential(CredentialRequest::Encrypt { passphrase });
            }
            Intent::Unlock {
                passphrase,
                for_spending_only,
            } => self.start_credential(CredentialRequest::Unlock {
                passphrase,
                for_spending_only,
            }),
            Intent::Lock => self.start_credential(CredentialRequest::Lock),
            Intent::ChangePassphrase { old, new } => {
                self.start_credential(CredentialRequest::ChangePassphrase { old, new });
            }
            Intent::RequestUnlock => self.request_unlock(),
            Intent::RefreshEncryptionStatus => self
                .bus
                .emit(WalletSignal::EncryptionStatusChanged(self.state.current_state())),
            Intent::Backup {
                destination,
                quit_after,
            } => self.start_backup(destination, quit_after),
            Intent::ImportPrivateKey { key } => self.start_import(key),
            Intent::Rescan => self.start_rescan(),
            Intent::CancelOperation => self.cancel_operation(),
            Intent::SetDisplayUnit(unit) => {
                tracing::debug!(?unit, "display unit changed");
                self.notifications.set_display_unit(unit);
            }
            Intent::ShowOutOfSyncWarning(show) => {
                self.bus.emit(WalletSignal::OutOfSyncWarning(show));
            }
            Intent::ShowProgress { title, percent } => self.external_progress(title, percent),
        }
    }

    fn request_unlock(&self) {
        if self.state.current_state() == EncryptionState::Locked {
            self.bus
                .emit(WalletSignal::PassphraseRequested(PassphrasePurpose::Unlock));
        }
    }

    fn payment_request(&mut self, request: PaymentRequest) -> bool {
        let format = &self.address_format;
        match self
            .router
            .accept_payment_request(request, |a| format.is_valid(a))
        {
            Ok(target) => {
                let target = target.clone();
                self.bus.emit(WalletSignal::ShowNormalIfMinimized);
                self.bus.emit(WalletSignal::PageChanged(target));
                true
            }
            Err(e) => {
                self.report(e.into());
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------------

    fn start_credential(&mut self, request: CredentialRequest) {
        let ticket = match self.state.begin(&request, self.progress.pending_kind()) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::debug!(op = ?request.op(), error = %e, "credential operation refused");
                self.report(e.into());
                return;
            }
        };
        tracing::debug!(op = ?ticket.op(), "credential operation dispatched");

        let wallet = Arc::clone(&self.wallet);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let result = dispatch(wallet.as_ref(), &request).await;
            drop(request);
            let _ = inbox.send(Inbound::CredentialDone { ticket, result });
        });
    }

    fn credential_done(&mut self, ticket: CredentialTicket, result: Result<(), BackendError>) {
        let op = ticket.op();
        match self.state.finish(ticket, result) {
            Ok(transition) => {
                if let Some(t) = transition {
                    self.bus.emit(WalletSignal::EncryptionStatusChanged(t.to));
                }
                match op {
                    CredentialOp::Encrypt => {
                        self.bus.emit(WalletSignal::message(
                            "Wallet encrypted",
                            "The wallet is now encrypted. Unlock it to send coins.",
                            MessageSeverity::Information,
                        ));
                        self.request_unlock();
                    }
                    CredentialOp::ChangePassphrase => self.bus.emit(WalletSignal::message(
                        "Wallet encryption",
                        "Wallet passphrase was successfully changed.",
                        MessageSeverity::Information,
                    )),
                    CredentialOp::Unlock { .. } | CredentialOp::Lock => {}
                }
            }
            Err(e) => self.report(e.into()),
        }
    }

    // ------------------------------------------------------------------------
    // Long-running operations
    // ------------------------------------------------------------------------

    /// Reserve the single operation slot and build the worker context.
    fn begin_operation(&mut self, kind: OperationKind) -> Option<OperationContext> {
        if self.state.is_busy() {
            self.report(CredentialError::OperationInProgress.into());
            return None;
        }
        let handle = match self.progress.begin(kind) {
            Ok(handle) => handle,
            Err(e) => {
                self.report(e.into());
                return None;
            }
        };
        let cancellation = self.progress.cancellation(handle)?;
        let inbox = self.inbox.clone();
        let reporter = ProgressReporter::new(handle, move |handle, report| {
            let _ = inbox.send(Inbound::Progress { handle, report });
        });
        self.bus.emit(WalletSignal::ShowProgress {
            title: kind.title().to_string(),
            percent: 0,
            cancellable: kind.supports_cancellation(),
        });
        Some(OperationContext {
            handle,
            cancellation,
            reporter,
        })
    }

    fn start_backup(&mut self, destination: PathBuf, quit_after: bool) {
        let Some(ctx) = self.begin_operation(OperationKind::Backup) else {
            return;
        };
        if quit_after {
            self.quit_after_backup = Some(ctx.handle);
        }
        tracing::info!(destination = %destination.display(), quit_after, "backup started");
        let wallet = Arc::clone(&self.wallet);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let handle = ctx.handle;
            let result = wallet.backup(&destination, ctx).await;
            let _ = inbox.send(Inbound::TaskDone { handle, result });
        });
    }

    fn start_import(&mut self, key: PrivateKeyText) {
        let state = self.state.current_state();
        if !state.allows_key_import() {
            self.report(WalletViewError::WalletLocked);
            self.request_unlock();
            return;
        }
        let Some(ctx) = self.begin_operation(OperationKind::Import) else {
            return;
        };
        let wallet = Arc::clone(&self.wallet);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let handle = ctx.handle;
            let result = wallet.import_private_key(&key, ctx).await;
            drop(key);
            let _ = inbox.send(Inbound::TaskDone { handle, result });
        });
    }

    fn start_rescan(&mut self) {
        let Some(ctx) = self.begin_operation(OperationKind::Rescan) else {
            return;
        };
        let wallet = Arc::clone(&self.wallet);
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            let handle = ctx.handle;
            let result = wallet.rescan(ctx).await;
            let _ = inbox.send(Inbound::TaskDone { handle, result });
        });
    }

    fn cancel_operation(&mut self) {
        let Some(handle) = self.progress.pending().map(|op| op.handle()) else {
            self.report(CancelError::Stale.into());
            return;
        };
        if self
            .external_progress
            .as_ref()
            .is_some_and(|ext| ext.handle == handle)
        {
            self.report(CancelError::NotCancellable(OperationKind::Rescan).into());
            return;
        }
        match self.progress.cancel(handle) {
            Ok(()) => {
                if let Some(op) = self.progress.pending() {
                    self.bus.emit(WalletSignal::ShowProgress {
                        title: op.kind().title().to_string(),
                        percent: op.progress_percent(),
                        cancellable: false,
                    });
                }
            }
            Err(e) => self.report(e.into()),
        }
    }

    fn progress_report(&mut self, handle: ProgressHandle, report: ProgressReport) {
        match report {
            ProgressReport::Percent(percent) => {
                if self.progress.update(handle, percent).is_none() {
                    return;
                }
            }
            ProgressReport::Committed => {
                if !self.progress.commit(handle) {
                    tracing::debug!(handle = handle.id(), "dropping stale commit");
                    return;
                }
                tracing::debug!(handle = handle.id(), "operation past point of no return");
            }
        }
        if let Some(op) = self.progress.pending() {
            self.bus.emit(WalletSignal::ShowProgress {
                title: op.kind().title().to_string(),
                percent: op.progress_percent(),
                cancellable: op.cancellable() && !op.cancel_requested(),
            });
        }
    }

    fn task_done(&mut self, handle: ProgressHandle, result: Result<TaskCompletion, BackendError>) {
        let outcome = match &result {
            Ok(TaskCompletion::Completed) => OperationOutcome::Success,
            Ok(TaskCompletion::Cancelled) => OperationOutcome::Cancelled,
            Err(e) => OperationOutcome::Failed(e.to_string()),
        };
        let quit_after = self.quit_after_backup == Some(handle);
        if quit_after {
            self.quit_after_backup = None;
        }
        let Some(ProgressEvent::Finished { kind, outcome, .. }) = self.progress.end(handle, outcome)
        else {
            return;
        };
        self.finish_operation(kind.title().to_string(), kind, outcome.clone());

        match (kind, &outcome) {
            (OperationKind::Backup, OperationOutcome::Success) => {
                self.bus.emit(WalletSignal::message(
                    "Backup Successful",
                    "The wallet data was successfully saved.",
                    MessageSeverity::Information,
                ));
                if quit_after {
                    tracing::info!("backup finished; requesting shutdown");
                    self.bus.emit(WalletSignal::QuitRequested);
                }
            }
            (OperationKind::Import, OperationOutcome::Success) => {
                self.bus.emit(WalletSignal::message(
                    "Import Successful",
                    "The private key was imported.",
                    MessageSeverity::Information,
                ));
            }
            (_, OperationOutcome::Failed(_)) => {
                if let Err(e) = result {
                    self.report(e.into());
                }
            }
            _ => {}
        }
    }

    fn finish_operation(&self, title: String, kind: OperationKind, outcome: OperationOutcome) {
        self.bus.emit(WalletSignal::ShowProgress {
            title,
            percent: 100,
            cancellable: false,
        });
        self.bus
            .emit(WalletSignal::OperationFinished { kind, outcome });
    }

    /// Progress reported by the wallet for work it started itself.
    fn external_progress(&mut self, title: String, percent: i32) {
        if let Some(op) = self.progress.pending() {
            let handle = op.handle();
            let owned = self
                .external_progress
                .as_ref()
                .is_some_and(|ext| ext.handle == handle);
            if !owned {
                // Progress of our own operation, relayed by the wallet.
                if self.progress.update(handle, percent).is_some() {
                    self.bus.emit(WalletSignal::ShowProgress {
                        title,
                        percent: percent.clamp(0, 100) as u8,
                        cancellable: false,
                    });
                }
                return;
            }
        } else if percent >= 100 {
            return;
        } else {
            match self.progress.begin(OperationKind::Rescan) {
                Ok(handle) => {
                    self.progress.commit(handle);
                    self.external_progress = Some(ExternalProgress {
                        handle,
                        title: title.clone(),
                    });
                    tracing::info!(%title, "externally started operation");
                }
                Err(e) => {
                    self.report(e.into());
                    return;
                }
            }
        }

        let Some(ext) = self.external_progress.as_ref() else {
            return;
        };
        let handle = ext.handle;
        if percent >= 100 {
            let title = ext.title.clone();
            self.external_progress = None;
            if let Some(ProgressEvent::Finished { kind, outcome, .. }) =
                self.progress.end(handle, OperationOutcome::Success)
            {
                self.finish_operation(title, kind, outcome);
            }
            return;
        }
        if let Some(ProgressEvent::Updated { percent, .. }) = self.progress.update(handle, percent)
        {
            self.bus.emit(WalletSignal::ShowProgress {
                title,
                percent,
                cancellable: false,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Model events
    // ------------------------------------------------------------------------

    fn handle_wallet_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::RecordsInserted(insertion) => {
                for notification in self.notifications.process(&insertion) {
                    tracing::debug!(
                        kind = %notification.kind,
                        amount = notification.amount,
                        "incoming transaction"
                    );
                    self.bus
                        .emit(WalletSignal::IncomingTransaction(notification));
                }
            }
            WalletEvent::ShowProgress { title, percent } => self.external_progress(title, percent),
            WalletEvent::EncryptionStatusObserved(observed) => {
                if let Some(t) = self.state.reconcile(observed) {
                    self.bus.emit(WalletSignal::EncryptionStatusChanged(t.to));
                }
            }
        }
    }

    fn handle_client_event(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::SyncProgress { title, percent } => {
                self.bus.emit(WalletSignal::ShowProgress {
                    title,
                    percent: percent.clamp(0, 100) as u8,
                    cancellable: false,
                });
            }
            ClientEvent::OutOfSync(out_of_sync) => {
                self.bus.emit(WalletSignal::OutOfSyncWarning(out_of_sync));
            }
            ClientEvent::InitialSync(active) => {
                tracing::debug!(active, "initial sync status");
                self.notifications.set_initial_sync(active);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    /// Surface an error as a message, or log it if its category is silent.
    fn report(&self, error: WalletViewError) {
        let category = error.category();
        if category.is_silent() {
            tracing::debug!(error = %error, %category, "ignoring stale reference");
            return;
        }
        if category == ErrorCategory::Backend {
            tracing::warn!(error = %error, "wallet operation failed");
        } else {
            tracing::debug!(error = %error, %category, "operation refused");
        }
        self.bus.emit(WalletSignal::message(
            error.title(),
            error.to_string(),
            category.severity(),
        ));
    }
}
