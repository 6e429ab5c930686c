//! Insertion-event to notification pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::DisplayUnit;
use crate::models::{InsertionEvent, LedgerRecord, RecordAccessor, RecordId};

/// Direction of a ledger record as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Net outflow
    Sent,
    /// Net inflow
    Received,
    /// Reward / coinbase
    Generated,
    /// Neither (e.g. payment to self)
    Other,
}

impl TransactionKind {
    /// Short label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Received => "Received",
            Self::Generated => "Generated",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a record's direction.
#[must_use]
pub fn classify(record: &LedgerRecord) -> TransactionKind {
    if record.generated {
        TransactionKind::Generated
    } else if record.net_amount < 0 {
        TransactionKind::Sent
    } else if record.net_amount > 0 {
        TransactionKind::Received
    } else {
        TransactionKind::Other
    }
}

/// A user-visible notification for one new ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionNotification {
    /// Transaction time
    pub date: DateTime<Utc>,
    /// Display unit active when the notification was produced
    pub unit: DisplayUnit,
    /// Signed base-unit amount
    pub amount: i64,
    /// `amount` rendered in `unit`, with the unit label
    pub formatted_amount: String,
    /// Direction
    pub kind: TransactionKind,
    /// Counterparty or receiving address
    pub address: String,
}

impl TransactionNotification {
    /// Title for a desktop notification.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.kind {
            TransactionKind::Sent => "Sent transaction",
            _ => "Incoming transaction",
        }
    }

    /// Multi-line body for a desktop notification.
    #[must_use]
    pub fn body(&self) -> String {
        format!(
            "Date: {}\nAmount: {}\nType: {}\nAddress: {}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.formatted_amount,
            self.kind,
            self.address
        )
    }
}

/// Default number of record ids remembered for deduplication.
pub const DEFAULT_DEDUP_CAPACITY: usize = 4096;

/// Produces notifications from insertion events.
///
/// Only records inserted after the startup watermark are new. Each record id
/// is emitted at most once while it is among the last `dedup_capacity` ids
/// notified; older ids are forgotten oldest first.
pub struct NotificationPipeline {
    accessor: Arc<dyn RecordAccessor>,
    unit: DisplayUnit,
    ticker: String,
    watermark: DateTime<Utc>,
    suppress_during_initial_sync: bool,
    initial_sync: bool,
    emitted: HashSet<RecordId>,
    emitted_order: VecDeque<RecordId>,
    dedup_capacity: usize,
}

impl NotificationPipeline {
    /// Create a pipeline. `watermark` is fixed for the pipeline's lifetime.
    pub fn new(
        accessor: Arc<dyn RecordAccessor>,
        unit: DisplayUnit,
        ticker: impl Into<String>,
        watermark: DateTime<Utc>,
    ) -> Self {
        Self {
            accessor,
            unit,
            ticker: ticker.into(),
            watermark,
            suppress_during_initial_sync: true,
            initial_sync: false,
            emitted: HashSet::new(),
            emitted_order: VecDeque::new(),
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
        }
    }

    /// Bound the number of remembered record ids (at least one).
    #[must_use]
    pub fn with_dedup_capacity(mut self, capacity: usize) -> Self {
        self.dedup_capacity = capacity.max(1);
        self
    }

    /// Number of record ids currently remembered.
    #[must_use]
    pub fn remembered(&self) -> usize {
        self.emitted.len()
    }

    /// Whether initial block download silences notifications.
    #[must_use]
    pub fn with_initial_sync_suppression(mut self, enabled: bool) -> Self {
        self.suppress_during_initial_sync = enabled;
        self
    }

    /// Startup watermark.
    #[must_use]
    pub fn watermark(&self) -> DateTime<Utc> {
        self.watermark
    }

    /// Active display unit.
    #[must_use]
    pub fn display_unit(&self) -> DisplayUnit {
        self.unit
    }

    /// Change the display unit for subsequent notifications.
    pub fn set_display_unit(&mut self, unit: DisplayUnit) {
        self.unit = unit;
    }

    /// Record whether the client is in initial block download.
    pub fn set_initial_sync(&mut self, active: bool) {
        self.initial_sync = active;
    }

    /// Process one insertion batch, in ascending index order.
    pub fn process(&mut self, event: &InsertionEvent) -> Vec<TransactionNotification> {
        if event.is_empty() {
            return Vec::new();
        }
        if self.suppress_during_initial_sync && self.initial_sync {
            tracing::debug!(
                start = event.start,
                end = event.end,
                "suppressing notifications during initial sync"
            );
            return Vec::new();
        }

        let mut out = Vec::with_capacity(event.len());
        for index in event.start..event.end {
            let Some(record) = self.accessor.record(&event.parent, index) else {
                tracing::debug!(index, parent = ?event.parent, "record index no longer resolves; skipping");
                continue;
            };
            if record.inserted_at <= self.watermark {
                continue;
            }
            if !self.remember(&record.id) {
                tracing::debug!(id = %record.id, "record already notified");
                continue;
            }
            out.push(self.notification_for(&record));
        }
        out
    }

    /// Remember `id`, evicting the oldest id past capacity. False if already known.
    fn remember(&mut self, id: &RecordId) -> bool {
        if !self.emitted.insert(id.clone()) {
            return false;
        }
        self.emitted_order.push_back(id.clone());
        while self.emitted_order.len() > self.dedup_capacity {
            if let Some(oldest) = self.emitted_order.pop_front() {
                self.emitted.remove(&oldest);
            }
        }
        true
    }

    fn notification_for(&self, record: &LedgerRecord) -> TransactionNotification {
        TransactionNotification {
            date: record.date,
            unit: self.unit,
            amount: record.net_amount,
            formatted_amount: self
                .unit
                .format_with_label(record.net_amount, &self.ticker, true),
            kind: classify(record),
            address: record.address.clone(),
        }
    }
}
