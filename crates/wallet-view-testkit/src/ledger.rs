//! Ledger fixtures: an in-memory record list implementing `RecordAccessor`.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use wallet_view::models::{InsertionEvent, LedgerRecord, ParentScope, RecordAccessor, RecordId};
use wallet_view::router::AddressFormat;

/// A valid mainnet-style address derived from `seed`.
pub fn test_address(seed: u8) -> String {
    AddressFormat::encode(14, &[seed; 20])
}

/// Root-scope ledger backed by a vector. Index order is insertion order.
#[derive(Debug, Default)]
pub struct LedgerFixture {
    records: Mutex<Vec<LedgerRecord>>,
}

impl LedgerFixture {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger preloaded with records (e.g. history older than the watermark).
    pub fn with_records(records: Vec<LedgerRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Append records and return the matching insertion event.
    pub fn append(&self, records: impl IntoIterator<Item = LedgerRecord>) -> InsertionEvent {
        let mut guard = self.records.lock();
        let start = guard.len();
        guard.extend(records);
        InsertionEvent::root(start, guard.len())
    }

    /// Insert a record at `index`, shifting later records down.
    pub fn insert_at(&self, index: usize, record: LedgerRecord) -> InsertionEvent {
        let mut guard = self.records.lock();
        let index = index.min(guard.len());
        guard.insert(index, record);
        InsertionEvent::root(index, index + 1)
    }

    /// Remove a record, as a reorganization would.
    pub fn remove(&self, index: usize) -> Option<LedgerRecord> {
        let mut guard = self.records.lock();
        (index < guard.len()).then(|| guard.remove(index))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of every record.
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().clone()
    }

    /// Incoming payment.
    pub fn received(id: &str, amount: i64, inserted_at: DateTime<Utc>) -> LedgerRecord {
        record(id, amount.abs(), false, inserted_at)
    }

    /// Outgoing payment.
    pub fn sent(id: &str, amount: i64, inserted_at: DateTime<Utc>) -> LedgerRecord {
        record(id, -amount.abs(), false, inserted_at)
    }

    /// Block reward.
    pub fn generated(id: &str, amount: i64, inserted_at: DateTime<Utc>) -> LedgerRecord {
        record(id, amount.abs(), true, inserted_at)
    }

    /// `base` shifted by whole seconds.
    pub fn at(base: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        base + Duration::seconds(secs)
    }
}

fn record(id: &str, net_amount: i64, generated: bool, inserted_at: DateTime<Utc>) -> LedgerRecord {
    let seed = id.bytes().fold(0u8, u8::wrapping_add);
    LedgerRecord {
        id: RecordId::new(id),
        date: inserted_at,
        inserted_at,
        net_amount,
        generated,
        address: test_address(seed),
    }
}

impl RecordAccessor for LedgerFixture {
    fn record(&self, parent: &ParentScope, index: usize) -> Option<LedgerRecord> {
        match parent {
            ParentScope::Root => self.records.lock().get(index).cloned(),
            ParentScope::Nested(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_range() {
        let ledger = LedgerFixture::new();
        let now = Utc::now();
        assert_eq!(
            ledger.append([LedgerFixture::received("a", 1, now)]),
            InsertionEvent::root(0, 1)
        );
        assert_eq!(
            ledger.append([
                LedgerFixture::sent("b", 1, now),
                LedgerFixture::generated("c", 1, now)
            ]),
            InsertionEvent::root(1, 3)
        );
        assert_eq!(ledger.records()[1].net_amount, -1);
        assert!(ledger.records()[2].generated);
    }

    #[test]
    fn test_nested_scope_does_not_resolve() {
        let ledger = LedgerFixture::with_records(vec![LedgerFixture::received("a", 1, Utc::now())]);
        assert!(ledger.record(&ParentScope::Root, 0).is_some());
        assert!(ledger
            .record(&ParentScope::Nested(RecordId::new("a")), 0)
            .is_none());
        assert_eq!(ledger.remove(0).map(|r| r.id), Some(RecordId::new("a")));
        assert!(ledger.is_empty());
    }
}
