//! # Transaction Notifications
//!
//! Turns raw "records inserted" events into deduplicated, formatted
//! notifications in arrival order.
//!
//! ```text
//! InsertionEvent [start, end) ─▶ RecordAccessor ─▶ watermark / dedup ─▶ classify ─▶ format
//! ```

mod pipeline;
mod units;

pub use pipeline::{
    classify, NotificationPipeline, TransactionKind, TransactionNotification,
    DEFAULT_DEDUP_CAPACITY,
};
pub use units::DisplayUnit;
