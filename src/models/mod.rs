pub mod batch;
pub mod order;
pub mod outcome;

pub use batch::{BatchEntry, BatchReport, BatchResult, BatchSummary, EntryCategory, OrderError};
pub use order::{normalize_tracking_number, LifecycleStatus, OrderRef};
pub use outcome::{truncate_chars, StatusOutcome, MAX_TEXT_CHARS};
