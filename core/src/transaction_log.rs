//! Transaction log trait and related types.
//!
//! This module defines the abstraction for the append-only lending log. The
//! engine appends one record per state transition; the startup loader reads
//! the whole log back and replays it.
//!
//! # Design
//!
//! The `TransactionLog` trait is deliberately minimal:
//!
//! - Append a record
//! - Load every record, oldest first
//!
//! Appends are best-effort from the engine's point of view. A failed append
//! is reported to the caller of `append` but never rolls back the in-memory
//! state change that produced the record.
//!
//! # Implementations
//!
//! - `FileTransactionLog` (in the `circulation` crate): one line per record
//! - `InMemoryTransactionLog` (in `circulation-testing`): fast, deterministic testing
//!
//! # Example
//!
//! ```no_run
//! use circulation_core::transaction_log::{TransactionLog, TransactionLogError};
//! use circulation_core::transaction::{Operation, TransactionRecord};
//! use circulation_core::{DayStamp, Isbn, UserId};
//!
//! fn example<L: TransactionLog>(log: &L) -> Result<(), TransactionLogError> {
//!     log.append(&TransactionRecord::new(
//!         UserId::new("s001"),
//!         Isbn::new("111"),
//!         Operation::Borrow,
//!         DayStamp::new(20_000),
//!     ))?;
//!
//!     let all_records = log.load()?;
//!     assert!(!all_records.is_empty());
//!     Ok(())
//! }
//! ```

use crate::transaction::TransactionRecord;
use thiserror::Error;

/// Errors that can occur during transaction log operations.
#[derive(Error, Debug)]
pub enum TransactionLogError {
    /// The log could not be opened, read, or written.
    #[error("I/O error on transaction log: {0}")]
    Io(#[from] std::io::Error),

    /// The log backend refused the append.
    #[error("Transaction log unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of lending transactions.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so an `Arc<dyn TransactionLog>` can
/// live in the lending environment. Methods take `&self`; implementations
/// use interior mutability where they hold state.
///
/// # What it does NOT provide
///
/// - Skipping of malformed lines (that is the replay step's job)
/// - Transactions spanning several appends
pub trait TransactionLog: Send + Sync {
    /// Append one record to the end of the log.
    ///
    /// # Errors
    ///
    /// - `Io`: The backing file could not be opened or written
    /// - `Unavailable`: The backend rejected the write
    fn append(&self, record: &TransactionRecord) -> Result<(), TransactionLogError>;

    /// Load all well-formed records, oldest first.
    ///
    /// Lines that cannot be parsed are skipped. A log that does not exist
    /// yet loads as empty.
    ///
    /// # Errors
    ///
    /// - `Io`: The backing file exists but could not be read
    fn load(&self) -> Result<Vec<TransactionRecord>, TransactionLogError>;
}
