//! # Circulation Testing
//!
//! Testing utilities and helpers for the circulation workspace.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - An in-memory transaction log
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use circulation_testing::{FixedClock, InMemoryTransactionLog};
//!
//! #[test]
//! fn student_fine_on_late_return() {
//!     let clock = FixedClock::at_day(10);
//!     let log = InMemoryTransactionLog::new();
//!     let env = LendingEnvironment::new(Arc::new(clock.clone()), Arc::new(log.clone()));
//!
//!     engine.borrow(&mut library, &env, &student, &isbn)?;
//!     clock.set_day(30);
//!     let receipt = engine.return_book(&mut library, &env, &student, &isbn)?;
//!
//!     assert_eq!(log.operations(), vec![Operation::Borrow, Operation::Return]);
//! }
//! ```

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical


use chrono::{DateTime, Utc};
use circulation_core::environment::{Clock, DayStamp};

/// Mock implementations of Environment traits
///
/// - `FixedClock`: Deterministic, manually advanced time
/// - `InMemoryTransactionLog`: Captures appended transactions
/// - `FailingTransactionLog`: Rejects every append
pub mod mocks {
    use super::{Clock, DateTime, DayStamp, Utc};
    use circulation_core::transaction::{Operation, TransactionRecord};
    use circulation_core::transaction_log::{TransactionLog, TransactionLogError};
    use std::sync::{Arc, RwLock};

    /// Seconds in one day-stamp unit.
    const SECONDS_PER_DAY: i64 = 86_400;

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until a test moves it explicitly. Clones share
    /// the same underlying time, so a test can keep one handle while the
    /// environment holds another.
    ///
    /// # Example
    ///
    /// ```
    /// use circulation_testing::mocks::FixedClock;
    /// use circulation_core::environment::{Clock, DayStamp};
    ///
    /// let clock = FixedClock::at_day(10);
    /// let handle = clock.clone();
    /// assert_eq!(clock.today(), DayStamp::new(10));
    ///
    /// handle.advance_days(20);
    /// assert_eq!(clock.today(), DayStamp::new(30));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Create a clock positioned at noon of the given day-stamp
        #[must_use]
        pub fn at_day(day: i64) -> Self {
            Self::new(noon_of(DayStamp::new(day)))
        }

        /// Move the clock to an exact instant
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.write().unwrap() = time;
        }

        /// Move the clock to noon of the given day-stamp
        pub fn set_day(&self, day: i64) {
            self.set(noon_of(DayStamp::new(day)));
        }

        /// Move the clock forward (or backward, if negative) by whole days
        pub fn advance_days(&self, days: i64) {
            let today = self.today();
            self.set_day(today.plus_days(days).get());
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    #[allow(clippy::expect_used)]
    fn noon_of(day: DayStamp) -> DateTime<Utc> {
        let seconds = day
            .get()
            .saturating_mul(SECONDS_PER_DAY)
            .saturating_add(SECONDS_PER_DAY / 2);
        DateTime::from_timestamp(seconds, 0).expect("day-stamp should be within chrono's range")
    }

    /// Create a default fixed clock for tests (day-stamp 20089, 2025-01-01)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::at_day(20_089)
    }

    /// In-memory transaction log for fast, deterministic testing.
    ///
    /// # Example
    ///
    /// ```
    /// use circulation_testing::InMemoryTransactionLog;
    /// use circulation_core::transaction::{Operation, TransactionRecord};
    /// use circulation_core::transaction_log::TransactionLog;
    /// use circulation_core::{DayStamp, Isbn, UserId};
    ///
    /// let log = InMemoryTransactionLog::new();
    /// log.append(&TransactionRecord::new(
    ///     UserId::new("s1"),
    ///     Isbn::new("111"),
    ///     Operation::Borrow,
    ///     DayStamp::new(1),
    /// )).unwrap();
    ///
    /// assert_eq!(log.len(), 1);
    /// assert_eq!(log.operations(), vec![Operation::Borrow]);
    /// ```
    #[derive(Clone, Debug, Default)]
    pub struct InMemoryTransactionLog {
        records: Arc<RwLock<Vec<TransactionRecord>>>,
    }

    impl InMemoryTransactionLog {
        /// Create a new empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a log pre-populated with records (for replay tests)
        #[must_use]
        pub fn with_records(records: Vec<TransactionRecord>) -> Self {
            Self {
                records: Arc::new(RwLock::new(records)),
            }
        }

        /// Snapshot of every record appended so far
        #[must_use]
        pub fn records(&self) -> Vec<TransactionRecord> {
            self.records.read().unwrap().clone()
        }

        /// The operation of every record, in append order
        #[must_use]
        pub fn operations(&self) -> Vec<Operation> {
            self.records
                .read()
                .unwrap()
                .iter()
                .map(|record| record.operation)
                .collect()
        }

        /// Number of records appended
        #[must_use]
        pub fn len(&self) -> usize {
            self.records.read().unwrap().len()
        }

        /// Check if nothing has been appended
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.records.read().unwrap().is_empty()
        }

        /// Drop all records (for test isolation)
        pub fn clear(&self) {
            self.records.write().unwrap().clear();
        }
    }

    impl TransactionLog for InMemoryTransactionLog {
        fn append(&self, record: &TransactionRecord) -> Result<(), TransactionLogError> {
            self.records.write().unwrap().push(record.clone());
            Ok(())
        }

        fn load(&self) -> Result<Vec<TransactionRecord>, TransactionLogError> {
            Ok(self.records())
        }
    }

    /// Transaction log whose appends always fail.
    ///
    /// Used to check that a failed append leaves the in-memory state change
    /// in place.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct FailingTransactionLog;

    impl TransactionLog for FailingTransactionLog {
        fn append(&self, _record: &TransactionRecord) -> Result<(), TransactionLogError> {
            Err(TransactionLogError::Unavailable(
                "append rejected by FailingTransactionLog".to_string(),
            ))
        }

        fn load(&self) -> Result<Vec<TransactionRecord>, TransactionLogError> {
            Ok(Vec::new())
        }
    }
}

// Re-export commonly used items
pub use mocks::{FailingTransactionLog, FixedClock, InMemoryTransactionLog, test_clock};
pub use reducer_test::ReducerTest;
