//! # Circulation Core
//!
//! Core traits and types shared by the circulation workspace.
//!
//! This crate provides the small set of abstractions the lending engine is
//! built on, so that the engine itself stays free of I/O and wall-clock reads.
//!
//! ## Core Concepts
//!
//! - **State**: The in-memory catalog and directory a reducer mutates
//! - **Action**: A lending command (borrow, reserve, return, pay fine)
//! - **Reducer**: Function `(State, Action, Environment) → Output`
//! - **Environment**: Injected dependencies (clock, transaction log)
//! - **Transaction**: An append-only record of one lending operation
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Dependency Injection via Environment
//! - Day-stamp arithmetic only, never calendar arithmetic
//!
//! ## Example
//!
//! ```ignore
//! use circulation_core::*;
//!
//! impl Reducer for LendingEngine {
//!     type State = Library;
//!     type Action = LendingCommand;
//!     type Environment = LendingEnvironment;
//!     type Output = Result<LendingOutcome, LendingError>;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Library,
//!         action: LendingCommand,
//!         env: &LendingEnvironment,
//!     ) -> Self::Output {
//!         // Business logic goes here
//!     }
//! }
//! ```

pub mod ids;
pub mod transaction;
pub mod transaction_log;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use environment::{Clock, DayStamp, SystemClock};
pub use ids::{Isbn, ParseIdError, UserId};
pub use reducer::Reducer;
pub use transaction::{Operation, ParseTransactionError, TransactionRecord};
pub use transaction_log::{TransactionLog, TransactionLogError};

/// Reducer module - The core trait for business logic
///
/// Reducers are synchronous: `(State, Action, Environment) → Output`.
/// Every call runs to completion before the next one starts; the exclusive
/// `&mut State` borrow is what enforces that.
pub mod reducer {
    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Output`: What the caller receives back (usually a `Result`)
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for LendingEngine {
    ///     type State = Library;
    ///     type Action = LendingCommand;
    ///     type Environment = LendingEnvironment;
    ///     type Output = Result<LendingOutcome, LendingError>;
    ///
    ///     fn reduce(&self, state: &mut Library, action: LendingCommand, env: &LendingEnvironment)
    ///         -> Self::Output
    ///     {
    ///         match action {
    ///             LendingCommand::Borrow { user_id, isbn } => { /* ... */ }
    ///             _ => { /* ... */ }
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The structured result handed back to the caller
        type Output;

        /// Reduce an action into state changes and a caller-facing result
        ///
        /// 1. Validates the action against current state
        /// 2. Updates state in place
        /// 3. Emits side effects through the environment
        ///
        /// Validation failures must leave `state` untouched.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Self::Output;
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::fmt;

    /// Seconds in one day-stamp unit.
    const SECONDS_PER_DAY: i64 = 86_400;

    /// Integer count of days since the Unix epoch.
    ///
    /// Only differences between day-stamps carry meaning; there is no
    /// calendar arithmetic anywhere in the workspace.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DayStamp(i64);

    impl DayStamp {
        /// Creates a day-stamp from a raw day count
        #[must_use]
        pub const fn new(days: i64) -> Self {
            Self(days)
        }

        /// Returns the raw day count
        #[must_use]
        pub const fn get(self) -> i64 {
            self.0
        }

        /// Day-stamp containing the given instant (floor division)
        #[must_use]
        pub fn from_datetime(time: DateTime<Utc>) -> Self {
            Self(time.timestamp().div_euclid(SECONDS_PER_DAY))
        }

        /// Whole days elapsed from `earlier` to `self` (negative if `earlier` is later)
        #[must_use]
        pub const fn days_since(self, earlier: Self) -> i64 {
            self.0.saturating_sub(earlier.0)
        }

        /// The day-stamp `days` after this one
        #[must_use]
        pub const fn plus_days(self, days: i64) -> Self {
            Self(self.0.saturating_add(days))
        }
    }

    impl fmt::Display for DayStamp {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl From<i64> for DayStamp {
        fn from(days: i64) -> Self {
            Self(days)
        }
    }

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// struct SystemClock;
    /// impl Clock for SystemClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         Utc::now()
    ///     }
    /// }
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Get the current day-stamp
        fn today(&self) -> DayStamp {
            DayStamp::from_datetime(self.now())
        }
    }

    /// Wall-clock implementation used outside of tests
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
