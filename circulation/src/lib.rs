//! # Circulation
//!
//! Book lending for a small institution: books move between the shelf and
//! borrowing users under per-role limits, overdue fines, and automatic
//! hand-off to a waiting reservation.
//!
//! The [`LendingEngine`] is the only thing that changes lending state. It
//! works on an explicit [`Library`] (catalog plus directory) and a
//! [`LendingEnvironment`] carrying the clock and the transaction log, so
//! tests can fix the day and capture every emitted transaction.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use circulation::{Book, Library, LendingEngine, LendingEnvironment, Role, User};
//! use circulation::engine::BorrowOutcome;
//! use circulation_core::{Isbn, SystemClock, UserId};
//! use circulation_testing::InMemoryTransactionLog;
//!
//! let mut library = Library::default();
//! library.catalog.add(Book::new(Isbn::new("111"), "Dune", "Herbert", "Chilton", 1965)).unwrap();
//! library.directory.add(User::new(UserId::new("s1"), "pw", "Sam", Role::Student)).unwrap();
//!
//! let env = LendingEnvironment::new(Arc::new(SystemClock), Arc::new(InMemoryTransactionLog::new()));
//! let outcome = LendingEngine::new()
//!     .borrow(&mut library, &env, &UserId::new("s1"), &Isbn::new("111"))
//!     .unwrap();
//! assert!(matches!(outcome, BorrowOutcome::Borrowed { .. }));
//! ```

pub mod account;
pub mod catalog;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod library;
pub mod policy;
pub mod records;
pub mod replay;
pub mod storage;
pub mod types;

pub use account::{Account, Loan};
pub use catalog::Catalog;
pub use config::LibraryConfig;
pub use directory::Directory;
pub use engine::{LendingCommand, LendingEngine, LendingEnvironment, LendingOutcome};
pub use error::{LendingError, Missing};
pub use library::{InvariantViolation, Library};
pub use policy::{Role, RolePolicy};
pub use storage::{FileTransactionLog, LoadReport, StorageError};
pub use types::{AccountSummary, Book, BookStatus, BookUpdate, Money, User};
