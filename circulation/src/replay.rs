//! Rebuilding loan and reservation state from the transaction log.
//!
//! The catalog file only knows whether a book is borrowed, and the directory
//! file knows nothing about accounts. Replaying the log over a freshly loaded
//! library restores who holds what and who is waiting. Both registries must
//! be loaded first.
//!
//! Replay is not the engine: no policy checks run, no fines are charged, and
//! nothing is appended to the log. A `return` record does not clear the
//! book's reservation, and a `reserve` record does not touch the user's
//! reservation count.

use crate::library::Library;
use crate::storage::LoadReport;
use crate::types::BookStatus;
use circulation_core::{Isbn, Operation, TransactionRecord, UserId};
use thiserror::Error;

/// Why a transaction could not be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The record names a user the directory does not have.
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// The record names a book the catalog does not have.
    #[error("Unknown book: {0}")]
    UnknownBook(Isbn),
}

/// Applies one transaction to the library.
///
/// # Errors
///
/// Returns a [`ReplayError`] if the user or book is unknown; the library is
/// left unchanged.
pub fn apply(library: &mut Library, record: &TransactionRecord) -> Result<(), ReplayError> {
    let Library { catalog, directory } = library;
    let user = directory
        .find_mut(&record.user_id)
        .ok_or_else(|| ReplayError::UnknownUser(record.user_id.clone()))?;
    let book = catalog
        .find_mut(&record.isbn)
        .ok_or_else(|| ReplayError::UnknownBook(record.isbn.clone()))?;

    match record.operation {
        Operation::Borrow => {
            book.status = BookStatus::Borrowed;
            book.reserved_by = None;
            if !user.account.is_borrowing(&record.isbn) {
                user.account.add_borrow(record.isbn.clone(), record.day);
            }
        }
        Operation::Return => {
            user.account.remove_borrow(&record.isbn);
            book.status = BookStatus::Available;
        }
        Operation::Reserve => {
            if book.is_borrowed() && book.reserved_by.is_none() {
                book.reserved_by = Some(record.user_id.clone());
            }
        }
    }
    Ok(())
}

/// Applies records in order, skipping those that name unknown users or books.
pub fn replay<I>(library: &mut Library, records: I) -> LoadReport
where
    I: IntoIterator<Item = TransactionRecord>,
{
    let mut report = LoadReport::default();
    for record in records {
        match apply(library, &record) {
            Ok(()) => report.accepted += 1,
            Err(error) => {
                tracing::warn!(%error, record = %record.to_line(), "Skipping transaction");
                report.skipped += 1;
            }
        }
    }
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::policy::Role;
    use crate::types::{Book, User};
    use circulation_core::DayStamp;

    fn library() -> Library {
        let mut library = Library::default();
        library
            .catalog
            .add(Book::new(Isbn::new("111"), "T", "A", "P", 2000))
            .unwrap();
        for id in ["s1", "f1"] {
            library
                .directory
                .add(User::new(UserId::new(id), "pw", id, Role::Faculty))
                .unwrap();
        }
        library
    }

    fn record(user: &str, operation: Operation, day: i64) -> TransactionRecord {
        TransactionRecord::new(UserId::new(user), Isbn::new("111"), operation, DayStamp::new(day))
    }

    #[test]
    fn borrow_uses_record_day_and_is_idempotent() {
        let mut library = library();
        let report = replay(
            &mut library,
            [
                record("s1", Operation::Borrow, 7),
                record("s1", Operation::Borrow, 9),
            ],
        );

        assert_eq!(report.accepted, 2);
        let account = &library.directory.find(&UserId::new("s1")).unwrap().account;
        assert_eq!(account.borrowed_count(), 1);
        assert_eq!(account.borrow_day(&Isbn::new("111")), Some(DayStamp::new(7)));
        assert!(library.catalog.find(&Isbn::new("111")).unwrap().is_borrowed());
    }

    #[test]
    fn reserve_only_on_unreserved_borrowed_book() {
        let mut library = library();
        replay(&mut library, [record("f1", Operation::Reserve, 1)]);
        assert_eq!(library.catalog.find(&Isbn::new("111")).unwrap().reserved_by, None);

        replay(
            &mut library,
            [
                record("s1", Operation::Borrow, 2),
                record("f1", Operation::Reserve, 3),
                record("s1", Operation::Reserve, 4),
            ],
        );
        let book = library.catalog.find(&Isbn::new("111")).unwrap();
        assert_eq!(book.reserved_by, Some(UserId::new("f1")));
        assert_eq!(
            library
                .directory
                .find(&UserId::new("f1"))
                .unwrap()
                .account
                .reservation_count(),
            0
        );
    }

    #[test]
    fn return_keeps_reservation() {
        let mut library = library();
        replay(
            &mut library,
            [
                record("s1", Operation::Borrow, 2),
                record("f1", Operation::Reserve, 3),
                record("s1", Operation::Return, 4),
            ],
        );

        let book = library.catalog.find(&Isbn::new("111")).unwrap();
        assert!(book.is_available());
        assert_eq!(book.reserved_by, Some(UserId::new("f1")));
        let account = &library.directory.find(&UserId::new("s1")).unwrap().account;
        assert_eq!(account.history(), [Isbn::new("111")]);
    }

    #[test]
    fn unknown_user_or_book_is_skipped() {
        let mut library = library();
        let unknown_book = TransactionRecord::new(
            UserId::new("s1"),
            Isbn::new("999"),
            Operation::Borrow,
            DayStamp::new(1),
        );
        let report = replay(
            &mut library,
            [record("ghost", Operation::Borrow, 1), unknown_book],
        );

        assert_eq!(report.accepted, 0);
        assert_eq!(report.skipped, 2);
        assert!(library.catalog.find(&Isbn::new("111")).unwrap().is_available());
    }
}
