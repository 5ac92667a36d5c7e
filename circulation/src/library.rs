//! The lending state: catalog plus directory.

use crate::catalog::Catalog;
use crate::directory::Directory;
use circulation_core::{Isbn, UserId};
use std::collections::HashMap;
use std::fmt;

/// Everything the lending engine reads and mutates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Library {
    /// All books
    pub catalog: Catalog,
    /// All users and their accounts
    pub directory: Directory,
}

/// A consistency rule between book status and account ledgers that does not hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Book marked borrowed, but no account holds it
    BorrowedWithoutHolder {
        /// Offending book
        isbn: Isbn,
    },
    /// Book on the shelf, yet held by an account
    AvailableButHeld {
        /// Offending book
        isbn: Isbn,
        /// Accounts holding it
        holders: Vec<UserId>,
    },
    /// Book held by more than one account
    MultipleHolders {
        /// Offending book
        isbn: Isbn,
        /// Accounts holding it
        holders: Vec<UserId>,
    },
    /// Account holds a book the catalog does not know
    LoanOfUnknownBook {
        /// Holder
        user_id: UserId,
        /// Missing book
        isbn: Isbn,
    },
    /// Reservation on a book that is on the shelf
    ReservedWhileAvailable {
        /// Offending book
        isbn: Isbn,
        /// Reserving user
        reserved_by: UserId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BorrowedWithoutHolder { isbn } => {
                write!(f, "book {isbn} is borrowed but no account holds it")
            }
            Self::AvailableButHeld { isbn, holders } => {
                write!(f, "book {isbn} is available but held by {}", join(holders))
            }
            Self::MultipleHolders { isbn, holders } => {
                write!(f, "book {isbn} is held by several accounts: {}", join(holders))
            }
            Self::LoanOfUnknownBook { user_id, isbn } => {
                write!(f, "user {user_id} holds unknown book {isbn}")
            }
            Self::ReservedWhileAvailable { isbn, reserved_by } => {
                write!(f, "book {isbn} is available but reserved by {reserved_by}")
            }
        }
    }
}

fn join(ids: &[UserId]) -> String {
    ids.iter()
        .map(UserId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Library {
    /// Creates a library from already-loaded registries
    #[must_use]
    pub const fn new(catalog: Catalog, directory: Directory) -> Self {
        Self { catalog, directory }
    }

    /// Checks that book status and account ledgers agree.
    ///
    /// A book is borrowed exactly when one account holds it, and only
    /// borrowed books carry a reservation. Returns every violation found,
    /// so an empty list means the library is consistent.
    #[must_use]
    pub fn verify(&self) -> Vec<InvariantViolation> {
        let mut holders: HashMap<&Isbn, Vec<UserId>> = HashMap::new();
        let mut violations = Vec::new();

        for user in self.directory.all() {
            for loan in user.account.loans() {
                if !self.catalog.contains(&loan.isbn) {
                    violations.push(InvariantViolation::LoanOfUnknownBook {
                        user_id: user.id.clone(),
                        isbn: loan.isbn.clone(),
                    });
                }
                holders.entry(&loan.isbn).or_default().push(user.id.clone());
            }
        }

        for book in self.catalog.all() {
            let held_by = holders.remove(&book.isbn).unwrap_or_default();
            match (book.is_borrowed(), held_by.len()) {
                (true, 0) => violations.push(InvariantViolation::BorrowedWithoutHolder {
                    isbn: book.isbn.clone(),
                }),
                (true, 1) => {}
                (true, _) => violations.push(InvariantViolation::MultipleHolders {
                    isbn: book.isbn.clone(),
                    holders: held_by,
                }),
                (false, 0) => {}
                (false, _) => violations.push(InvariantViolation::AvailableButHeld {
                    isbn: book.isbn.clone(),
                    holders: held_by,
                }),
            }

            if let (Some(reserved_by), false) = (&book.reserved_by, book.is_borrowed()) {
                violations.push(InvariantViolation::ReservedWhileAvailable {
                    isbn: book.isbn.clone(),
                    reserved_by: reserved_by.clone(),
                });
            }
        }

        violations
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::policy::Role;
    use crate::types::{Book, BookStatus, User};
    use circulation_core::DayStamp;

    fn library() -> Library {
        let mut library = Library::default();
        library
            .catalog
            .add(Book::new(Isbn::new("111"), "T", "A", "P", 2000))
            .unwrap();
        for id in ["s1", "s2"] {
            library
                .directory
                .add(User::new(UserId::new(id), "pw", id, Role::Student))
                .unwrap();
        }
        library
    }

    fn lend(library: &mut Library, user: &str, isbn: &str) {
        library
            .directory
            .find_mut(&UserId::new(user))
            .unwrap()
            .account
            .add_borrow(Isbn::new(isbn), DayStamp::new(1));
    }

    #[test]
    fn empty_and_fresh_libraries_are_consistent() {
        assert!(Library::default().verify().is_empty());
        assert!(library().verify().is_empty());
    }

    #[test]
    fn consistent_loan() {
        let mut library = library();
        library.catalog.find_mut(&Isbn::new("111")).unwrap().status = BookStatus::Borrowed;
        lend(&mut library, "s1", "111");
        assert!(library.verify().is_empty());
    }

    #[test]
    fn detects_status_mismatches() {
        let mut library = library();
        library.catalog.find_mut(&Isbn::new("111")).unwrap().status = BookStatus::Borrowed;
        assert_eq!(
            library.verify(),
            vec![InvariantViolation::BorrowedWithoutHolder {
                isbn: Isbn::new("111")
            }]
        );

        lend(&mut library, "s1", "111");
        lend(&mut library, "s2", "111");
        assert!(matches!(
            library.verify().as_slice(),
            [InvariantViolation::MultipleHolders { holders, .. }] if holders.len() == 2
        ));
    }

    #[test]
    fn detects_available_but_held_and_unknown_books() {
        let mut library = library();
        lend(&mut library, "s1", "111");
        lend(&mut library, "s2", "999");

        let violations = library.verify();
        assert!(violations.contains(&InvariantViolation::AvailableButHeld {
            isbn: Isbn::new("111"),
            holders: vec![UserId::new("s1")],
        }));
        assert!(violations.contains(&InvariantViolation::LoanOfUnknownBook {
            user_id: UserId::new("s2"),
            isbn: Isbn::new("999"),
        }));
    }

    #[test]
    fn detects_reservation_on_available_book() {
        let mut library = library();
        library.catalog.find_mut(&Isbn::new("111")).unwrap().reserved_by = Some(UserId::new("s2"));

        let violations = library.verify();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "book 111 is available but reserved by s2"
        );
    }
}
