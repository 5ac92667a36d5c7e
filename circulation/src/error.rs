//! Error types for lending operations.

use crate::policy::Role;
use crate::types::Money;
use circulation_core::{Isbn, UserId};
use std::fmt;
use thiserror::Error;

/// Result type alias for lending operations.
pub type Result<T> = std::result::Result<T, LendingError>;

/// The entity a lookup failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// No book with this ISBN is in the catalog.
    Book(Isbn),
    /// No user with this ID is in the directory.
    User(UserId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book(isbn) => write!(f, "book {isbn}"),
            Self::User(user_id) => write!(f, "user {user_id}"),
        }
    }
}

/// Every way a catalog edit, directory edit, or lending operation can be refused.
///
/// All variants are recoverable. A rejected operation leaves the library
/// exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendingError {
    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// The referenced book or user does not exist.
    #[error("Not found: {0}")]
    NotFound(Missing),

    // ═══════════════════════════════════════════════════════════
    // Registry Errors
    // ═══════════════════════════════════════════════════════════

    /// A book with this ISBN is already in the catalog.
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(Isbn),

    /// A user with this ID is already in the directory.
    #[error("A user with ID {0} already exists")]
    DuplicateUserId(UserId),

    /// Borrowed books stay in the catalog until they are returned.
    #[error("Cannot remove book {0} while it is borrowed")]
    CannotRemoveBorrowedBook(Isbn),

    /// A text field holds a character the record files cannot store.
    #[error("The {field} {value:?} contains a comma or line break")]
    UnstorableField {
        /// Which field was rejected
        field: &'static str,
        /// The offending value
        value: String,
    },

    /// Users stay in the directory until their loans are returned.
    #[error("Cannot remove user {user_id} with {active} active borrow(s)")]
    CannotRemoveUserWithActiveBorrows {
        /// User whose removal was refused
        user_id: UserId,
        /// Number of loans still open
        active: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Borrowing Errors
    // ═══════════════════════════════════════════════════════════

    /// The user already holds this book.
    #[error("User {user_id} is already borrowing book {isbn}")]
    AlreadyBorrowing {
        /// Acting user
        user_id: UserId,
        /// Book already on loan to them
        isbn: Isbn,
    },

    /// The user's role may not borrow or return books.
    #[error("User {user_id} with role {role} cannot borrow or return books")]
    RoleForbidden {
        /// Acting user
        user_id: UserId,
        /// Their role
        role: Role,
    },

    /// Students must clear their fine before borrowing again.
    #[error("User {user_id} has an unpaid fine of {fine}")]
    UnpaidFineBlock {
        /// Acting user
        user_id: UserId,
        /// Outstanding balance
        fine: Money,
    },

    /// Loans plus reservations already fill the role's quota.
    #[error("User {user_id} has reached the limit of {limit} book(s)")]
    BorrowLimitReached {
        /// Acting user
        user_id: UserId,
        /// The role's `max_books_allowed`
        limit: usize,
    },

    /// A loan is so far past due that new borrows are locked.
    #[error("User {user_id} has book {isbn} overdue by {days_overdue} day(s)")]
    OverdueLockout {
        /// Acting user
        user_id: UserId,
        /// The offending loan
        isbn: Isbn,
        /// Days past the due date
        days_overdue: i64,
    },

    // ═══════════════════════════════════════════════════════════
    // Reservation Errors
    // ═══════════════════════════════════════════════════════════

    /// Someone else is already waiting for this book.
    #[error("Book {isbn} is already reserved by {reserved_by}")]
    AlreadyReserved {
        /// Requested book
        isbn: Isbn,
        /// User holding the reservation
        reserved_by: UserId,
    },

    /// Only borrowed books can be reserved; available ones can be borrowed.
    #[error("Book {isbn} is available and cannot be reserved")]
    NotReservable {
        /// Requested book
        isbn: Isbn,
    },

    // ═══════════════════════════════════════════════════════════
    // Return Errors
    // ═══════════════════════════════════════════════════════════

    /// The user has no active loan for this book.
    #[error("User {user_id} is not borrowing book {isbn}")]
    NotBorrowing {
        /// Acting user
        user_id: UserId,
        /// Book they tried to return
        isbn: Isbn,
    },
}

impl LendingError {
    /// Shorthand for a missing book.
    #[must_use]
    pub fn book_not_found(isbn: &Isbn) -> Self {
        Self::NotFound(Missing::Book(isbn.clone()))
    }

    /// Shorthand for a missing user.
    #[must_use]
    pub fn user_not_found(user_id: &UserId) -> Self {
        Self::NotFound(Missing::User(user_id.clone()))
    }
}
