//! Line codecs for the catalog and directory files.
//!
//! ```text
//! isbn,title,author,publisher,year,status
//! userID,password,name,role,fine
//! ```
//!
//! Fields are comma separated with no quoting and are trimmed. Trailing
//! fields beyond the expected count are ignored. Reservations are not part
//! of the catalog format; they are rebuilt from the transaction log.
//!
//! Since nothing is quoted, a field may not contain a comma or a line
//! break. [`ensure_storable`] is checked whenever text enters the library.

use crate::error::LendingError;
use crate::policy::{ParseRoleError, Role};
use crate::types::{Book, BookStatus, Money, ParseMoneyError, User};
use circulation_core::{Isbn, ParseIdError, UserId};
use thiserror::Error;

/// Why a record line was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Too few fields on the line.
    #[error("Expected {expected} fields, found {found}")]
    FieldCount {
        /// Fields the format requires
        expected: usize,
        /// Fields present
        found: usize,
    },

    /// Empty or malformed ISBN or user ID.
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),

    /// Year is not an integer.
    #[error("Invalid year: {0}")]
    InvalidYear(String),

    /// Role is not `Student`, `Faculty` or `Librarian`.
    #[error(transparent)]
    UnknownRole(#[from] ParseRoleError),

    /// Fine is not a non-negative amount.
    #[error(transparent)]
    InvalidFine(#[from] ParseMoneyError),
}

const BOOK_FIELDS: usize = 6;
const USER_FIELDS: usize = 5;

const SEPARATORS: [char; 3] = [',', '\n', '\r'];

/// Checks that `value` can be written into a record field unchanged.
///
/// # Errors
///
/// [`LendingError::UnstorableField`] if it contains a comma or line break.
pub fn ensure_storable(field: &'static str, value: &str) -> Result<(), LendingError> {
    if value.contains(SEPARATORS) {
        return Err(LendingError::UnstorableField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, RecordError> {
    let fields: Vec<&str> = line
        .trim_end_matches(['\r', '\n'])
        .split(',')
        .map(str::trim)
        .collect();
    if fields.len() < expected {
        return Err(RecordError::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Reads one catalog line.
///
/// The status token is lenient: only `Borrowed` means borrowed.
///
/// # Errors
///
/// Returns a [`RecordError`] if a field is missing, the ISBN is empty, or the
/// year is not an integer.
pub fn parse_book(line: &str) -> Result<Book, RecordError> {
    let fields = split_fields(line, BOOK_FIELDS)?;
    let isbn: Isbn = fields[0].parse()?;
    let year: i32 = fields[4]
        .parse()
        .map_err(|_| RecordError::InvalidYear(fields[4].to_string()))?;

    let mut book = Book::new(isbn, fields[1], fields[2], fields[3], year);
    book.status = BookStatus::from_token(fields[5]);
    Ok(book)
}

/// Writes one catalog line (without the trailing newline)
#[must_use]
pub fn format_book(book: &Book) -> String {
    format!(
        "{},{},{},{},{},{}",
        book.isbn, book.title, book.author, book.publisher, book.year, book.status
    )
}

/// Reads one directory line into a user with an empty account.
///
/// # Errors
///
/// Returns a [`RecordError`] if a field is missing, the user ID is empty,
/// the role is unknown, or the fine is not a non-negative amount.
pub fn parse_user(line: &str) -> Result<User, RecordError> {
    let fields = split_fields(line, USER_FIELDS)?;
    let user_id: UserId = fields[0].parse()?;
    let role: Role = fields[3].parse()?;
    let fine: Money = fields[4].parse()?;

    Ok(User::new(user_id, fields[1], fields[2], role).with_fine(fine))
}

/// Writes one directory line (without the trailing newline)
#[must_use]
pub fn format_user(user: &User) -> String {
    format!(
        "{},{},{},{},{}",
        user.id,
        user.password(),
        user.name,
        user.role(),
        user.fine.to_decimal_string()
    )
}
