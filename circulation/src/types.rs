//! Domain types: money, books, and users.

use crate::account::Account;
use crate::policy::Role;
use crate::records::ensure_storable;
use circulation_core::{Isbn, UserId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a dollar amount cannot be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid amount: {0}")]
pub struct ParseMoneyError(pub String);

/// Money amount in cents (avoids floating point issues)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// No money
    pub const ZERO: Self = Self(0);

    /// Creates a new `Money` amount from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Creates a `Money` amount from whole dollars
    #[must_use]
    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Checks if this amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, saturating at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, stopping at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies by a whole count, saturating at the maximum
    #[must_use]
    pub const fn saturating_mul(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count))
    }

    /// Formats as a plain decimal dollar amount (`12.50`), as stored in records
    #[must_use]
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Reads a non-negative dollar amount such as `12`, `12.5` or `12.50`.
    ///
    /// Any decimal notation the standard float parser accepts is allowed
    /// (`1e3` included); the value is rounded to the nearest cent.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let dollars: f64 = trimmed
            .parse()
            .map_err(|_| ParseMoneyError(trimmed.to_string()))?;
        if !dollars.is_finite() || dollars < 0.0 {
            return Err(ParseMoneyError(trimmed.to_string()));
        }
        // Rounded and non-negative; `as` saturates on overflow.
        Ok(Self((dollars * 100.0).round() as u64))
    }
}

/// Whether a book is on the shelf or out on loan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BookStatus {
    /// On the shelf
    #[default]
    Available,
    /// On loan to exactly one user
    Borrowed,
}

impl BookStatus {
    /// The token used in catalog records
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Borrowed => "Borrowed",
        }
    }

    /// Reads a status token: exactly `Borrowed` is borrowed, anything else is available
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.trim() == "Borrowed" {
            Self::Borrowed
        } else {
            Self::Available
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    /// Unique key
    pub isbn: Isbn,
    /// Title
    pub title: String,
    /// Author
    pub author: String,
    /// Publisher
    pub publisher: String,
    /// Publication year
    pub year: i32,
    /// Shelf status
    pub status: BookStatus,
    /// User waiting for this book; only ever set while it is borrowed
    pub reserved_by: Option<UserId>,
}

impl Book {
    /// Creates an available, unreserved book
    #[must_use]
    pub fn new(
        isbn: Isbn,
        title: impl Into<String>,
        author: impl Into<String>,
        publisher: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            isbn,
            title: title.into(),
            author: author.into(),
            publisher: publisher.into(),
            year,
            status: BookStatus::Available,
            reserved_by: None,
        }
    }

    /// Checks if the book is on the shelf
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    /// Checks if the book is on loan
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        self.status == BookStatus::Borrowed
    }

    /// Checks that every text field fits the catalog record format.
    ///
    /// # Errors
    ///
    /// [`LendingError::UnstorableField`](crate::LendingError::UnstorableField)
    /// naming the first offending field.
    pub fn ensure_storable(&self) -> crate::error::Result<()> {
        ensure_storable("ISBN", self.isbn.as_str())?;
        ensure_storable("title", &self.title)?;
        ensure_storable("author", &self.author)?;
        ensure_storable("publisher", &self.publisher)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ISBN: {}", self.isbn)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Publisher: {}", self.publisher)?;
        writeln!(f, "Year: {}", self.year)?;
        writeln!(f, "Status: {}", self.status)?;
        match &self.reserved_by {
            Some(user_id) => write!(f, "ReservedBy: {user_id}"),
            None => write!(f, "ReservedBy: None"),
        }
    }
}

/// Partial edit of a book's descriptive fields.
///
/// ISBN, status and reservation are never editable this way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookUpdate {
    /// New title
    pub title: Option<String>,
    /// New author
    pub author: Option<String>,
    /// New publisher
    pub publisher: Option<String>,
    /// New publication year
    pub year: Option<i32>,
}

impl BookUpdate {
    /// An update that changes nothing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the new title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the new author
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the new publisher
    #[must_use]
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Sets the new year
    #[must_use]
    pub const fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Checks the supplied text fields like [`Book::ensure_storable`].
    ///
    /// # Errors
    ///
    /// [`LendingError::UnstorableField`](crate::LendingError::UnstorableField)
    /// naming the first offending field.
    pub fn ensure_storable(&self) -> crate::error::Result<()> {
        let fields = [
            ("title", &self.title),
            ("author", &self.author),
            ("publisher", &self.publisher),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                ensure_storable(field, value)?;
            }
        }
        Ok(())
    }

    /// Applies the supplied fields to `book`
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(publisher) = self.publisher {
            book.publisher = publisher;
        }
        if let Some(year) = self.year {
            book.year = year;
        }
    }
}

/// A library member, with their borrow ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Unique key
    pub id: UserId,
    password: String,
    /// Display name
    pub name: String,
    role: Role,
    /// Outstanding fine
    pub fine: Money,
    /// Active loans, history, reservations
    pub account: Account,
}

impl User {
    /// Creates a user with no fine and an empty account
    #[must_use]
    pub fn new(id: UserId, password: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            password: password.into(),
            name: name.into(),
            role,
            fine: Money::ZERO,
            account: Account::new(),
        }
    }

    /// Sets the starting fine
    #[must_use]
    pub const fn with_fine(mut self, fine: Money) -> Self {
        self.fine = fine;
        self
    }

    /// The user's role, fixed at creation
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The stored password, for writing directory records
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks that the ID, password and name fit the directory record format.
    ///
    /// # Errors
    ///
    /// [`LendingError::UnstorableField`](crate::LendingError::UnstorableField)
    /// naming the first offending field.
    pub fn ensure_storable(&self) -> crate::error::Result<()> {
        ensure_storable("user ID", self.id.as_str())?;
        ensure_storable("password", &self.password)?;
        ensure_storable("name", &self.name)
    }

    /// Plaintext credential check
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    /// Loans and history, for display
    #[must_use]
    pub const fn summary(&self) -> AccountSummary<'_> {
        AccountSummary { user: self }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UserID: {}, Name: {}, Role: {}, Fine: {}",
            self.id, self.name, self.role, self.fine
        )
    }
}

/// Display view of one user's account.
#[derive(Clone, Copy, Debug)]
pub struct AccountSummary<'a> {
    user: &'a User,
}

impl fmt::Display for AccountSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self.user;
        writeln!(f, "User: {} ({}), Fine: {}", user.name, user.role, user.fine)?;
        writeln!(f, "Currently Borrowed:")?;
        for loan in user.account.loans() {
            writeln!(f, "  ISBN: {}, BorrowedDay: {}", loan.isbn, loan.borrowed_on)?;
        }
        write!(f, "History:")?;
        for isbn in user.account.history() {
            write!(f, "\n  ISBN: {isbn}")?;
        }
        Ok(())
    }
}
