//! Registry of books keyed by ISBN.

use crate::error::{LendingError, Result};
use crate::types::{Book, BookUpdate};
use circulation_core::Isbn;
use std::collections::HashMap;

/// All books the library owns.
///
/// Iteration follows insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    books: HashMap<Isbn, Book>,
    order: Vec<Isbn>,
}

impl Catalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a book
    #[must_use]
    pub fn find(&self, isbn: &Isbn) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Looks up a book for mutation
    pub fn find_mut(&mut self, isbn: &Isbn) -> Option<&mut Book> {
        self.books.get_mut(isbn)
    }

    /// Checks if a book exists
    #[must_use]
    pub fn contains(&self, isbn: &Isbn) -> bool {
        self.books.contains_key(isbn)
    }

    /// Adds a book.
    ///
    /// # Errors
    ///
    /// [`LendingError::DuplicateIsbn`] if the ISBN is taken,
    /// [`LendingError::UnstorableField`] if a text field contains a comma or
    /// line break.
    pub fn add(&mut self, book: Book) -> Result<()> {
        if self.contains(&book.isbn) {
            return Err(LendingError::DuplicateIsbn(book.isbn));
        }
        book.ensure_storable()?;
        tracing::debug!(isbn = %book.isbn, title = %book.title, "Book added");
        self.order.push(book.isbn.clone());
        self.books.insert(book.isbn.clone(), book);
        Ok(())
    }

    /// Removes a book that is on the shelf.
    ///
    /// # Errors
    ///
    /// [`LendingError::NotFound`] if absent, [`LendingError::CannotRemoveBorrowedBook`]
    /// if it is on loan.
    pub fn remove(&mut self, isbn: &Isbn) -> Result<Book> {
        let book = self
            .books
            .get(isbn)
            .ok_or_else(|| LendingError::book_not_found(isbn))?;
        if book.is_borrowed() {
            return Err(LendingError::CannotRemoveBorrowedBook(isbn.clone()));
        }
        self.order.retain(|candidate| candidate != isbn);
        let book = self
            .books
            .remove(isbn)
            .ok_or_else(|| LendingError::book_not_found(isbn))?;
        tracing::info!(%isbn, "Book removed");
        Ok(book)
    }

    /// Edits a book's descriptive fields.
    ///
    /// # Errors
    ///
    /// [`LendingError::NotFound`] if absent, [`LendingError::UnstorableField`]
    /// if a new value contains a comma or line break. Nothing changes on error.
    pub fn update(&mut self, isbn: &Isbn, update: BookUpdate) -> Result<()> {
        let book = self
            .find_mut(isbn)
            .ok_or_else(|| LendingError::book_not_found(isbn))?;
        update.ensure_storable()?;
        update.apply_to(book);
        tracing::info!(%isbn, "Book updated");
        Ok(())
    }

    /// Every book, in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Book> {
        self.order.iter().filter_map(|isbn| self.books.get(isbn))
    }

    /// Books on the shelf
    pub fn available(&self) -> impl Iterator<Item = &Book> {
        self.all().filter(|book| book.is_available())
    }

    /// Books on loan
    pub fn borrowed(&self) -> impl Iterator<Item = &Book> {
        self.all().filter(|book| book.is_borrowed())
    }

    /// Number of books
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Checks if the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
