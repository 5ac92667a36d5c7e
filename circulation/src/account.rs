//! Per-user borrow ledger.

use circulation_core::{DayStamp, Isbn};

/// One active loan: which book, and the day it was borrowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loan {
    /// Book on loan
    pub isbn: Isbn,
    /// Day the loan started
    pub borrowed_on: DayStamp,
}

/// A user's active loans, return history, and reservation count.
///
/// The ledger does no validation. The lending engine decides what is allowed
/// and keeps book status and ledgers consistent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    loans: Vec<Loan>,
    history: Vec<Isbn>,
    reservation_count: usize,
}

impl Account {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loans: Vec::new(),
            history: Vec::new(),
            reservation_count: 0,
        }
    }

    /// Records a new loan. The caller guarantees `isbn` is not already on loan.
    pub fn add_borrow(&mut self, isbn: Isbn, day: DayStamp) {
        self.loans.push(Loan {
            isbn,
            borrowed_on: day,
        });
    }

    /// Ends the loan for `isbn` and appends it to the history.
    ///
    /// Returns `false`, leaving the history alone, if there was no such loan.
    pub fn remove_borrow(&mut self, isbn: &Isbn) -> bool {
        let Some(index) = self.loans.iter().position(|loan| &loan.isbn == isbn) else {
            return false;
        };
        let loan = self.loans.remove(index);
        self.history.push(loan.isbn);
        true
    }

    /// Whether `isbn` is currently on loan to this user
    #[must_use]
    pub fn is_borrowing(&self, isbn: &Isbn) -> bool {
        self.loans.iter().any(|loan| &loan.isbn == isbn)
    }

    /// Day the active loan of `isbn` started
    #[must_use]
    pub fn borrow_day(&self, isbn: &Isbn) -> Option<DayStamp> {
        self.loans
            .iter()
            .find(|loan| &loan.isbn == isbn)
            .map(|loan| loan.borrowed_on)
    }

    /// Number of active loans
    #[must_use]
    pub fn borrowed_count(&self) -> usize {
        self.loans.len()
    }

    /// Number of reservations placed by this user
    #[must_use]
    pub const fn reservation_count(&self) -> usize {
        self.reservation_count
    }

    /// Overwrites the reservation count
    pub const fn set_reservation_count(&mut self, count: usize) {
        self.reservation_count = count;
    }

    /// Active loans, oldest first
    #[must_use]
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Every returned ISBN, in return order
    #[must_use]
    pub fn history(&self) -> &[Isbn] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrow_and_return_moves_loan_to_history() {
        let mut account = Account::new();
        let isbn = Isbn::new("111");

        account.add_borrow(isbn.clone(), DayStamp::new(10));
        assert!(account.is_borrowing(&isbn));
        assert_eq!(account.borrow_day(&isbn), Some(DayStamp::new(10)));
        assert_eq!(account.borrowed_count(), 1);

        assert!(account.remove_borrow(&isbn));
        assert!(!account.is_borrowing(&isbn));
        assert_eq!(account.borrow_day(&isbn), None);
        assert_eq!(account.history(), [isbn]);
    }

    #[test]
    fn removing_unknown_loan_changes_nothing() {
        let mut account = Account::new();
        account.add_borrow(Isbn::new("111"), DayStamp::new(1));

        assert!(!account.remove_borrow(&Isbn::new("222")));
        assert_eq!(account.borrowed_count(), 1);
        assert!(account.history().is_empty());
    }

    #[test]
    fn history_allows_repeats() {
        let mut account = Account::new();
        let isbn = Isbn::new("111");
        for day in [1, 20] {
            account.add_borrow(isbn.clone(), DayStamp::new(day));
            account.remove_borrow(&isbn);
        }
        assert_eq!(account.history(), [isbn.clone(), isbn]);
    }

    #[test]
    fn reservation_count_is_settable() {
        let mut account = Account::new();
        account.set_reservation_count(2);
        assert_eq!(account.reservation_count(), 2);
    }
}
