//! The lending state machine.
//!
//! Each operation validates against the acting user's [`RolePolicy`] and the
//! current catalog and account state, then changes book status and ledger
//! together and appends a transaction record. A rejected operation changes
//! nothing.
//!
//! ```text
//! Available --borrow(u)--> Borrowed(owner=u)
//! Borrowed --reserve(v)--> Borrowed(owner=u, reserved=v)
//! Borrowed(owner=u) --return(u)--> Available
//! Borrowed(owner=u, reserved=v) --return(u)--> Borrowed(owner=v)
//! ```
//!
//! [`RolePolicy`]: crate::policy::RolePolicy

use crate::error::{LendingError, Result};
use crate::library::Library;
use crate::types::{BookStatus, Money, User};
use circulation_core::{
    Clock, DayStamp, Isbn, Operation, Reducer, TransactionLog, TransactionRecord, UserId,
};
use std::sync::Arc;

/// Environment dependencies for the lending engine
#[derive(Clone)]
pub struct LendingEnvironment {
    /// Source of "today"
    pub clock: Arc<dyn Clock>,
    /// Where applied operations are recorded
    pub log: Arc<dyn TransactionLog>,
}

impl LendingEnvironment {
    /// Creates a new `LendingEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, log: Arc<dyn TransactionLog>) -> Self {
        Self { clock, log }
    }

    /// Appends a transaction. Failure is logged and otherwise ignored; the
    /// in-memory change it describes has already happened.
    fn record(&self, user_id: &UserId, isbn: &Isbn, operation: Operation, day: DayStamp) {
        let record = TransactionRecord::new(user_id.clone(), isbn.clone(), operation, day);
        if let Err(error) = self.log.append(&record) {
            tracing::warn!(%error, record = %record.to_line(), "Failed to append transaction");
        }
    }
}

/// Result of a borrow request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// The book is now on loan to the user
    Borrowed {
        /// Borrowed book
        isbn: Isbn,
        /// Day the loan started
        day: DayStamp,
    },
    /// The book is out, and nobody has reserved it yet.
    ///
    /// Nothing changed. Call [`LendingEngine::reserve`] to accept.
    ReservationOffered {
        /// Requested book
        isbn: Isbn,
    },
}

/// Result of an accepted reservation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationConfirmation {
    /// Reserved book
    pub isbn: Isbn,
    /// The user's reservation count after this one
    pub reservations: usize,
}

/// How late a returned book was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overdue {
    /// Late, and a fine was added to the user's balance
    Fined {
        /// Days past due
        days: i64,
        /// Amount added
        amount: Money,
    },
    /// Late, reported only
    Late {
        /// Days past due
        days: i64,
    },
}

/// Result of a return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// Returned book
    pub isbn: Isbn,
    /// Set when the loan ran past its due date
    pub overdue: Option<Overdue>,
    /// User the book went straight to, if it was reserved
    pub handed_off_to: Option<UserId>,
}

/// Result of a fine payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinePayment {
    /// The balance is now zero
    Cleared,
    /// Some balance is left
    Partial {
        /// Balance after the payment
        remaining: Money,
    },
}

/// Commands accepted by the [`LendingEngine`] reducer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LendingCommand {
    /// Borrow a book, or be offered a reservation
    Borrow {
        /// Acting user
        user_id: UserId,
        /// Requested book
        isbn: Isbn,
    },
    /// Accept a reservation offer
    Reserve {
        /// Acting user
        user_id: UserId,
        /// Requested book
        isbn: Isbn,
    },
    /// Return a book
    Return {
        /// Acting user
        user_id: UserId,
        /// Returned book
        isbn: Isbn,
    },
    /// Pay toward an outstanding fine
    PayFine {
        /// Acting user
        user_id: UserId,
        /// Amount paid
        amount: Money,
    },
}

/// What the reducer hands back for each command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LendingOutcome {
    /// See [`LendingEngine::borrow`]
    Borrow(BorrowOutcome),
    /// See [`LendingEngine::reserve`]
    Reserve(ReservationConfirmation),
    /// See [`LendingEngine::return_book`]
    Return(ReturnReceipt),
    /// See [`LendingEngine::pay_fine`]
    PayFine(FinePayment),
}

/// Enforces borrowing rules against a [`Library`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LendingEngine;

#[allow(clippy::unused_self)] // Stateless; `&self` keeps the reducer call shape
impl LendingEngine {
    /// Creates a new `LendingEngine`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Borrows `isbn` for `user_id`.
    ///
    /// If the book is out and unreserved, returns
    /// [`BorrowOutcome::ReservationOffered`] without changing anything.
    ///
    /// # Errors
    ///
    /// In check order: `NotFound` (user), `AlreadyBorrowing`, `RoleForbidden`,
    /// `UnpaidFineBlock`, `BorrowLimitReached`, `OverdueLockout`,
    /// `NotFound` (book), `AlreadyReserved`.
    #[tracing::instrument(skip_all, fields(user = %user_id, isbn = %isbn))]
    pub fn borrow(
        &self,
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<BorrowOutcome> {
        Self::try_borrow(library, env, user_id, isbn)
            .inspect_err(|error| tracing::debug!(%error, "Borrow rejected"))
    }

    /// Places a reservation on a borrowed book, completing an offer from
    /// [`borrow`](Self::borrow).
    ///
    /// # Errors
    ///
    /// Any borrow eligibility error, `NotFound` (book), `NotReservable` if the
    /// book is on the shelf, `AlreadyReserved` if someone got there first.
    #[tracing::instrument(skip_all, fields(user = %user_id, isbn = %isbn))]
    pub fn reserve(
        &self,
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<ReservationConfirmation> {
        Self::try_reserve(library, env, user_id, isbn)
            .inspect_err(|error| tracing::debug!(%error, "Reservation rejected"))
    }

    /// Returns `isbn` for `user_id`, charging any overdue fine and handing
    /// the book to its reserving user.
    ///
    /// # Errors
    ///
    /// `NotFound` (user), `RoleForbidden`, `NotBorrowing`.
    #[tracing::instrument(skip_all, fields(user = %user_id, isbn = %isbn))]
    pub fn return_book(
        &self,
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<ReturnReceipt> {
        Self::try_return(library, env, user_id, isbn)
            .inspect_err(|error| tracing::debug!(%error, "Return rejected"))
    }

    /// Pays `amount` toward the user's fine. Overpayment clears the balance.
    ///
    /// # Errors
    ///
    /// `NotFound` (user).
    #[tracing::instrument(skip_all, fields(user = %user_id, %amount))]
    pub fn pay_fine(
        &self,
        library: &mut Library,
        user_id: &UserId,
        amount: Money,
    ) -> Result<FinePayment> {
        let user = library
            .directory
            .find_mut(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))
            .inspect_err(|error| tracing::debug!(%error, "Payment rejected"))?;

        if amount >= user.fine {
            user.fine = Money::ZERO;
            tracing::info!("Fine cleared");
            Ok(FinePayment::Cleared)
        } else {
            user.fine = user.fine.saturating_sub(amount);
            tracing::info!(remaining = %user.fine, "Partial fine payment");
            Ok(FinePayment::Partial {
                remaining: user.fine,
            })
        }
    }

    fn try_borrow(
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<BorrowOutcome> {
        let today = env.clock.today();
        let Library { catalog, directory } = library;

        let user = directory
            .find_mut(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))?;
        Self::check_eligibility(user, isbn, today)?;

        let book = catalog
            .find_mut(isbn)
            .ok_or_else(|| LendingError::book_not_found(isbn))?;

        if book.is_borrowed() {
            return match &book.reserved_by {
                None => Ok(BorrowOutcome::ReservationOffered { isbn: isbn.clone() }),
                Some(reserved_by) => Err(LendingError::AlreadyReserved {
                    isbn: isbn.clone(),
                    reserved_by: reserved_by.clone(),
                }),
            };
        }

        book.status = BookStatus::Borrowed;
        book.reserved_by = None;
        user.account.add_borrow(isbn.clone(), today);
        env.record(user_id, isbn, Operation::Borrow, today);

        tracing::info!(day = %today, "Book borrowed");
        Ok(BorrowOutcome::Borrowed {
            isbn: isbn.clone(),
            day: today,
        })
    }

    fn try_reserve(
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<ReservationConfirmation> {
        let today = env.clock.today();
        let Library { catalog, directory } = library;

        let user = directory
            .find_mut(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))?;
        Self::check_eligibility(user, isbn, today)?;

        let book = catalog
            .find_mut(isbn)
            .ok_or_else(|| LendingError::book_not_found(isbn))?;
        if book.is_available() {
            return Err(LendingError::NotReservable { isbn: isbn.clone() });
        }
        if let Some(reserved_by) = &book.reserved_by {
            return Err(LendingError::AlreadyReserved {
                isbn: isbn.clone(),
                reserved_by: reserved_by.clone(),
            });
        }

        book.reserved_by = Some(user_id.clone());
        let reservations = user.account.reservation_count() + 1;
        user.account.set_reservation_count(reservations);
        env.record(user_id, isbn, Operation::Reserve, today);

        tracing::info!(reservations, "Book reserved");
        Ok(ReservationConfirmation {
            isbn: isbn.clone(),
            reservations,
        })
    }

    fn try_return(
        library: &mut Library,
        env: &LendingEnvironment,
        user_id: &UserId,
        isbn: &Isbn,
    ) -> Result<ReturnReceipt> {
        let today = env.clock.today();
        let Library { catalog, directory } = library;

        let user = directory
            .find_mut(user_id)
            .ok_or_else(|| LendingError::user_not_found(user_id))?;
        let policy = user.role().policy();
        if !policy.can_borrow {
            return Err(LendingError::RoleForbidden {
                user_id: user_id.clone(),
                role: user.role(),
            });
        }
        let borrowed_on = user
            .account
            .borrow_day(isbn)
            .ok_or_else(|| LendingError::NotBorrowing {
                user_id: user_id.clone(),
                isbn: isbn.clone(),
            })?;

        let days_late = today
            .days_since(borrowed_on)
            .saturating_sub(policy.max_borrow_days);
        let overdue = if days_late > 0 {
            Some(match policy.overdue_fine_per_day {
                Some(rate) => {
                    let amount = rate.saturating_mul(u64::try_from(days_late).unwrap_or(u64::MAX));
                    user.fine = user.fine.saturating_add(amount);
                    tracing::info!(days_late, %amount, fine = %user.fine, "Overdue fine charged");
                    Overdue::Fined {
                        days: days_late,
                        amount,
                    }
                }
                None => {
                    tracing::info!(days_late, "Returned late");
                    Overdue::Late { days: days_late }
                }
            })
        } else {
            None
        };

        user.account.remove_borrow(isbn);
        env.record(user_id, isbn, Operation::Return, today);
        tracing::info!(day = %today, "Book returned");

        let mut receipt = ReturnReceipt {
            isbn: isbn.clone(),
            overdue,
            handed_off_to: None,
        };

        let Some(book) = catalog.find_mut(isbn) else {
            tracing::warn!("Returned book is missing from the catalog");
            return Ok(receipt);
        };
        book.status = BookStatus::Available;

        if let Some(next_id) = book.reserved_by.take() {
            if let Some(next) = directory.find_mut(&next_id) {
                book.status = BookStatus::Borrowed;
                if !next.account.is_borrowing(isbn) {
                    next.account.add_borrow(isbn.clone(), today);
                }
                env.record(&next_id, isbn, Operation::Borrow, today);
                tracing::info!(to = %next_id, "Reservation handed off");
                receipt.handed_off_to = Some(next_id);
            } else {
                tracing::warn!(reserved_by = %next_id, "Dropped reservation of removed user");
            }
        }

        Ok(receipt)
    }

    /// Checks run before any borrow or reservation, in order.
    fn check_eligibility(user: &User, isbn: &Isbn, today: DayStamp) -> Result<()> {
        if user.account.is_borrowing(isbn) {
            return Err(LendingError::AlreadyBorrowing {
                user_id: user.id.clone(),
                isbn: isbn.clone(),
            });
        }

        let role = user.role();
        let policy = role.policy();
        if !policy.can_borrow {
            return Err(LendingError::RoleForbidden {
                user_id: user.id.clone(),
                role,
            });
        }

        if policy.blocks_on_unpaid_fine && !user.fine.is_zero() {
            return Err(LendingError::UnpaidFineBlock {
                user_id: user.id.clone(),
                fine: user.fine,
            });
        }

        let held = user.account.borrowed_count() + user.account.reservation_count();
        if held >= policy.max_books_allowed {
            return Err(LendingError::BorrowLimitReached {
                user_id: user.id.clone(),
                limit: policy.max_books_allowed,
            });
        }

        if let Some(threshold) = policy.lockout_threshold() {
            let stale = user
                .account
                .loans()
                .iter()
                .find(|loan| today.days_since(loan.borrowed_on) > threshold);
            if let Some(loan) = stale {
                return Err(LendingError::OverdueLockout {
                    user_id: user.id.clone(),
                    isbn: loan.isbn.clone(),
                    days_overdue: today
                        .days_since(loan.borrowed_on)
                        .saturating_sub(policy.max_borrow_days),
                });
            }
        }

        Ok(())
    }
}

impl Reducer for LendingEngine {
    type State = Library;
    type Action = LendingCommand;
    type Environment = LendingEnvironment;
    type Output = Result<LendingOutcome>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Self::Output {
        match action {
            LendingCommand::Borrow { user_id, isbn } => self
                .borrow(state, env, &user_id, &isbn)
                .map(LendingOutcome::Borrow),
            LendingCommand::Reserve { user_id, isbn } => self
                .reserve(state, env, &user_id, &isbn)
                .map(LendingOutcome::Reserve),
            LendingCommand::Return { user_id, isbn } => self
                .return_book(state, env, &user_id, &isbn)
                .map(LendingOutcome::Return),
            LendingCommand::PayFine { user_id, amount } => self
                .pay_fine(state, &user_id, amount)
                .map(LendingOutcome::PayFine),
        }
    }
}
