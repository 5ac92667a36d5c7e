//! End-to-end lending scenarios against a fixed clock and an in-memory log.

#![allow(clippy::unwrap_used)]

use circulation::engine::{BorrowOutcome, Overdue, ReturnReceipt};
use circulation::{
    Book, LendingEngine, LendingEnvironment, LendingError, Library, Money, Role, User,
};
use circulation_core::{DayStamp, Isbn, Operation, TransactionRecord, UserId};
use circulation_testing::{FixedClock, InMemoryTransactionLog};
use std::sync::Arc;

struct Harness {
    library: Library,
    engine: LendingEngine,
    clock: FixedClock,
    log: InMemoryTransactionLog,
    env: LendingEnvironment,
}

impl Harness {
    fn new(day: i64) -> Self {
        let mut library = Library::default();
        for isbn in ["111", "222", "333"] {
            library
                .catalog
                .add(Book::new(Isbn::new(isbn), format!("Book {isbn}"), "Author", "Pub", 2001))
                .unwrap();
        }
        for (id, role) in [
            ("U1", Role::Student),
            ("U2", Role::Student),
            ("F1", Role::Faculty),
        ] {
            library
                .directory
                .add(User::new(UserId::new(id), "pw", id, role))
                .unwrap();
        }

        let clock = FixedClock::at_day(day);
        let log = InMemoryTransactionLog::new();
        let env = LendingEnvironment::new(Arc::new(clock.clone()), Arc::new(log.clone()));
        Self {
            library,
            engine: LendingEngine::new(),
            clock,
            log,
            env,
        }
    }

    fn borrow(&mut self, user: &str, isbn: &str) -> Result<BorrowOutcome, LendingError> {
        self.engine
            .borrow(&mut self.library, &self.env, &UserId::new(user), &Isbn::new(isbn))
    }

    fn reserve(&mut self, user: &str, isbn: &str) {
        self.engine
            .reserve(&mut self.library, &self.env, &UserId::new(user), &Isbn::new(isbn))
            .unwrap();
    }

    fn return_book(&mut self, user: &str, isbn: &str) -> Result<ReturnReceipt, LendingError> {
        self.engine
            .return_book(&mut self.library, &self.env, &UserId::new(user), &Isbn::new(isbn))
    }

    fn user(&self, id: &str) -> &User {
        self.library.directory.find(&UserId::new(id)).unwrap()
    }

    fn book(&self, isbn: &str) -> &Book {
        self.library.catalog.find(&Isbn::new(isbn)).unwrap()
    }
}

#[test]
fn borrow_then_return_restores_the_shelf() {
    let mut h = Harness::new(100);

    h.borrow("U1", "111").unwrap();
    h.clock.advance_days(3);
    let receipt = h.return_book("U1", "111").unwrap();

    assert_eq!(receipt.overdue, None);
    assert!(h.book("111").is_available());
    let account = &h.user("U1").account;
    assert!(!account.is_borrowing(&Isbn::new("111")));
    assert_eq!(account.history(), [Isbn::new("111")]);
    assert_eq!(h.log.operations(), vec![Operation::Borrow, Operation::Return]);
    assert!(h.library.verify().is_empty());
}

#[test]
fn student_with_unpaid_fine_is_blocked() {
    let mut h = Harness::new(100);
    h.library.directory.find_mut(&UserId::new("U1")).unwrap().fine = Money::from_dollars(5);

    assert_eq!(
        h.borrow("U1", "111"),
        Err(LendingError::UnpaidFineBlock {
            user_id: UserId::new("U1"),
            fine: Money::from_dollars(5),
        })
    );
    assert!(h.log.is_empty());

    h.engine
        .pay_fine(&mut h.library, &UserId::new("U1"), Money::from_dollars(5))
        .unwrap();
    assert!(matches!(h.borrow("U1", "111"), Ok(BorrowOutcome::Borrowed { .. })));
}

#[test]
fn faculty_fine_does_not_block() {
    let mut h = Harness::new(100);
    h.library.directory.find_mut(&UserId::new("F1")).unwrap().fine = Money::from_dollars(5);

    assert!(h.borrow("F1", "111").is_ok());
}

#[test]
fn faculty_lockout_after_ninety_days() {
    let mut h = Harness::new(0);
    h.borrow("F1", "111").unwrap();

    h.clock.set_day(89);
    assert!(h.borrow("F1", "222").is_ok());

    h.clock.set_day(91);
    assert_eq!(
        h.borrow("F1", "333"),
        Err(LendingError::OverdueLockout {
            user_id: UserId::new("F1"),
            isbn: Isbn::new("111"),
            days_overdue: 61,
        })
    );
}

#[test]
fn faculty_lockout_threshold_is_exclusive() {
    let mut h = Harness::new(0);
    h.borrow("F1", "111").unwrap();

    h.clock.set_day(90);
    assert!(h.borrow("F1", "222").is_ok());
}

#[test]
fn reservation_hands_off_on_return() {
    let mut h = Harness::new(10);
    h.borrow("U1", "111").unwrap();
    assert_eq!(
        h.borrow("U2", "111"),
        Ok(BorrowOutcome::ReservationOffered {
            isbn: Isbn::new("111")
        })
    );
    h.reserve("U2", "111");

    h.clock.set_day(12);
    let receipt = h.return_book("U1", "111").unwrap();

    assert_eq!(receipt.handed_off_to, Some(UserId::new("U2")));
    let book = h.book("111");
    assert!(book.is_borrowed());
    assert_eq!(book.reserved_by, None);
    assert_eq!(
        h.user("U2").account.borrow_day(&Isbn::new("111")),
        Some(DayStamp::new(12))
    );

    let records = h.log.records();
    assert_eq!(
        records[records.len() - 2..],
        [
            TransactionRecord::new(UserId::new("U1"), Isbn::new("111"), Operation::Return, DayStamp::new(12)),
            TransactionRecord::new(UserId::new("U2"), Isbn::new("111"), Operation::Borrow, DayStamp::new(12)),
        ]
    );
    assert!(h.library.verify().is_empty());
}

#[test]
fn dangling_reservation_is_dropped() {
    let mut h = Harness::new(10);
    h.borrow("U1", "111").unwrap();
    h.reserve("U2", "111");
    h.library.directory.remove(&UserId::new("U2")).unwrap();
    let before = h.log.len();

    let receipt = h.return_book("U1", "111").unwrap();

    assert_eq!(receipt.handed_off_to, None);
    let book = h.book("111");
    assert!(book.is_available());
    assert_eq!(book.reserved_by, None);
    assert_eq!(h.log.len(), before + 1);
    assert_eq!(h.log.operations().last(), Some(&Operation::Return));
    assert!(h.library.verify().is_empty());
}

#[test]
fn late_student_return_charges_fifty_dollars() {
    let mut h = Harness::new(10);
    h.borrow("U1", "111").unwrap();

    h.clock.set_day(30);
    let receipt = h.return_book("U1", "111").unwrap();

    assert_eq!(
        receipt.overdue,
        Some(Overdue::Fined {
            days: 5,
            amount: Money::from_dollars(50),
        })
    );
    assert_eq!(h.user("U1").fine, Money::from_dollars(50));
    assert!(matches!(
        h.borrow("U1", "222"),
        Err(LendingError::UnpaidFineBlock { .. })
    ));
}

#[test]
fn borrowed_book_cannot_leave_catalog_and_borrower_cannot_leave_directory() {
    let mut h = Harness::new(10);
    h.borrow("U1", "111").unwrap();

    assert_eq!(
        h.library.catalog.remove(&Isbn::new("111")),
        Err(LendingError::CannotRemoveBorrowedBook(Isbn::new("111")))
    );
    assert!(matches!(
        h.library.directory.remove(&UserId::new("U1")),
        Err(LendingError::CannotRemoveUserWithActiveBorrows { active: 1, .. })
    ));

    h.return_book("U1", "111").unwrap();
    assert!(h.library.catalog.remove(&Isbn::new("111")).is_ok());
    assert!(h.library.directory.remove(&UserId::new("U1")).is_ok());
}
