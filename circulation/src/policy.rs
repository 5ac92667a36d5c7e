//! Per-role borrowing limits.
//!
//! A user's [`Role`] is fixed at creation and resolves, through a static
//! table, to the [`RolePolicy`] the engine enforces. There is no per-role
//! behavior beyond what the table says.

use crate::types::Money;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fine charged to a student for each day a loan runs past its due date.
pub const STUDENT_FINE_PER_DAY: Money = Money::from_cents(1_000);

/// Days past due after which a faculty member's other borrows are locked.
pub const FACULTY_OVERDUE_GRACE_DAYS: i64 = 60;

/// Error returned when a role token is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// The kind of user, which determines their lending policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Short loans, small quota, fined when late
    Student,
    /// Long loans, larger quota, locked out when very late
    Faculty,
    /// Administers the library and never borrows
    Librarian,
}

impl Role {
    /// The token used in directory records
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Faculty => "Faculty",
            Self::Librarian => "Librarian",
        }
    }

    /// Limits that apply to this role
    #[must_use]
    pub const fn policy(self) -> RolePolicy {
        match self {
            Self::Student => RolePolicy::STUDENT,
            Self::Faculty => RolePolicy::FACULTY,
            Self::Librarian => RolePolicy::LIBRARIAN,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Student" => Ok(Self::Student),
            "Faculty" => Ok(Self::Faculty),
            "Librarian" => Ok(Self::Librarian),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Borrowing limits and overdue behavior for one role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RolePolicy {
    /// Loans plus reservations a user may hold at once
    pub max_books_allowed: usize,
    /// Days a loan may run before it is overdue
    pub max_borrow_days: i64,
    /// Fine per overdue day, or `None` if lateness is only reported
    pub overdue_fine_per_day: Option<Money>,
    /// Whether the role may borrow (and therefore return) at all
    pub can_borrow: bool,
    /// Whether any unpaid fine blocks new borrows
    pub blocks_on_unpaid_fine: bool,
    /// Days past due after which new borrows are locked, if the role has a lockout
    pub overdue_lockout_days: Option<i64>,
}

impl RolePolicy {
    /// Student limits: 3 books, 15 days, $10 per overdue day.
    pub const STUDENT: Self = Self {
        max_books_allowed: 3,
        max_borrow_days: 15,
        overdue_fine_per_day: Some(STUDENT_FINE_PER_DAY),
        can_borrow: true,
        blocks_on_unpaid_fine: true,
        overdue_lockout_days: None,
    };

    /// Faculty limits: 5 books, 30 days, locked out 60 days past due.
    pub const FACULTY: Self = Self {
        max_books_allowed: 5,
        max_borrow_days: 30,
        overdue_fine_per_day: None,
        can_borrow: true,
        blocks_on_unpaid_fine: false,
        overdue_lockout_days: Some(FACULTY_OVERDUE_GRACE_DAYS),
    };

    /// Librarians do not borrow.
    pub const LIBRARIAN: Self = Self {
        max_books_allowed: 0,
        max_borrow_days: 0,
        overdue_fine_per_day: None,
        can_borrow: false,
        blocks_on_unpaid_fine: false,
        overdue_lockout_days: None,
    };

    /// Whether overdue days accrue a monetary fine
    #[must_use]
    pub const fn applies_fine(&self) -> bool {
        self.overdue_fine_per_day.is_some()
    }

    /// Age in days beyond which a loan triggers the overdue lockout
    #[must_use]
    pub const fn lockout_threshold(&self) -> Option<i64> {
        match self.overdue_lockout_days {
            Some(grace) => Some(self.max_borrow_days + grace),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table() {
        let student = Role::Student.policy();
        assert_eq!(student.max_books_allowed, 3);
        assert_eq!(student.max_borrow_days, 15);
        assert!(student.applies_fine());
        assert!(student.can_borrow);
        assert!(student.blocks_on_unpaid_fine);
        assert_eq!(student.lockout_threshold(), None);

        let faculty = Role::Faculty.policy();
        assert_eq!(faculty.max_books_allowed, 5);
        assert_eq!(faculty.max_borrow_days, 30);
        assert!(!faculty.applies_fine());
        assert_eq!(faculty.lockout_threshold(), Some(90));

        let librarian = Role::Librarian.policy();
        assert_eq!(librarian.max_books_allowed, 0);
        assert!(!librarian.can_borrow);
    }

    #[test]
    fn role_tokens() {
        for role in [Role::Student, Role::Faculty, Role::Librarian] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "Admin".parse::<Role>(),
            Err(ParseRoleError("Admin".to_string()))
        );
    }
}
