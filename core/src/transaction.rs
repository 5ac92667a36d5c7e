//! Transaction records for the lending log.
//!
//! A transaction is an immutable fact about one lending operation that has
//! already been applied: who did it, to which book, what happened, and on
//! which day. The log of transactions is replayed at startup to rebuild loan
//! and reservation state that the catalog and directory files do not carry.
//!
//! # Wire format
//!
//! One record per line, comma separated, no quoting:
//!
//! ```text
//! userID,isbn,operation,dayStamp
//! s001,978-0131103627,borrow,20054
//! ```
//!
//! # Example
//!
//! ```
//! use circulation_core::transaction::{Operation, TransactionRecord};
//! use circulation_core::{DayStamp, Isbn, UserId};
//!
//! let record: TransactionRecord = "s001,111,borrow,20054".parse().unwrap();
//! assert_eq!(record.operation, Operation::Borrow);
//! assert_eq!(record.day, DayStamp::new(20054));
//! assert_eq!(record.to_line(), "s001,111,borrow,20054");
//! ```

use crate::environment::DayStamp;
use crate::ids::{Isbn, UserId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a transaction line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTransactionError {
    /// The line did not have the four expected fields.
    #[error("Expected 4 fields, found {0}")]
    FieldCount(usize),

    /// The user ID or ISBN field was empty or invalid.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// The operation field was not one of `borrow`, `return`, `reserve`.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The day-stamp field was not an integer.
    #[error("Invalid day-stamp: {0}")]
    InvalidDayStamp(String),
}

/// The kind of lending operation a transaction records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A loan started (including automatic reservation hand-off)
    Borrow,
    /// A loan ended
    Return,
    /// A reservation was placed on a borrowed book
    Reserve,
}

impl Operation {
    /// The token used in the transaction log
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrow => "borrow",
            Self::Return => "return",
            Self::Reserve => "reserve",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseTransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "borrow" => Ok(Self::Borrow),
            "return" => Ok(Self::Return),
            "reserve" => Ok(Self::Reserve),
            other => Err(ParseTransactionError::UnknownOperation(other.to_string())),
        }
    }
}

/// One line of the transaction log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    /// The user the operation was performed for
    pub user_id: UserId,
    /// The book involved
    pub isbn: Isbn,
    /// What happened
    pub operation: Operation,
    /// The day the operation was applied
    pub day: DayStamp,
}

impl TransactionRecord {
    /// Creates a new transaction record
    #[must_use]
    pub const fn new(user_id: UserId, isbn: Isbn, operation: Operation, day: DayStamp) -> Self {
        Self {
            user_id,
            isbn,
            operation,
            day,
        }
    }

    /// Encodes the record as a log line (without the trailing newline)
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.user_id, self.isbn, self.operation, self.day
        )
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UserID: {}, ISBN: {}, Operation: {}, DayStamp: {}",
            self.user_id, self.isbn, self.operation, self.day
        )
    }
}

impl FromStr for TransactionRecord {
    type Err = ParseTransactionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        let [user_id, isbn, operation, day] = fields.as_slice() else {
            return Err(ParseTransactionError::FieldCount(fields.len()));
        };

        let user_id: UserId = user_id
            .parse()
            .map_err(|e: crate::ids::ParseIdError| ParseTransactionError::InvalidId(e.to_string()))?;
        let isbn: Isbn = isbn
            .parse()
            .map_err(|e: crate::ids::ParseIdError| ParseTransactionError::InvalidId(e.to_string()))?;
        let operation: Operation = operation.parse()?;
        let day = day
            .trim()
            .parse::<i64>()
            .map(DayStamp::new)
            .map_err(|_| ParseTransactionError::InvalidDayStamp(day.trim().to_string()))?;

        Ok(Self::new(user_id, isbn, operation, day))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_operations() {
        for (token, operation) in [
            ("borrow", Operation::Borrow),
            ("return", Operation::Return),
            ("reserve", Operation::Reserve),
        ] {
            let line = format!("u1,111,{token},5");
            let record: Result<TransactionRecord, _> = line.parse();
            assert_eq!(
                record,
                Ok(TransactionRecord::new(
                    UserId::new("u1"),
                    Isbn::new("111"),
                    operation,
                    DayStamp::new(5),
                ))
            );
        }
    }

    #[test]
    fn tolerates_carriage_return_and_padding() {
        let record: Result<TransactionRecord, _> = " u1 , 111 ,return, 42 \r".parse();
        assert_eq!(record.map(|r| r.day), Ok(DayStamp::new(42)));
    }

    #[test]
    fn rejects_unknown_operation() {
        let record: Result<TransactionRecord, _> = "u1,111,renew,5".parse();
        assert_eq!(
            record,
            Err(ParseTransactionError::UnknownOperation("renew".to_string()))
        );
    }

    #[test]
    fn rejects_bad_day_stamp() {
        let record: Result<TransactionRecord, _> = "u1,111,borrow,yesterday".parse();
        assert!(matches!(
            record,
            Err(ParseTransactionError::InvalidDayStamp(ref day)) if day == "yesterday"
        ));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let record: Result<TransactionRecord, _> = "u1,111,borrow".parse();
        assert_eq!(record, Err(ParseTransactionError::FieldCount(3)));
    }

    #[test]
    fn rejects_empty_user() {
        let record: Result<TransactionRecord, _> = ",111,borrow,1".parse();
        assert!(matches!(record, Err(ParseTransactionError::InvalidId(_))));
    }

    #[test]
    fn display_matches_log_listing() {
        let record = TransactionRecord::new(
            UserId::new("f1"),
            Isbn::new("222"),
            Operation::Reserve,
            DayStamp::new(7),
        );
        assert_eq!(
            record.to_string(),
            "UserID: f1, ISBN: 222, Operation: reserve, DayStamp: 7"
        );
    }
}
