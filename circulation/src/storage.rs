//! Loading and saving the library's flat files.
//!
//! Loading is best effort: a malformed line is logged and skipped, never
//! fatal. A missing file loads as empty. Only I/O failures are errors.

use crate::catalog::Catalog;
use crate::config::LibraryConfig;
use crate::directory::Directory;
use crate::library::Library;
use crate::records;
use crate::replay;
use circulation_core::{TransactionLog, TransactionLogError, TransactionRecord};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing library files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The transaction log could not be read back.
    #[error("Cannot load transaction log {}: {source}", .path.display())]
    Log {
        /// Log file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: TransactionLogError,
    },
}

impl StorageError {
    fn at(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How many lines of a file were used and how many were skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines applied
    pub accepted: usize,
    /// Malformed or inapplicable lines
    pub skipped: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} accepted, {} skipped", self.accepted, self.skipped)
    }
}

/// Calls `handle` with each non-blank line and its 1-based line number.
fn for_each_record<R, F>(reader: R, mut handle: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str),
{
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        handle(index + 1, &line);
    }
    Ok(())
}

/// Reads a catalog file.
///
/// Later lines repeating an ISBN are skipped.
///
/// # Errors
///
/// Returns an error only if reading fails.
pub fn load_catalog<R: BufRead>(reader: R) -> io::Result<(Catalog, LoadReport)> {
    let mut catalog = Catalog::new();
    let mut report = LoadReport::default();
    for_each_record(reader, |line_number, line| {
        let added = records::parse_book(line)
            .map_err(|error| error.to_string())
            .and_then(|book| catalog.add(book).map_err(|error| error.to_string()));
        match added {
            Ok(()) => report.accepted += 1,
            Err(error) => {
                tracing::warn!(line = line_number, %error, "Skipping catalog record");
                report.skipped += 1;
            }
        }
    })?;
    Ok((catalog, report))
}

/// Reads a directory file. Every user starts with an empty account.
///
/// # Errors
///
/// Returns an error only if reading fails.
pub fn load_directory<R: BufRead>(reader: R) -> io::Result<(Directory, LoadReport)> {
    let mut directory = Directory::new();
    let mut report = LoadReport::default();
    for_each_record(reader, |line_number, line| {
        let added = records::parse_user(line)
            .map_err(|error| error.to_string())
            .and_then(|user| directory.add(user).map_err(|error| error.to_string()));
        match added {
            Ok(()) => report.accepted += 1,
            Err(error) => {
                tracing::warn!(line = line_number, %error, "Skipping directory record");
                report.skipped += 1;
            }
        }
    })?;
    Ok((directory, report))
}

/// Writes every book, one line each.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_catalog<W: Write>(mut writer: W, catalog: &Catalog) -> io::Result<()> {
    for book in catalog.all() {
        writeln!(writer, "{}", records::format_book(book))?;
    }
    writer.flush()
}

/// Writes every user, one line each. Accounts are not written.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_directory<W: Write>(mut writer: W, directory: &Directory) -> io::Result<()> {
    for user in directory.all() {
        writeln!(writer, "{}", records::format_user(user))?;
    }
    writer.flush()
}

/// Opens `path` for reading, or `None` with a warning if it does not exist.
fn open_optional(path: &Path) -> Result<Option<BufReader<File>>, StorageError> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "File not found; starting empty");
            Ok(None)
        }
        Err(error) => Err(StorageError::at(path)(error)),
    }
}

impl Library {
    /// Loads catalog, then directory, then replays the transaction log.
    ///
    /// Unparsable log lines and records naming unknown users or books are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if an existing file cannot be read.
    pub fn open(config: &LibraryConfig) -> Result<Self, StorageError> {
        let catalog = match open_optional(&config.books_path)? {
            Some(reader) => {
                let (catalog, report) =
                    load_catalog(reader).map_err(StorageError::at(&config.books_path))?;
                tracing::info!(path = %config.books_path.display(), %report, "Catalog loaded");
                catalog
            }
            None => Catalog::new(),
        };

        let directory = match open_optional(&config.users_path)? {
            Some(reader) => {
                let (directory, report) =
                    load_directory(reader).map_err(StorageError::at(&config.users_path))?;
                tracing::info!(path = %config.users_path.display(), %report, "Directory loaded");
                directory
            }
            None => Directory::new(),
        };

        let log = FileTransactionLog::new(config.transactions_path.clone());
        let transactions = log.load().map_err(|source| StorageError::Log {
            path: config.transactions_path.clone(),
            source,
        })?;
        let mut library = Self::new(catalog, directory);
        let report = replay::replay(&mut library, transactions);
        tracing::info!(path = %config.transactions_path.display(), %report, "Transactions replayed");
        Ok(library)
    }

    /// Writes the catalog and directory files. The transaction log is
    /// append-only and is not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a file cannot be written.
    pub fn save(&self, config: &LibraryConfig) -> Result<(), StorageError> {
        let books = File::create(&config.books_path).map_err(StorageError::at(&config.books_path))?;
        write_catalog(BufWriter::new(books), &self.catalog)
            .map_err(StorageError::at(&config.books_path))?;

        let users = File::create(&config.users_path).map_err(StorageError::at(&config.users_path))?;
        write_directory(BufWriter::new(users), &self.directory)
            .map_err(StorageError::at(&config.users_path))?;

        tracing::info!(
            books = self.catalog.len(),
            users = self.directory.len(),
            "Library saved"
        );
        Ok(())
    }
}

/// Transaction log kept in a text file, one record per line.
///
/// Each append opens the file, writes one line, and closes it again.
#[derive(Clone, Debug)]
pub struct FileTransactionLog {
    path: PathBuf,
}

impl FileTransactionLog {
    /// Creates a log backed by `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TransactionLog for FileTransactionLog {
    fn append(&self, record: &TransactionRecord) -> Result<(), TransactionLogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_line())?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<TransactionRecord>, TransactionLogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "Transaction log not found; starting empty");
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };

        let mut loaded = Vec::new();
        for_each_record(BufReader::new(file), |line_number, line| {
            match line.parse::<TransactionRecord>() {
                Ok(record) => loaded.push(record),
                Err(error) => {
                    tracing::warn!(line = line_number, %error, "Skipping transaction record");
                }
            }
        })?;
        Ok(loaded)
    }
}
