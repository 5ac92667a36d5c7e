//! Circulation report binary
//!
//! Opens the library from its files, checks that loans and book status
//! agree, and prints books, users, accounts and the transaction log.

use anyhow::Context;
use circulation::{FileTransactionLog, Library, LibraryConfig};
use circulation_core::{TransactionLog, TransactionRecord};
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = LibraryConfig::from_env();
    init_tracing(&config.log_level);

    let library = Library::open(&config).context("Failed to open library")?;

    let violations = library.verify();
    for violation in &violations {
        tracing::warn!(%violation, "Inconsistent library state");
    }
    if violations.is_empty() {
        tracing::info!("Library state is consistent");
    }

    let transactions = FileTransactionLog::new(config.transactions_path.clone())
        .load()
        .context("Failed to read transaction log")?;

    print_report(&mut io::stdout().lock(), &library, &transactions)
        .context("Failed to write report")?;
    Ok(())
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_report(
    out: &mut impl Write,
    library: &Library,
    transactions: &[TransactionRecord],
) -> io::Result<()> {
    writeln!(out, "----- All Books -----")?;
    for book in library.catalog.all() {
        writeln!(out, "{book}\n")?;
    }
    writeln!(out, "---------------------")?;

    writeln!(out, "\n----- All Users -----")?;
    for user in library.directory.all() {
        writeln!(out, "{user}")?;
    }
    writeln!(out, "---------------------")?;

    writeln!(out, "\n----- Accounts -----")?;
    for user in library.directory.all() {
        writeln!(out, "{}\n", user.summary())?;
    }
    writeln!(out, "--------------------")?;

    writeln!(out, "\n----- All Transactions -----")?;
    for record in transactions {
        writeln!(out, "{record}")?;
    }
    writeln!(out, "----------------------------")
}
