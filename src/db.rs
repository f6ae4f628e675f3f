//! Sets up the tables for the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transactions_table, user::create_users_table};

/// Create the tables for the application's domain models if they do not already exist.
///
/// Table creation happens in a single exclusive transaction so that two server
/// processes pointed at the same database file cannot interleave their setup.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_users_table(&transaction)?;
    create_transactions_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
