//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for appending to and querying the ledger
//! - View handlers for recording transactions from the web

mod core;
mod create_transaction_endpoint;
mod new_transaction_page;

pub use self::core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction,
    create_transactions_table, get_expenses_since, get_last_transaction, sum_by_type,
};
pub use create_transaction_endpoint::create_transaction_endpoint;
pub use new_transaction_page::get_new_transaction_page;

#[cfg(test)]
pub use self::core::count_transactions;
