//! The append-only history of fees charged and payments received.
//!
//! Rows are only ever written by the operations in [crate::ledger], which
//! keep each family's balance in step with its history.

mod core;

pub use core::{
    LedgerTimestamp, NewTransaction, Transaction, TransactionKind, count_transactions,
    create_transaction_table, list_transactions,
};

pub(crate) use core::insert_transaction;
