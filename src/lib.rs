//! Duesbook is a web app for keeping the dues ledger of a community
//! organisation.
//!
//! Each family holds some land and has a running balance due. A periodic fee
//! is charged per acre to every family at once, payments are recorded against
//! a single family, and every change to a balance is kept in the family's
//! history.
//!
//! This library provides a web server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod error;
mod error_page;
mod family;
mod html;
mod ledger;
mod logging;
mod navigation;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;
mod validation;

pub use app_state::AppState;
pub use database_id::{FamilyId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use family::{Family, FamilyName, NewFamily, count_families, get_family, list_families};
pub use html::STATIC_ASSETS;
pub use ledger::{
    BalanceDiscrepancy, FeeRate, FeeSummary, PaymentAmount, add_family, apply_periodic_fee,
    find_balance_discrepancies, log_balance_discrepancies, record_payment,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{
    LedgerTimestamp, Transaction, TransactionKind, count_transactions, list_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
