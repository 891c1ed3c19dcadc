//! The ledger operations that change balances, the pages that invoke them,
//! and a check that balances still agree with history.

mod audit;
mod collection;
mod operations;
mod payment_endpoint;

pub use audit::{BalanceDiscrepancy, find_balance_discrepancies, log_balance_discrepancies};
pub use collection::{create_collection_endpoint, get_new_collection_page};
pub use operations::{
    FeeRate, FeeSummary, PaymentAmount, add_family, apply_periodic_fee, record_payment,
};
pub use payment_endpoint::record_payment_endpoint;
