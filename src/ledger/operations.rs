//! The operations that move money: adding a family with an opening balance,
//! charging a periodic fee to every family, and recording a payment.
//!
//! Each operation updates balances and appends history inside one SQLite
//! transaction. If any statement fails the transaction is dropped without
//! committing, so a balance never changes without its matching history row.

use std::fmt::Display;

use rusqlite::Connection;

use crate::{
    Error,
    database_id::FamilyId,
    family::{Family, NewFamily, adjust_balance, insert_family},
    transaction::{
        LedgerTimestamp, NewTransaction, Transaction, TransactionKind, insert_transaction,
    },
};

/// The description of the transaction recording a family's opening balance.
pub const INITIAL_BALANCE_DESCRIPTION: &str = "Initial Balance";
/// The description of the transaction recording a payment.
pub const PAYMENT_DESCRIPTION: &str = "Payment Received";

/// A fee per acre of land, greater than zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeRate(f64);

impl FeeRate {
    /// Create a fee rate.
    ///
    /// # Errors
    /// Returns [Error::NonFiniteNumber] for NaN or infinity and
    /// [Error::NonPositiveRate] for zero or less.
    pub fn new(rate: f64) -> Result<Self, Error> {
        if !rate.is_finite() {
            Err(Error::NonFiniteNumber(rate))
        } else if rate <= 0.0 {
            Err(Error::NonPositiveRate(rate))
        } else {
            Ok(Self(rate))
        }
    }

    /// The rate as a number.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl Display for FeeRate {
    /// Whole rates keep one decimal place, e.g. "500.0".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// An amount of money received from a family, greater than zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentAmount(f64);

impl PaymentAmount {
    /// Create a payment amount.
    ///
    /// # Errors
    /// Returns [Error::NonFiniteNumber] for NaN or infinity and
    /// [Error::NonPositivePayment] for zero or less.
    pub fn new(amount: f64) -> Result<Self, Error> {
        if !amount.is_finite() {
            Err(Error::NonFiniteNumber(amount))
        } else if amount <= 0.0 {
            Err(Error::NonPositivePayment(amount))
        } else {
            Ok(Self(amount))
        }
    }

    /// The amount as a number.
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// The outcome of charging a periodic fee.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeeSummary {
    /// How many families were charged. Families without land are skipped.
    pub families_charged: u32,
    /// The sum of the fees charged.
    pub total_charged: f64,
}

/// The description of the transaction for a periodic fee charged at `rate`.
pub fn periodic_fee_description(rate: FeeRate) -> String {
    format!("Periodic Fee (@{rate}/acre)")
}

/// Add a family to the ledger and record its opening balance.
///
/// A positive opening balance is recorded as a debit, and a negative one as a
/// credit of the same size, so the history always sums to the balance due.
/// No transaction is recorded for an opening balance of zero.
///
/// # Errors
/// Returns [Error::SqlError] if any statement fails, in which case nothing is saved.
pub fn add_family(
    new_family: NewFamily,
    now: LedgerTimestamp,
    connection: &Connection,
) -> Result<Family, Error> {
    let tx = connection.unchecked_transaction()?;

    let family = insert_family(&new_family, &tx)?;

    if let Some(kind) = opening_balance_kind(new_family.opening_due) {
        insert_transaction(
            NewTransaction {
                family_id: family.id,
                date_time: now,
                description: INITIAL_BALANCE_DESCRIPTION.to_owned(),
                amount: new_family.opening_due.abs(),
                kind,
            },
            &tx,
        )?;
    }

    tx.commit()?;

    tracing::info!(
        "Added family {} ({}) with an opening balance of {}",
        family.id,
        family.name,
        family.balance_due
    );

    Ok(family)
}

fn opening_balance_kind(opening_due: f64) -> Option<TransactionKind> {
    if opening_due > 0.0 {
        Some(TransactionKind::Debit)
    } else if opening_due < 0.0 {
        Some(TransactionKind::Credit)
    } else {
        None
    }
}

/// Charge every family `rate` per acre of land they hold.
///
/// Families whose fee comes to zero (i.e., no land) are skipped and get no
/// transaction. All families are charged or none are.
///
/// # Errors
/// Returns [Error::NonFiniteNumber] if a fee is too large to represent and
/// [Error::SqlError] if any statement fails. In either case no family is charged.
pub fn apply_periodic_fee(
    rate: FeeRate,
    now: LedgerTimestamp,
    connection: &Connection,
) -> Result<FeeSummary, Error> {
    let tx = connection.unchecked_transaction()?;

    let land_areas = get_land_areas(&tx)?;
    let description = periodic_fee_description(rate);
    let mut summary = FeeSummary::default();

    for (family_id, land_area) in land_areas {
        let fee = land_area * rate.as_f64();

        if !fee.is_finite() {
            tracing::error!(
                "The fee for family {family_id} with land area {land_area} at {rate}/acre overflowed"
            );
            return Err(Error::NonFiniteNumber(fee));
        }

        if fee <= 0.0 {
            tracing::debug!("Skipping family {family_id} with land area {land_area}");
            continue;
        }

        adjust_balance(family_id, fee, &tx)?;
        insert_transaction(
            NewTransaction {
                family_id,
                date_time: now,
                description: description.clone(),
                amount: fee,
                kind: TransactionKind::Debit,
            },
            &tx,
        )?;

        summary.families_charged += 1;
        summary.total_charged += fee;
    }

    tx.commit()?;

    tracing::info!(
        "Charged a periodic fee of {rate}/acre to {} families, {} in total",
        summary.families_charged,
        summary.total_charged
    );

    Ok(summary)
}

fn get_land_areas(connection: &Connection) -> Result<Vec<(FamilyId, f64)>, Error> {
    connection
        .prepare("SELECT id, land_area FROM family ORDER BY id ASC")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Record a payment received from the family `family_id`.
///
/// Paying more than is owed is allowed and leaves a negative balance due.
///
/// # Errors
/// Returns [Error::UpdateMissingFamily] if `family_id` does not refer to a
/// family, or [Error::SqlError] if any statement fails. Nothing is saved in
/// either case.
pub fn record_payment(
    family_id: FamilyId,
    amount: PaymentAmount,
    now: LedgerTimestamp,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    adjust_balance(family_id, -amount.as_f64(), &tx)?;
    let transaction = insert_transaction(
        NewTransaction {
            family_id,
            date_time: now,
            description: PAYMENT_DESCRIPTION.to_owned(),
            amount: amount.as_f64(),
            kind: TransactionKind::Credit,
        },
        &tx,
    )?;

    tx.commit()?;

    tracing::info!(
        "Recorded a payment of {} for family {family_id}",
        amount.as_f64()
    );

    Ok(transaction)
}

#[cfg(test)]
mod value_tests {
    use crate::{
        Error,
        ledger::operations::{FeeRate, PaymentAmount, periodic_fee_description},
    };

    #[test]
    fn fee_rate_must_be_positive() {
        assert_eq!(FeeRate::new(0.0), Err(Error::NonPositiveRate(0.0)));
        assert_eq!(FeeRate::new(-500.0), Err(Error::NonPositiveRate(-500.0)));
        assert!(FeeRate::new(500.0).is_ok());
    }

    #[test]
    fn payment_must_be_positive() {
        assert_eq!(PaymentAmount::new(0.0), Err(Error::NonPositivePayment(0.0)));
        assert_eq!(
            PaymentAmount::new(-300.0),
            Err(Error::NonPositivePayment(-300.0))
        );
        assert!(PaymentAmount::new(300.0).is_ok());
    }

    #[test]
    fn rejects_nan() {
        assert!(matches!(
            FeeRate::new(f64::NAN),
            Err(Error::NonFiniteNumber(_))
        ));
        assert!(matches!(
            PaymentAmount::new(f64::NAN),
            Err(Error::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn fee_description_includes_rate() {
        let rate = FeeRate::new(12.5).unwrap();

        assert_eq!(periodic_fee_description(rate), "Periodic Fee (@12.5/acre)");
    }

    #[test]
    fn whole_rate_keeps_one_decimal_place() {
        let rate = FeeRate::new(500.0).unwrap();

        assert_eq!(periodic_fee_description(rate), "Periodic Fee (@500.0/acre)");
    }
}
