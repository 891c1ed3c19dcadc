//! Defines the core data models and database queries for ledger transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::{
    Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Error,
    database_id::{FamilyId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds to or takes away from a family's balance due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// A charge, e.g. a periodic fee. Increases the balance due.
    Debit,
    /// A payment received. Decreases the balance due.
    Credit,
}

impl TransactionKind {
    /// The text stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "DEBIT",
            TransactionKind::Credit => "CREDIT",
        }
    }

    /// The change in balance due caused by a transaction of this kind for `amount`.
    pub fn signed_amount(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Debit => amount,
            TransactionKind::Credit => -amount,
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "DEBIT" => Ok(TransactionKind::Debit),
            "CREDIT" => Ok(TransactionKind::Credit),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other:?}").into(),
            )),
        }
    }
}

const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// A local wall-clock time with minute precision, stored as `YYYY-MM-DD HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerTimestamp(PrimitiveDateTime);

impl LedgerTimestamp {
    /// Create a timestamp from `datetime`, dropping seconds and anything smaller.
    pub fn new(datetime: PrimitiveDateTime) -> Self {
        let below_minute = Duration::seconds(i64::from(datetime.second()))
            + Duration::nanoseconds(i64::from(datetime.nanosecond()));

        Self(datetime - below_minute)
    }

    /// The current wall-clock time at `offset` from UTC.
    pub fn now(offset: UtcOffset) -> Self {
        let now = OffsetDateTime::now_utc().to_offset(offset);

        Self::new(PrimitiveDateTime::new(now.date(), now.time()))
    }

    /// Get the date and time.
    pub fn datetime(&self) -> PrimitiveDateTime {
        self.0
    }
}

impl Display for LedgerTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.0.format(TIMESTAMP_FORMAT).map_err(|_| std::fmt::Error)?;

        f.write_str(&text)
    }
}

impl ToSql for LedgerTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let text = self
            .0
            .format(TIMESTAMP_FORMAT)
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(text))
    }
}

impl FromSql for LedgerTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
            .map(LedgerTimestamp)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An entry in a family's history: a fee charged or a payment received.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The family whose balance this transaction changed.
    pub family_id: FamilyId,
    /// When the transaction was recorded.
    pub date_time: LedgerTimestamp,
    /// What the transaction was for, e.g. "Payment Received".
    pub description: String,
    /// The size of the change in balance. Never negative, the direction comes from `kind`.
    pub amount: f64,
    /// Whether the transaction increased or decreased the balance due.
    pub kind: TransactionKind,
}

impl Transaction {
    /// The change in balance due caused by this transaction.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed_amount(self.amount)
    }
}

/// The data for a transaction that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The family whose balance the transaction changes.
    pub family_id: FamilyId,
    /// The local time the transaction happened.
    pub date_time: LedgerTimestamp,
    /// What the transaction was for, e.g. "Payment Received".
    pub description: String,
    /// The amount of money, never negative. `kind` gives the direction.
    pub amount: f64,
    /// Whether the transaction adds to or takes away from the balance due.
    pub kind: TransactionKind,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table and its index on `family_id`.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            family_id INTEGER NOT NULL,
            date_time TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('DEBIT', 'CREDIT')),
            FOREIGN KEY(family_id) REFERENCES family(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_family_id ON \"transaction\"(family_id);",
    )?;

    Ok(())
}

/// Append a transaction to a family's history.
///
/// This does not change the family's balance. Use the functions in
/// [crate::ledger] so the balance and the history change together.
pub(crate) fn insert_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (family_id, date_time, description, amount, kind)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, family_id, date_time, description, amount, kind",
        )?
        .query_row(
            (
                new_transaction.family_id,
                new_transaction.date_time,
                new_transaction.description,
                new_transaction.amount,
                new_transaction.kind,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the history of a family, most recent first.
///
/// An unknown `family_id` gives an empty list.
pub fn list_transactions(
    family_id: FamilyId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, family_id, date_time, description, amount, kind
             FROM \"transaction\"
             WHERE family_id = :family_id
             ORDER BY id DESC",
        )?
        .query_map(&[(":family_id", &family_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map a database row to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let family_id = row.get(1)?;
    let date_time = row.get(2)?;
    let description = row.get(3)?;
    let amount = row.get(4)?;
    let kind = row.get(5)?;

    Ok(Transaction {
        id,
        family_id,
        date_time,
        description,
        amount,
        kind,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        db::initialize,
        family::{FamilyName, NewFamily, insert_family},
        transaction::{
            LedgerTimestamp, NewTransaction, TransactionKind, count_transactions,
            insert_transaction, list_transactions,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(family_id: i64, amount: f64, kind: TransactionKind) -> NewTransaction {
        NewTransaction {
            family_id,
            date_time: LedgerTimestamp::new(datetime!(2025-03-01 12:00)),
            description: "Test".to_owned(),
            amount,
            kind,
        }
    }

    fn insert_test_family(connection: &Connection) -> i64 {
        let new_family = NewFamily::new(FamilyName::new_unchecked("Singh"), 2.0, 0.0).unwrap();
        insert_family(&new_family, connection).unwrap().id
    }

    #[test]
    fn insert_round_trips_every_column() {
        let conn = get_test_connection();
        let family_id = insert_test_family(&conn);
        let want = new_transaction(family_id, 300.0, TransactionKind::Credit);

        let got = insert_transaction(want.clone(), &conn).unwrap();

        assert!(got.id > 0);
        assert_eq!(got.family_id, want.family_id);
        assert_eq!(got.date_time, want.date_time);
        assert_eq!(got.description, want.description);
        assert_eq!(got.amount, want.amount);
        assert_eq!(got.kind, want.kind);
    }

    #[test]
    fn stores_timestamp_and_kind_as_text() {
        let conn = get_test_connection();
        let family_id = insert_test_family(&conn);
        insert_transaction(new_transaction(family_id, 1.0, TransactionKind::Debit), &conn)
            .unwrap();

        let (date_time, kind): (String, String) = conn
            .query_row(
                "SELECT date_time, kind FROM \"transaction\" LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(date_time, "2025-03-01 12:00");
        assert_eq!(kind, "DEBIT");
    }

    #[test]
    fn insert_fails_for_missing_family() {
        let conn = get_test_connection();

        let result = insert_transaction(new_transaction(42, 1.0, TransactionKind::Debit), &conn);

        assert!(result.is_err());
    }

    #[test]
    fn list_returns_newest_first() {
        let conn = get_test_connection();
        let family_id = insert_test_family(&conn);
        let mut want = Vec::new();
        for i in 1..=5 {
            want.push(
                insert_transaction(
                    new_transaction(family_id, i as f64, TransactionKind::Debit),
                    &conn,
                )
                .unwrap(),
            );
        }
        want.reverse();

        assert_eq!(Ok(want), list_transactions(family_id, &conn));
    }

    #[test]
    fn list_only_returns_transactions_for_family() {
        let conn = get_test_connection();
        let family_id = insert_test_family(&conn);
        let other_family_id = insert_test_family(&conn);
        insert_transaction(
            new_transaction(other_family_id, 1.0, TransactionKind::Debit),
            &conn,
        )
        .unwrap();
        let want = insert_transaction(
            new_transaction(family_id, 2.0, TransactionKind::Credit),
            &conn,
        )
        .unwrap();

        assert_eq!(Ok(vec![want]), list_transactions(family_id, &conn));
    }

    #[test]
    fn list_for_unknown_family_is_empty() {
        let conn = get_test_connection();

        assert_eq!(Ok(vec![]), list_transactions(999, &conn));
    }

    #[test]
    fn count_counts_every_family() {
        let conn = get_test_connection();
        let family_id = insert_test_family(&conn);
        let other_family_id = insert_test_family(&conn);
        insert_transaction(new_transaction(family_id, 1.0, TransactionKind::Debit), &conn)
            .unwrap();
        insert_transaction(
            new_transaction(other_family_id, 1.0, TransactionKind::Debit),
            &conn,
        )
        .unwrap();

        assert_eq!(Ok(2), count_transactions(&conn));
    }

    #[test]
    fn signed_amount_follows_kind() {
        assert_eq!(TransactionKind::Debit.signed_amount(10.0), 10.0);
        assert_eq!(TransactionKind::Credit.signed_amount(10.0), -10.0);
    }
}
