//! Checks that each family's stored balance agrees with its history.

use rusqlite::Connection;

use crate::{Error, database_id::FamilyId};

/// The largest difference between a balance and its history that is still
/// treated as equal, to allow for floating point error.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// A family whose stored balance due does not match the sum of its history.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDiscrepancy {
    /// The ID of the family.
    pub family_id: FamilyId,
    /// The name of the family, for log messages.
    pub family_name: String,
    /// The balance due stored on the family row.
    pub stored_balance: f64,
    /// The sum of the family's debits minus the sum of its credits.
    pub history_balance: f64,
}

impl BalanceDiscrepancy {
    /// How much the stored balance exceeds the history balance.
    pub fn difference(&self) -> f64 {
        self.stored_balance - self.history_balance
    }
}

/// Find the families whose `balance_due` differs from the signed sum of
/// their transactions.
///
/// Families with no transactions are compared against a history sum of zero.
/// A balance or history that is not a finite number is always reported.
pub fn find_balance_discrepancies(
    connection: &Connection,
) -> Result<Vec<BalanceDiscrepancy>, Error> {
    connection
        .prepare(
            "SELECT f.id, f.name, f.balance_due,
                COALESCE(SUM(CASE t.kind WHEN 'DEBIT' THEN t.amount ELSE -t.amount END), 0.0)
             FROM family f
             LEFT JOIN \"transaction\" t ON t.family_id = f.id
             GROUP BY f.id
             ORDER BY f.id ASC",
        )?
        .query_map([], |row| {
            Ok(BalanceDiscrepancy {
                family_id: row.get(0)?,
                family_name: row.get(1)?,
                stored_balance: row.get(2)?,
                history_balance: row.get(3)?,
            })
        })?
        .filter(|maybe_row| match maybe_row {
            Ok(row) => {
                let difference = row.difference().abs();
                difference.is_nan() || difference > BALANCE_TOLERANCE
            }
            Err(_) => true,
        })
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Log a warning for each family whose balance does not match its history.
///
/// Returns the number of discrepancies found.
pub fn log_balance_discrepancies(connection: &Connection) -> Result<usize, Error> {
    let discrepancies = find_balance_discrepancies(connection)?;

    for discrepancy in &discrepancies {
        tracing::warn!(
            "Family {} ({}) has a balance due of {} but its history sums to {}",
            discrepancy.family_id,
            discrepancy.family_name,
            discrepancy.stored_balance,
            discrepancy.history_balance
        );
    }

    if discrepancies.is_empty() {
        tracing::debug!("Every family balance matches its history");
    }

    Ok(discrepancies.len())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        db::initialize,
        family::{FamilyName, NewFamily},
        ledger::{
            BalanceDiscrepancy, PaymentAmount, add_family, find_balance_discrepancies,
            log_balance_discrepancies, record_payment,
        },
        transaction::LedgerTimestamp,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn now() -> LedgerTimestamp {
        LedgerTimestamp::new(datetime!(2025-04-13 08:30))
    }

    #[test]
    fn empty_database_has_no_discrepancies() {
        let conn = get_test_connection();

        assert_eq!(Ok(vec![]), find_balance_discrepancies(&conn));
    }

    #[test]
    fn ledger_operations_leave_no_discrepancies() {
        let conn = get_test_connection();
        let new_family = NewFamily::new(FamilyName::new_unchecked("Singh"), 2.0, 100.0).unwrap();
        let family = add_family(new_family, now(), &conn).unwrap();
        record_payment(family.id, PaymentAmount::new(30.0).unwrap(), now(), &conn).unwrap();

        assert_eq!(Ok(vec![]), find_balance_discrepancies(&conn));
        assert_eq!(Ok(0), log_balance_discrepancies(&conn));
    }

    #[test]
    fn finds_balance_without_history() {
        let conn = get_test_connection();
        // A negative opening balance written without its matching credit.
        conn.execute(
            "INSERT INTO family (name, land_area, balance_due) VALUES ('Kaur', 1.0, -50.0)",
            (),
        )
        .unwrap();
        let new_family = NewFamily::new(FamilyName::new_unchecked("Gill"), 1.0, 10.0).unwrap();
        add_family(new_family, now(), &conn).unwrap();

        let got = find_balance_discrepancies(&conn);

        assert_eq!(
            Ok(vec![BalanceDiscrepancy {
                family_id: 1,
                family_name: "Kaur".to_owned(),
                stored_balance: -50.0,
                history_balance: 0.0,
            }]),
            got
        );
        assert_eq!(Ok(1), log_balance_discrepancies(&conn));
    }

    #[test]
    fn reports_infinite_balance_and_history() {
        let conn = get_test_connection();
        let new_family = NewFamily::new(FamilyName::new_unchecked("Singh"), 1.0, 0.0).unwrap();
        let family = add_family(new_family, now(), &conn).unwrap();
        conn.execute(
            "UPDATE family SET balance_due = 1e999 WHERE id = ?1",
            [family.id],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (family_id, date_time, description, amount, kind)
             VALUES (?1, '2025-04-13 08:30', 'Periodic Fee (@1e10/acre)', 1e999, 'DEBIT')",
            [family.id],
        )
        .unwrap();

        let got = find_balance_discrepancies(&conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].family_id, family.id);
        assert!(!got[0].difference().is_finite());
    }

    #[test]
    fn ignores_floating_point_noise() {
        let conn = get_test_connection();
        let new_family = NewFamily::new(FamilyName::new_unchecked("Singh"), 1.0, 0.1).unwrap();
        let family = add_family(new_family, now(), &conn).unwrap();
        conn.execute(
            "UPDATE family SET balance_due = balance_due + 1e-9 WHERE id = ?1",
            [family.id],
        )
        .unwrap();

        assert_eq!(Ok(vec![]), find_balance_discrepancies(&conn));
    }
}
