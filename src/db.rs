//! Database set up for the family and transaction tables.

use rusqlite::Connection;

use crate::{Error, family::create_family_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// This is safe to call on every start up. Foreign key enforcement is turned
/// on for `connection`, since SQLite leaves it off by default.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_family_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    fn table_names(connection: &Connection) -> Vec<String> {
        connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn creates_family_and_transaction_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let tables = table_names(&connection);
        assert!(tables.contains(&"family".to_owned()), "got tables {tables:?}");
        assert!(
            tables.contains(&"transaction".to_owned()),
            "got tables {tables:?}"
        );
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        let result = initialize(&connection);

        assert_eq!(Ok(()), result);
    }

    #[test]
    fn keeps_existing_rows() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute(
                "INSERT INTO family (name, land_area, balance_due) VALUES ('Singh', 2.0, 0.0)",
                (),
            )
            .unwrap();

        initialize(&connection).unwrap();

        let count: u32 = connection
            .query_row("SELECT COUNT(*) FROM family", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: i64 = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(enabled, 1);
    }
}
