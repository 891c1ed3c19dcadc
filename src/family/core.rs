//! Defines the core data models and database queries for families.

use std::fmt::Display;

use rusqlite::{Connection, Row};

use crate::{Error, database_id::FamilyId};

// ============================================================================
// MODELS
// ============================================================================

/// A validated, non-empty family name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FamilyName(String);

impl FamilyName {
    /// Create a family name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyFamilyName] if `name` is empty or just whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyFamilyName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a family name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for FamilyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for FamilyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A household whose dues are tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    /// The ID of the family.
    pub id: FamilyId,
    /// The name the family is listed under.
    pub name: FamilyName,
    /// The land held by the family in acres, used to compute periodic fees.
    pub land_area: f64,
    /// The amount the family currently owes.
    ///
    /// Negative when the family has paid more than it was charged.
    pub balance_due: f64,
}

/// The validated data needed to add a family to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFamily {
    /// The name the family will be listed under.
    pub name: FamilyName,
    /// The land held in acres. Never negative.
    pub land_area: f64,
    /// The amount owed from before the family was added. Zero when not given.
    pub opening_due: f64,
}

impl NewFamily {
    /// Create the data for a new family.
    ///
    /// # Errors
    /// Returns an [Error::NonFiniteNumber] if either number is NaN or infinite,
    /// or an [Error::NegativeLandArea] if `land_area` is below zero.
    pub fn new(name: FamilyName, land_area: f64, opening_due: f64) -> Result<Self, Error> {
        if !land_area.is_finite() {
            return Err(Error::NonFiniteNumber(land_area));
        }

        if land_area < 0.0 {
            return Err(Error::NegativeLandArea(land_area));
        }

        if !opening_due.is_finite() {
            return Err(Error::NonFiniteNumber(opening_due));
        }

        Ok(Self {
            name,
            land_area,
            opening_due,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the family table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_family_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS family (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            land_area REAL NOT NULL,
            balance_due REAL NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert a family with its opening balance and return it with its generated ID.
///
/// This only writes the family row. Use [crate::ledger::add_family] to also
/// record the opening balance in the family's history.
pub(crate) fn insert_family(new_family: &NewFamily, connection: &Connection) -> Result<Family, Error> {
    let family = connection
        .prepare(
            "INSERT INTO family (name, land_area, balance_due) VALUES (?1, ?2, ?3)
             RETURNING id, name, land_area, balance_due",
        )?
        .query_row(
            (
                new_family.name.as_ref(),
                new_family.land_area,
                new_family.opening_due,
            ),
            map_family_row,
        )?;

    Ok(family)
}

/// Retrieve a family by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid family,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_family(id: FamilyId, connection: &Connection) -> Result<Family, Error> {
    connection
        .prepare("SELECT id, name, land_area, balance_due FROM family WHERE id = :id")?
        .query_row(&[(":id", &id)], map_family_row)
        .map_err(|error| error.into())
}

/// Retrieve families in the order they were added.
///
/// If `search` is not empty, only families whose name contains `search`
/// exactly as given, spaces included, are returned. Matching ignores ASCII
/// case and treats `%` and `_` as literal characters.
pub fn list_families(search: &str, connection: &Connection) -> Result<Vec<Family>, Error> {
    if search.is_empty() {
        return connection
            .prepare("SELECT id, name, land_area, balance_due FROM family ORDER BY id ASC")?
            .query_map([], map_family_row)?
            .map(|maybe_family| maybe_family.map_err(Error::from))
            .collect();
    }

    let pattern = format!("%{}%", escape_like_pattern(search));

    connection
        .prepare(
            "SELECT id, name, land_area, balance_due FROM family
             WHERE name LIKE ?1 ESCAPE '\\'
             ORDER BY id ASC",
        )?
        .query_map([pattern], map_family_row)?
        .map(|maybe_family| maybe_family.map_err(Error::from))
        .collect()
}

/// Get the number of families in the database.
pub fn count_families(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM family", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Add `delta` to the balance of the family `id`.
///
/// # Errors
/// Returns [Error::UpdateMissingFamily] if `id` does not refer to a family.
pub(crate) fn adjust_balance(id: FamilyId, delta: f64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE family SET balance_due = balance_due + ?1 WHERE id = ?2",
        (delta, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingFamily);
    }

    Ok(())
}

/// Map a database row to a [Family].
fn map_family_row(row: &Row) -> Result<Family, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let land_area = row.get(2)?;
    let balance_due = row.get(3)?;

    Ok(Family {
        id,
        name: FamilyName::new_unchecked(&raw_name),
        land_area,
        balance_due,
    })
}

fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod family_name_tests {
    use crate::{Error, family::FamilyName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(FamilyName::new(""), Err(Error::EmptyFamilyName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(FamilyName::new("\n\t \r"), Err(Error::EmptyFamilyName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = FamilyName::new("  Singh ").unwrap();

        assert_eq!(name.as_ref(), "Singh");
    }
}

#[cfg(test)]
mod new_family_tests {
    use crate::{
        Error,
        family::{FamilyName, NewFamily},
    };

    #[test]
    fn rejects_negative_land_area() {
        let result = NewFamily::new(FamilyName::new_unchecked("Singh"), -1.0, 0.0);

        assert_eq!(result, Err(Error::NegativeLandArea(-1.0)));
    }

    #[test]
    fn rejects_infinite_opening_due() {
        let result = NewFamily::new(FamilyName::new_unchecked("Singh"), 1.0, f64::INFINITY);

        assert_eq!(result, Err(Error::NonFiniteNumber(f64::INFINITY)));
    }

    #[test]
    fn accepts_zero_land_and_negative_opening_due() {
        let result = NewFamily::new(FamilyName::new_unchecked("Singh"), 0.0, -50.0);

        assert!(result.is_ok());
    }
}
