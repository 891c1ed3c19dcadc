use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::datetime;

use duesbook::{
    FamilyName, FeeRate, LedgerTimestamp, NewFamily, PaymentAmount, add_family,
    apply_periodic_fee, count_families, count_transactions, initialize_db, record_payment,
};

/// A utility for creating a test database for the duesbook server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Name, land area in acres and opening balance of each seeded family.
const FAMILIES: [(&str, f64, f64); 6] = [
    ("Singh", 2.0, 0.0),
    ("Kaur", 1.5, 250.0),
    ("Gill", 0.0, 0.0),
    ("Sandhu", 4.25, 1200.0),
    ("Dhillon", 0.75, -100.0),
    ("Grewal", 3.0, 0.0),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Adding families...");
    let opened = LedgerTimestamp::new(datetime!(2025-01-06 09:00));
    let mut family_ids = Vec::new();
    for (name, land_area, opening_due) in FAMILIES {
        let new_family = NewFamily::new(FamilyName::new(name)?, land_area, opening_due)?;
        family_ids.push(add_family(new_family, opened, &conn)?.id);
    }

    println!("Charging periodic fees...");
    let spring = apply_periodic_fee(
        FeeRate::new(500.0)?,
        LedgerTimestamp::new(datetime!(2025-04-01 10:00)),
        &conn,
    )?;
    let autumn = apply_periodic_fee(
        FeeRate::new(650.0)?,
        LedgerTimestamp::new(datetime!(2025-10-01 10:00)),
        &conn,
    )?;
    println!(
        "Charged {} and {} families",
        spring.families_charged, autumn.families_charged
    );

    println!("Recording payments...");
    let paid = LedgerTimestamp::new(datetime!(2025-10-15 17:30));
    for (family_id, amount) in family_ids.iter().zip([1000.0, 300.0, 50.0, 2500.0]) {
        record_payment(*family_id, PaymentAmount::new(amount)?, paid, &conn)?;
    }

    println!(
        "Created {} families with {} transactions.",
        count_families(&conn)?,
        count_transactions(&conn)?
    );
    println!("Success!");

    Ok(())
}
