use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use centsible::{
    Amount, PasswordHash, Transaction,
    TransactionType::{self, Expense, Income},
    ValidatedPassword, create_transaction, create_user, initialize_db,
};

/// A utility for creating a demo database for the centsible server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for trying out the app.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("demo1234"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user("Demo User", 30, "demo@example.com", password_hash, &conn)?;

    // (days ago, type, category, amount in cents, note)
    let seed_rows: &[(i64, TransactionType, &str, i64, Option<&str>)] = &[
        (29, Income, "Salary", 320_000, Some("Monthly salary")),
        (28, Expense, "Rent", 145_000, None),
        (27, Expense, "Food", 8_420, Some("Groceries")),
        (25, Expense, "Transportation", 2_150, Some("Bus card top-up")),
        (22, Expense, "Entertainment", 3_600, Some("Movie night")),
        (20, Expense, "Food", 6_975, Some("Groceries")),
        (18, Expense, "Utilities", 11_230, Some("Power and internet")),
        (16, Expense, "Healthcare", 4_500, Some("Prescription")),
        (15, Income, "Freelance", 45_000, Some("Website fixes")),
        (14, Expense, "Shopping", 12_999, Some("Running shoes")),
        (12, Expense, "Food", 5_840, None),
        (10, Income, "Gift", 5_000, Some("Birthday money")),
        (9, Expense, "Transportation", 6_500, Some("Fuel")),
        (8, Expense, "Travel", 18_600, Some("Weekend trip")),
        (7, Expense, "Food", 7_210, Some("Groceries")),
        (5, Expense, "Entertainment", 2_400, None),
        (2, Expense, "Food", 1_890, Some("Lunch out")),
        (1, Income, "Freelance", 12_000, Some("Logo design")),
        (0, Expense, "Food", 2_350, Some("Lunch out")),
    ];

    println!("Adding {} transactions...", seed_rows.len());

    let now = OffsetDateTime::now_utc();

    for &(days_ago, transaction_type, category, cents, note) in seed_rows {
        create_transaction(
            Transaction::build(
                user.id,
                transaction_type,
                category,
                Amount::from_cents(cents),
            )
            .note(note.map(str::to_owned))
            .timestamp(now - Duration::days(days_ago)),
            &conn,
        )?;
    }

    println!("Success! Log in with demo@example.com / demo1234");

    Ok(())
}
