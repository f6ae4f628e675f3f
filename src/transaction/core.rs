//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, ToSql};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Amount, Error, database_id::DatabaseID, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction adds money to or takes money from a user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The string stored in the database and used in form values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The human readable name shown in views.
    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    fn from_column(text: &str) -> Option<Self> {
        match text {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

/// An entry in a user's ledger: money that was earned or spent.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// The user whose ledger this transaction belongs to.
    pub user_id: UserID,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// A free-text label grouping similar transactions, e.g. "Groceries".
    pub category: String,
    /// The amount of money earned or spent. Always positive, the sign is
    /// carried by `transaction_type`.
    pub amount: Amount,
    /// An optional free-text note.
    pub note: Option<String>,
    /// When the transaction happened (stored in UTC).
    pub ts: OffsetDateTime,
    /// When the transaction was recorded (stored in UTC).
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserID,
        transaction_type: TransactionType,
        category: &str,
        amount: Amount,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            transaction_type,
            category: category.to_owned(),
            amount,
            note: None,
            ts: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default sensibly: no note, and a timestamp of "now" at
/// insertion time. Pass the finished builder to [create_transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user whose ledger the transaction is appended to.
    pub user_id: UserID,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// A free-text label grouping similar transactions.
    pub category: String,
    /// The amount of money earned or spent. Must be positive.
    pub amount: Amount,
    /// An optional free-text note.
    pub note: Option<String>,
    /// When the transaction happened. `None` means "now".
    pub ts: Option<OffsetDateTime>,
}

impl TransactionBuilder {
    /// Set the note for the transaction.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, ts: OffsetDateTime) -> Self {
        self.ts = Some(ts);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Append a new transaction to a user's ledger.
///
/// The ledger is append-only: there are no update or delete paths.
/// Timestamps are normalized to UTC before they are stored so that range
/// comparisons in SQL are chronologically correct.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is zero or negative,
/// - [Error::InvalidUser] if the user ID does not refer to a registered user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount.as_cents() <= 0 {
        return Err(Error::InvalidAmount(builder.amount.to_string()));
    }

    let created_at = OffsetDateTime::now_utc();
    let ts = builder
        .ts
        .unwrap_or(created_at)
        .to_offset(UtcOffset::UTC);

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (user_id, t_type, category, amount, note, ts, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, t_type, category, amount, note, ts, created_at",
        )?
        .query_row(
            (
                builder.user_id.as_i64(),
                builder.transaction_type.as_str(),
                builder.category,
                builder.amount.as_cents(),
                builder.note,
                ts,
                created_at,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidUser(builder.user_id),
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Sum the amounts of a user's transactions of the given type, optionally
/// restricted to the half-open time range `[from, to)`.
///
/// Returns zero when no transactions match.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn sum_by_type(
    user_id: UserID,
    transaction_type: TransactionType,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
    connection: &Connection,
) -> Result<Amount, Error> {
    let mut query = String::from(
        "SELECT COALESCE(SUM(amount), 0) FROM transactions
        WHERE user_id = :user_id AND t_type = :t_type",
    );

    let user_id_value = user_id.as_i64();
    let type_value = transaction_type.as_str();
    let from_value = from.map(|from| from.to_offset(UtcOffset::UTC));
    let to_value = to.map(|to| to.to_offset(UtcOffset::UTC));

    let mut params: Vec<(&str, &dyn ToSql)> =
        vec![(":user_id", &user_id_value), (":t_type", &type_value)];

    if let Some(from) = &from_value {
        query.push_str(" AND ts >= :from");
        params.push((":from", from));
    }

    if let Some(to) = &to_value {
        query.push_str(" AND ts < :to");
        params.push((":to", to));
    }

    let cents = connection.query_row(&query, params.as_slice(), |row| row.get(0))?;

    Ok(Amount::from_cents(cents))
}

/// Get the most recent transaction in a user's ledger, by transaction time
/// and then by insertion order.
///
/// Returns `None` for a user with an empty ledger.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_last_transaction(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    let result = connection
        .prepare(
            "SELECT id, user_id, t_type, category, amount, note, ts, created_at
            FROM transactions
            WHERE user_id = :user_id
            ORDER BY ts DESC, id DESC
            LIMIT 1",
        )?
        .query_one(&[(":user_id", &user_id.as_i64())], map_transaction_row);

    match result {
        Ok(transaction) => Ok(Some(transaction)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Get a user's expense transactions with a transaction time at or after
/// `start`, in ascending time order.
///
/// This is the typed input for the chart aggregations.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_expenses_since(
    user_id: UserID,
    start: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let start = start.to_offset(UtcOffset::UTC);

    connection
        .prepare(
            "SELECT id, user_id, t_type, category, amount, note, ts, created_at
            FROM transactions
            WHERE user_id = :user_id AND t_type = 'expense' AND ts >= :start
            ORDER BY ts ASC, id ASC",
        )?
        .query_map(
            &[
                (":user_id", &user_id.as_i64() as &dyn ToSql),
                (":start", &start),
            ],
            map_transaction_row,
        )?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transactions_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                t_type TEXT NOT NULL,
                category TEXT NOT NULL,
                amount INTEGER NOT NULL,
                note TEXT,
                ts TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Composite index for the per-user window scans behind the dashboard.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_ts ON transactions(user_id, ts);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// The row must contain id, user_id, t_type, category, amount, note, ts,
/// and created_at in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let type_text: String = row.get(2)?;
    let transaction_type = TransactionType::from_column(&type_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown transaction type {type_text:?}").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type,
        category: row.get(3)?,
        amount: Amount::from_cents(row.get(4)?),
        note: row.get(5)?,
        ts: row.get(6)?,
        created_at: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::{
        Amount, Error,
        auth::PasswordHash,
        db::initialize,
        transaction::{
            Transaction, TransactionType, count_transactions, create_transaction,
            get_expenses_since, get_last_transaction, sum_by_type,
        },
        user::{UserID, create_user},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_test_user(conn: &Connection, email: &str) -> UserID {
        create_user(
            "Test User",
            30,
            email,
            PasswordHash::new_unchecked("notarealhash"),
            conn,
        )
        .expect("Could not create test user")
        .id
    }

    #[test]
    fn create_defaults_timestamp_to_now() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionType::Expense,
                "Food",
                Amount::from_cents(1250),
            ),
            &conn,
        )
        .expect("Could not create transaction");

        let age = OffsetDateTime::now_utc() - transaction.ts;
        assert!(
            age < Duration::seconds(10),
            "want a transaction timestamp close to now, got one {age} old"
        );
        assert_eq!(transaction.ts, transaction.created_at);
        assert_eq!(transaction.amount, Amount::from_cents(1250));
        assert_eq!(transaction.note, None);
    }

    #[test]
    fn create_stores_explicit_timestamp_as_utc() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");
        let ts = datetime!(2026-01-02 10:30 +12);

        let transaction = create_transaction(
            Transaction::build(
                user_id,
                TransactionType::Income,
                "Salary",
                Amount::from_cents(100_000),
            )
            .timestamp(ts),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.ts, ts, "stored timestamp changed the instant");
        assert_eq!(
            transaction.ts.offset(),
            UtcOffset::UTC,
            "want timestamps normalized to UTC, got offset {}",
            transaction.ts.offset()
        );
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");

        for cents in [0, -1250] {
            let got = create_transaction(
                Transaction::build(
                    user_id,
                    TransactionType::Expense,
                    "Food",
                    Amount::from_cents(cents),
                ),
                &conn,
            );

            assert!(
                matches!(got, Err(Error::InvalidAmount(_))),
                "want InvalidAmount for {cents} cents, got {got:?}"
            );
        }

        let count = count_transactions(&conn).expect("Could not get count");
        assert_eq!(count, 0, "want ledger unchanged, got {count} rows");
    }

    #[test]
    fn create_fails_on_unknown_user() {
        let conn = get_test_connection();
        let unknown_user = UserID::new(999);

        let got = create_transaction(
            Transaction::build(
                unknown_user,
                TransactionType::Expense,
                "Food",
                Amount::from_cents(1250),
            ),
            &conn,
        );

        assert_eq!(got, Err(Error::InvalidUser(unknown_user)));
    }

    #[test]
    fn sum_by_type_sums_only_matching_type_and_user() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");
        let other_user = insert_test_user(&conn, "other@example.com");

        for (user, transaction_type, cents) in [
            (user_id, TransactionType::Income, 100_00),
            (user_id, TransactionType::Income, 50_00),
            (user_id, TransactionType::Expense, 25_50),
            (other_user, TransactionType::Income, 999_00),
        ] {
            create_transaction(
                Transaction::build(user, transaction_type, "Misc", Amount::from_cents(cents)),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let income = sum_by_type(user_id, TransactionType::Income, None, None, &conn).unwrap();
        let expense = sum_by_type(user_id, TransactionType::Expense, None, None, &conn).unwrap();

        assert_eq!(income, Amount::from_cents(150_00));
        assert_eq!(expense, Amount::from_cents(25_50));
    }

    #[test]
    fn sum_by_type_returns_zero_without_matching_rows() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");

        let got = sum_by_type(user_id, TransactionType::Income, None, None, &conn).unwrap();

        assert_eq!(got, Amount::ZERO);
    }

    #[test]
    fn sum_by_type_respects_half_open_window() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");
        let from = datetime!(2026-03-10 00:00 UTC);
        let to = datetime!(2026-03-11 00:00 UTC);

        // Timestamp, amount in cents, and whether the window should count it.
        let rows = [
            (from - Duration::seconds(1), 1_00, false),
            (from, 2_00, true),
            (from + Duration::hours(12), 4_00, true),
            (to, 8_00, false),
        ];

        for (ts, cents, _) in rows {
            create_transaction(
                Transaction::build(
                    user_id,
                    TransactionType::Expense,
                    "Food",
                    Amount::from_cents(cents),
                )
                .timestamp(ts),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got =
            sum_by_type(user_id, TransactionType::Expense, Some(from), Some(to), &conn).unwrap();

        assert_eq!(
            got,
            Amount::from_cents(6_00),
            "want the start included and the end excluded, got {got}"
        );
    }

    #[test]
    fn last_transaction_is_latest_by_timestamp() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");
        let base = datetime!(2026-03-10 12:00 UTC);

        for (ts, category) in [
            (base, "Older"),
            (base + Duration::days(2), "Newest"),
            (base + Duration::days(1), "Middle"),
        ] {
            create_transaction(
                Transaction::build(
                    user_id,
                    TransactionType::Expense,
                    category,
                    Amount::from_cents(1_00),
                )
                .timestamp(ts),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got = get_last_transaction(user_id, &conn)
            .expect("Could not query last transaction")
            .expect("Want a transaction, got none");

        assert_eq!(got.category, "Newest");
    }

    #[test]
    fn last_transaction_is_none_for_empty_ledger() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");

        let got = get_last_transaction(user_id, &conn).expect("Could not query last transaction");

        assert_eq!(got, None);
    }

    #[test]
    fn expenses_since_filters_type_user_and_time() {
        let conn = get_test_connection();
        let user_id = insert_test_user(&conn, "test@example.com");
        let other_user = insert_test_user(&conn, "other@example.com");
        let start = datetime!(2026-03-10 00:00 UTC);

        let rows = [
            (user_id, TransactionType::Expense, start, "Food"),
            (
                user_id,
                TransactionType::Expense,
                start + Duration::days(1),
                "Transport",
            ),
            (
                user_id,
                TransactionType::Expense,
                start - Duration::days(1),
                "TooOld",
            ),
            (user_id, TransactionType::Income, start, "Salary"),
            (other_user, TransactionType::Expense, start, "NotMine"),
        ];

        for (user, transaction_type, ts, category) in rows {
            create_transaction(
                Transaction::build(user, transaction_type, category, Amount::from_cents(1_00))
                    .timestamp(ts),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got = get_expenses_since(user_id, start, &conn).expect("Could not query expenses");

        let categories: Vec<&str> = got
            .iter()
            .map(|transaction| transaction.category.as_str())
            .collect();
        assert_eq!(
            categories,
            vec!["Food", "Transport"],
            "want only this user's expenses at or after the start, in time order"
        );
    }
}
