//! Code for creating the users table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// The minimum age for creating an account.
pub const MIN_AGE: u8 = 13;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The display name entered at signup.
    pub name: String,
    /// The user's age in years at signup.
    pub age: u8,
    /// The email address used to log in. Unique across all users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the account was created (UTC).
    pub created_at: OffsetDateTime,
}

/// Create the users table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_users_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return:
/// - [Error::UnderMinimumAge] if `age` is below [MIN_AGE],
/// - [Error::EmailTaken] if `email` is already registered,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    name: &str,
    age: u8,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    if age < MIN_AGE {
        return Err(Error::UnderMinimumAge);
    }

    let created_at = OffsetDateTime::now_utc();

    let id = connection.query_row(
        "INSERT INTO users (name, age, email, password_hash, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id",
        (name, age, email, password_hash.to_string(), created_at),
        |row| row.get(0),
    )?;

    Ok(User {
        id: UserID::new(id),
        name: name.to_owned(),
        age,
        email: email.to_owned(),
        password_hash,
        created_at,
    })
}

/// Get the user from the database whose email is `email`.
///
/// The lookup is case-sensitive, matching how emails are stored.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, name, age, email, password_hash, created_at FROM users WHERE email = :email",
        )?
        .query_one(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, age, email, password_hash, created_at FROM users WHERE id = :id")?
        .query_one(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Parse a row from the users table into a [User].
///
/// The row must contain id, name, age, email, password_hash, and created_at
/// in that order.
fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id: UserID::new(raw_id),
        name: row.get(1)?,
        age: row.get(2)?,
        email: row.get(3)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::auth::PasswordHash;

    use super::{Error, UserID, create_user, create_users_table, get_user_by_email, get_user_by_id};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_users_table(&conn).expect("Could not create users table");

        conn
    }

    fn insert_test_user(conn: &Connection, email: &str) -> super::User {
        create_user(
            "Alice",
            30,
            email,
            PasswordHash::new_unchecked("hunter22hash"),
            conn,
        )
        .expect("Could not create test user")
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter22hash");

        let inserted_user = create_user(
            "Alice",
            30,
            "alice@example.com",
            password_hash.clone(),
            &db_connection,
        )
        .unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.name, "Alice");
        assert_eq!(inserted_user.age, 30);
        assert_eq!(inserted_user.email, "alice@example.com");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        insert_test_user(&db_connection, "alice@example.com");

        let got = create_user(
            "Different Name",
            52,
            "alice@example.com",
            PasswordHash::new_unchecked("anotherhash1"),
            &db_connection,
        );

        assert_eq!(got, Err(Error::EmailTaken));
    }

    #[test]
    fn insert_user_fails_below_minimum_age() {
        let db_connection = get_db_connection();

        let got = create_user(
            "Too Young",
            12,
            "kid@example.com",
            PasswordHash::new_unchecked("hunter22hash"),
            &db_connection,
        );

        assert_eq!(got, Err(Error::UnderMinimumAge));

        let count: i64 = db_connection
            .query_row("SELECT COUNT(id) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "want no rows after rejected signup, got {count}");
    }

    #[test]
    fn insert_user_accepts_minimum_age() {
        let db_connection = get_db_connection();

        let got = create_user(
            "Just Old Enough",
            13,
            "teen@example.com",
            PasswordHash::new_unchecked("hunter22hash"),
            &db_connection,
        );

        assert!(got.is_ok(), "want user created at age 13, got {got:?}");
    }

    #[test]
    fn get_user_by_email_succeeds_with_existing_email() {
        let db_connection = get_db_connection();
        let test_user = insert_test_user(&db_connection, "alice@example.com");

        let retrieved_user = get_user_by_email("alice@example.com", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_is_case_sensitive() {
        let db_connection = get_db_connection();
        insert_test_user(&db_connection, "alice@example.com");

        let got = get_user_by_email("ALICE@example.com", &db_connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = insert_test_user(&db_connection, "alice@example.com");

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }
}
