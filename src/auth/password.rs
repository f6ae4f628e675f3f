//! Password validation and hashing.

use std::fmt;

use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// The minimum number of characters a password must have.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A plain-text password that satisfies the length policy.
///
/// Holding this type proves the password was checked before hashing.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Validate `raw_password` against the password policy.
    ///
    /// Length is counted in graphemes rather than bytes so that passwords
    /// using combining characters or emoji are measured the way the user
    /// perceives them.
    ///
    /// # Errors
    ///
    /// Returns [Error::PasswordTooShort] if `raw_password` has fewer than
    /// [MIN_PASSWORD_LENGTH] characters.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.graphemes(true).count() < MIN_PASSWORD_LENGTH {
            return Err(Error::PasswordTooShort);
        }

        Ok(Self(raw_password.to_owned()))
    }

    /// Create a validated password without checking the policy.
    ///
    /// Intended for tests and seed scripts.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The default computational cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the underlying hashing library
    /// fails, which should not happen during normal operation.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a string that is already a bcrypt hash, e.g. one read back from
    /// the database.
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_owned())
    }

    /// Check `raw_password` against this hash.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the password does not match,
    /// or [Error::HashingError] if the hash string is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<(), Error> {
        match bcrypt::verify(raw_password, &self.0) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::InvalidCredentials),
            Err(error) => Err(Error::HashingError(error.to_string())),
        }
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::Error;

    use super::{PasswordHash, ValidatedPassword};

    /// Use the weakest cost in tests, hashing at the default cost takes
    /// hundreds of milliseconds.
    const TEST_COST: u32 = 4;

    #[test]
    fn verify_succeeds_with_correct_password() {
        let password = ValidatedPassword::new("averysafepassword").unwrap();
        let hash = PasswordHash::new(password, TEST_COST).expect("Could not hash password");

        assert_eq!(hash.verify("averysafepassword"), Ok(()));
    }

    #[test]
    fn verify_fails_with_incorrect_password() {
        let password = ValidatedPassword::new("averysafepassword").unwrap();
        let hash = PasswordHash::new(password, TEST_COST).expect("Could not hash password");

        assert_eq!(
            hash.verify("notthepassword"),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn hash_does_not_contain_the_password() {
        let password = ValidatedPassword::new("averysafepassword").unwrap();
        let hash = PasswordHash::new(password, TEST_COST).expect("Could not hash password");

        assert!(
            !hash.to_string().contains("averysafepassword"),
            "hash should not leak the plain-text password: {hash}"
        );
    }
}
