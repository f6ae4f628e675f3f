//! User authentication: the sign-up, log-in and log-out pages, password
//! hashing, and the cookie-based session layer that guards the rest of the
//! routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
mod sign_up;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_api};
pub use password::{PasswordHash, ValidatedPassword};
pub use sign_up::{get_sign_up_page, post_sign_up};

#[cfg(test)]
pub(crate) use cookie::COOKIE_USER_ID;
