//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty optional field as
// None instead of rejecting the request like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Amount, AppState, Error, endpoints, timezone::local_offset, transaction::TransactionType,
    user::UserID,
};

use super::{
    Transaction,
    core::create_transaction,
    new_transaction_page::{NewTransactionFormValues, new_transaction_form},
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for recording a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The dollar amount as entered, e.g. "12.50".
    pub amount: String,
    /// The day the transaction happened, in the local timezone.
    pub date: Date,
    /// A label grouping similar transactions.
    pub category: String,
    /// Optional free text describing the transaction.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for recording a new transaction.
///
/// Redirects to the dashboard on success. Invalid input gets the form back
/// with an error message and the entered values preserved.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let local_offset = match local_offset(&state.local_timezone) {
        Ok(offset) => offset,
        Err(error) => {
            tracing::error!("could not resolve local timezone: {error}");
            return error.into_response();
        }
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let amount = match Amount::parse_positive(&form.amount) {
        Ok(amount) => amount,
        Err(error) => return validation_error_response(&form, today, &error.to_string()),
    };

    let category = form.category.trim();
    if category.is_empty() {
        return validation_error_response(&form, today, &Error::EmptyCategory.to_string());
    }

    let note = form
        .note
        .as_deref()
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .map(ToOwned::to_owned);

    let mut builder =
        Transaction::build(user_id, form.transaction_type, category, amount).note(note);

    // A transaction dated today is stamped with the current time, a
    // back-dated one with local midnight of the chosen day.
    if form.date != today {
        builder = builder.timestamp(form.date.midnight().assume_offset(local_offset));
    }

    let result = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        create_transaction(builder, &connection)
    };

    match result {
        Ok(_) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            (),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not record transaction: {error}");
            error.into_response()
        }
    }
}

fn validation_error_response(form: &TransactionForm, today: Date, message: &str) -> Response {
    let values = NewTransactionFormValues {
        transaction_type: form.transaction_type,
        category: &form.category,
        amount: &form.amount,
        date: form.date,
        note: form.note.as_deref().unwrap_or(""),
    };

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        new_transaction_form(&values, today, Some(message)),
    )
        .into_response()
}
