//! Defines the route handler for the page for recording a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::local_offset,
    transaction::TransactionType,
};

/// The values the transaction form is rendered with.
///
/// Used to echo the user's input back when the form is re-rendered with a
/// validation error.
pub(super) struct NewTransactionFormValues<'a> {
    pub transaction_type: TransactionType,
    pub category: &'a str,
    pub amount: &'a str,
    pub date: Date,
    pub note: &'a str,
}

impl NewTransactionFormValues<'_> {
    /// The values for a blank form: an expense dated today.
    pub(super) fn empty(today: Date) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            category: "",
            amount: "",
            date: today,
            note: "",
        }
    }
}

/// Renders the form for recording a transaction.
///
/// The form swaps itself on error responses so validation messages can be
/// shown inline without a full page load.
pub(super) fn new_transaction_form(
    values: &NewTransactionFormValues,
    max_date: Date,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="this"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            div
            {
                label
                    for="transaction-type"
                    class=(FORM_LABEL_STYLE)
                {
                    "Type"
                }

                select
                    name="transaction_type"
                    id="transaction-type"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option
                        value=(TransactionType::Expense.as_str())
                        selected[values.transaction_type == TransactionType::Expense]
                    {
                        (TransactionType::Expense.label())
                    }

                    option
                        value=(TransactionType::Income.as_str())
                        selected[values.transaction_type == TransactionType::Income]
                    {
                        (TransactionType::Income.label())
                    }
                }
            }

            div
            {
                label
                    for="amount"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount"
                }

                // w-full needed to ensure input takes the full width when prefilled with a value
                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        autofocus
                        value=[(!values.amount.is_empty()).then_some(values.amount)]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label
                    for="category"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category"
                }

                input
                    name="category"
                    id="category"
                    type="text"
                    placeholder="e.g. Groceries"
                    required
                    value=[(!values.category.is_empty()).then_some(values.category)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="date"
                    class=(FORM_LABEL_STYLE)
                {
                    "Date"
                }

                input
                    name="date"
                    id="date"
                    type="date"
                    max=(max_date)
                    required
                    value=(values.date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="note"
                    class=(FORM_LABEL_STYLE)
                {
                    "Note"
                }

                input
                    name="note"
                    id="note"
                    type="text"
                    placeholder="Optional note"
                    value=[(!values.note.is_empty()).then_some(values.note)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span
                    id="indicator"
                    class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " Record Transaction"
            }
        }
    }
}

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording a transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionPageState>,
) -> Result<Response, Error> {
    let local_offset = local_offset(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not resolve local timezone: {error}"))?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = new_transaction_form(&NewTransactionFormValues::empty(today), today, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (form)
        }
    };

    Ok(base("New Transaction", &[dollar_input_styles()], &content).into_response())
}
