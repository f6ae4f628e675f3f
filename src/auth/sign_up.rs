//! The sign-up page for creating a new account.
//!
//! A successful sign-up logs the new account in straight away, there is no
//! email confirmation step.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        cookie::{DEFAULT_COOKIE_DURATION, set_auth_cookie},
        password::{PasswordHash, ValidatedPassword},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_sign_up, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    user::{MIN_AGE, create_user},
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 8;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

/// The values the user typed into the sign-up form, used to re-fill the form
/// when it is re-rendered with an error message.
#[derive(Debug, Default)]
struct SignUpFormValues {
    name: String,
    age: String,
    email: String,
    password: String,
}

impl SignUpFormValues {
    fn from_form(form: &SignUpForm) -> Self {
        Self {
            name: form.name.clone(),
            age: form.age.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
        }
    }
}

/// At most one of these is set at a time, each renders under its input.
#[derive(Debug, Default)]
struct SignUpFormErrors<'a> {
    age: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn sign_up_form(values: &SignUpFormValues, errors: &SignUpFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP_VIEW)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="this"
            hx-indicator="#indicator"
            hx-disabled-elt="#name, #age, #email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    type="text"
                    name="name"
                    id="name"
                    placeholder="Your name"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(values.name);
            }

            div
            {
                label
                    for="age"
                    class=(FORM_LABEL_STYLE)
                {
                    "Age"
                }

                input
                    type="number"
                    name="age"
                    id="age"
                    min=(MIN_AGE)
                    max="120"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.age);

                @if let Some(error_message) = errors.age
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div
            {
                label
                    for="email"
                    class=(FORM_LABEL_STYLE)
                {
                    "Email"
                }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(values.email);

                @if let Some(error_message) = errors.email
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            (password_input(&values.password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the sign-up page.
pub async fn get_sign_up_page() -> Response {
    let sign_up_form = sign_up_form(&SignUpFormValues::default(), &SignUpFormErrors::default());
    let content = log_in_sign_up("Create your account", &sign_up_form);
    base("Sign Up", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl SignUpState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the sign-up form.
///
/// The age is kept as a string so that a bad value can be re-rendered in the
/// form alongside an error message instead of failing extraction.
#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub age: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn sign_up_error_response(values: &SignUpFormValues, errors: &SignUpFormErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        sign_up_form(values, errors),
    )
        .into_response()
}

/// Handler for sign-up requests via the POST method.
///
/// On success the new account is logged in with an auth cookie and the client
/// is redirected to the dashboard page. Otherwise, the form is returned with
/// an error message under the input that caused the problem.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<SignUpForm>,
) -> Response {
    let values = SignUpFormValues::from_form(&user_data);

    let age = match user_data.age.trim().parse::<u8>() {
        Ok(age) => age,
        Err(_) => {
            return sign_up_error_response(
                &values,
                &SignUpFormErrors {
                    age: Some("Age must be a whole number."),
                    ..Default::default()
                },
            );
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return sign_up_error_response(
                &values,
                &SignUpFormErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            );
        }
    };

    if user_data.password != user_data.confirm_password {
        return sign_up_error_response(
            &values,
            &SignUpFormErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        );
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let created_user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        create_user(
            user_data.name.trim(),
            age,
            user_data.email.trim(),
            password_hash,
            &connection,
        )
    };

    let user = match created_user {
        Ok(user) => user,
        Err(Error::UnderMinimumAge) => {
            let message = Error::UnderMinimumAge.to_string();
            return sign_up_error_response(
                &values,
                &SignUpFormErrors {
                    age: Some(&message),
                    ..Default::default()
                },
            );
        }
        Err(Error::EmailTaken) => {
            let message = Error::EmailTaken.to_string();
            return sign_up_error_response(
                &values,
                &SignUpFormErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            );
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");

            return get_internal_server_error_redirect();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_sign_up_page_tests {
    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::get_sign_up_page;

    #[tokio::test]
    async fn render_sign_up_page() {
        let response = get_sign_up_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let h1_selector = scraper::Selector::parse("h1").unwrap();
        let titles = document.select(&h1_selector).collect::<Vec<_>>();
        assert_eq!(titles.len(), 1, "want 1 h1, got {}", titles.len());
        let title = titles.first().unwrap();
        let title_text = title.text().collect::<String>().to_lowercase();
        let title_text = title_text.trim();
        let want_title = "create your account";
        assert_eq!(
            title_text, want_title,
            "want {}, got {:?}",
            want_title, title_text
        );

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::SIGN_UP_VIEW),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::SIGN_UP_VIEW,
            hx_post
        );

        struct FormInput {
            tag: &'static str,
            type_: &'static str,
            id: &'static str,
        }

        let want_form_inputs: Vec<FormInput> = vec![
            FormInput {
                tag: "input",
                type_: "text",
                id: "name",
            },
            FormInput {
                tag: "input",
                type_: "number",
                id: "age",
            },
            FormInput {
                tag: "input",
                type_: "email",
                id: "email",
            },
            FormInput {
                tag: "input",
                type_: "password",
                id: "password",
            },
            FormInput {
                tag: "input",
                type_: "password",
                id: "confirm-password",
            },
        ];

        for FormInput { tag, type_, id } in want_form_inputs {
            let selector_string = format!("{tag}[type={type_}]#{id}");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 {type_} {tag}, got {}",
                inputs.len()
            );
        }

        let log_in_link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&log_in_link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        let link = links.first().unwrap();
        assert_eq!(
            link.value().attr("href"),
            Some(endpoints::LOG_IN_VIEW),
            "want link to {}, got {:?}",
            endpoints::LOG_IN_VIEW,
            link.value().attr("href")
        );
    }
}
