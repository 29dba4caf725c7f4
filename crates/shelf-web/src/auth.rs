//! Session authentication and the account pages.
//!
//! Sessions are rows in the store keyed by an opaque token held in an
//! `HttpOnly` cookie. [`load_session`] resolves that cookie on every request
//! and attaches a [`CurrentUser`] extension; [`require_login`] guards the
//! product pages.

use std::convert::Infallible;

use axum::{
    Form,
    extract::{FromRequestParts, OptionalFromRequestParts, Query, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shelf_core::{FormErrors, LoginForm, RegistrationForm, User};
use shelf_store::StoreError;

use crate::cookies::{self, LAST_LOGIN_COOKIE};
use crate::csrf::{self, CsrfToken};
use crate::error::ShelfError;
use crate::pages;
use crate::state::AppState;

/// Format of the `last_login` cookie value.
pub const LAST_LOGIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const INVALID_LOGIN: &str = "Sorry, incorrect username or password. Please try again.";
const ACCOUNT_CREATED: &str = "Your account has been successfully created!";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// The authenticated user of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_token: String,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ShelfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ShelfError::NotAuthenticated)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Resolve the session cookie into a [`CurrentUser`] extension.
///
/// Unknown or expired tokens leave the request anonymous.
pub async fn load_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = &state.config().session.cookie_name;
    if let Some(token) = cookies::get(request.headers(), cookie_name) {
        match state.db().session_user(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(CurrentUser {
                    user,
                    session_token: token,
                });
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session cookie"),
            Err(err) => return ShelfError::from(err).into_response(),
        }
    }
    next.run(request).await
}

/// Redirect anonymous requests to the login page, remembering where they were going.
pub async fn require_login(request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Redirect::to(&format!("/login?next={}", urlencoding::encode(target))).into_response()
}

/// Login page query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub registered: Option<String>,
}

/// Handler for the login page (GET)
pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let csrf = CsrfToken::for_request(&headers);
    let form = LoginForm {
        next: query.next,
        ..Default::default()
    };
    let notices: &[(&str, &str)] = if query.registered.is_some() {
        &[("success", ACCOUNT_CREATED)]
    } else {
        &[]
    };

    let page = pages::login_page(&state.config().site, &form, notices, csrf.value());
    csrf.render(page, state.config().session.secure)
}

/// Handler for login form submission (POST)
pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, ShelfError> {
    csrf::verify(&headers, &form.csrf_token)?;

    let Some(user) = state.db().authenticate(&form.username, &form.password).await? else {
        tracing::info!(username = %form.username, "Login failed");
        let csrf = CsrfToken::for_request(&headers);
        let page = pages::login_page(
            &state.config().site,
            &form,
            &[("error", INVALID_LOGIN)],
            csrf.value(),
        );
        return Ok(csrf.render(page, state.config().session.secure));
    };

    let session_config = &state.config().session;
    let max_age = session_config.max_age().ok_or_else(|| {
        anyhow::anyhow!(
            "session.max_age_secs {} is not a usable lifetime",
            session_config.max_age_secs
        )
    })?;
    let session = state.db().create_session(user.id, max_age).await?;
    tracing::info!(username = %user.username, user_id = %user.id, "User logged in");

    let last_login = chrono::Local::now().format(LAST_LOGIN_FORMAT).to_string();
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            cookies::http_only(
                &session_config.cookie_name,
                &session.token,
                session_config.max_age_secs,
                session_config.secure,
            ),
        ),
        (
            header::SET_COOKIE,
            cookies::plain(LAST_LOGIN_COOKIE, &last_login, session_config.secure),
        ),
    ]);

    Ok((cookies, Redirect::to(safe_next(form.next.as_deref()))).into_response())
}

/// Only local absolute paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Handler for logout
pub async fn logout(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
) -> Result<Response, ShelfError> {
    if let Some(current) = current {
        state.db().delete_session(&current.session_token).await?;
        tracing::info!(username = %current.user.username, "User logged out");
    }

    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            cookies::expired(&state.config().session.cookie_name),
        ),
        (header::SET_COOKIE, cookies::expired(LAST_LOGIN_COOKIE)),
    ]);

    Ok((cookies, Redirect::to("/login")).into_response())
}

/// Handler for the registration page (GET)
pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let csrf = CsrfToken::for_request(&headers);
    let page = pages::register_page(
        &state.config().site,
        &RegistrationForm::default(),
        &FormErrors::new(),
        csrf.value(),
    );
    csrf.render(page, state.config().session.secure)
}

/// Handler for registration form submission (POST)
pub async fn register_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, ShelfError> {
    csrf::verify(&headers, &form.csrf_token)?;

    let errors = match form.validate() {
        Ok(account) => match state.db().create_user(&account).await {
            Ok(user) => {
                tracing::info!(username = %user.username, user_id = %user.id, "Account created");
                return Ok(Redirect::to("/login?registered=1").into_response());
            }
            Err(StoreError::UsernameTaken) => {
                let mut errors = FormErrors::new();
                errors.add("username", USERNAME_TAKEN);
                errors
            }
            Err(err) => return Err(err.into()),
        },
        Err(errors) => errors,
    };

    let csrf = CsrfToken::for_request(&headers);
    let page = pages::register_page(&state.config().site, &form, &errors, csrf.value());
    Ok(csrf.render(page, state.config().session.secure))
}
