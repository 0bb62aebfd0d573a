//! Authentication route handlers.
//!
//! Email and password login and registration. Errors are reported back to
//! the form through an `?error=` code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use url::form_urlencoded;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Where users land after logging in without a `next` location.
const DEFAULT_LANDING: &str = "/shop/search";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters for error display and post-login redirect.
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<&'static str>,
    pub next: String,
}

/// User-facing text for an `?error=` code.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "email" => "Please enter a valid email address.",
        "weak" => "Passwords must be at least 8 characters.",
        "mismatch" => "Passwords do not match.",
        "exists" => "An account with this email already exists.",
        _ => "Something went wrong. Please try again.",
    }
}

/// The post-login location, if it is a path on this site.
///
/// Absolute URLs and protocol-relative `//host` values are refused so the
/// login form cannot be used as an open redirect.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\")
    })
}

fn with_error(path: &str, code: &str, next: Option<&str>) -> Redirect {
    let mut target = format!("{path}?error={code}");
    if let Some(next) = safe_next(next) {
        let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
        target.push_str("&next=");
        target.push_str(&next);
    }
    Redirect::to(&target)
}

/// Put the user in the session and send them on.
async fn start_session(session: &Session, user: &User, next: Option<&str>) -> Result<Response> {
    set_current_user(session, &CurrentUser::from(user)).await?;

    Ok(Redirect::to(safe_next(next).unwrap_or(DEFAULT_LANDING)).into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        current_user: user,
        error: query.error.as_deref().map(error_message),
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_owned(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = form.next.as_deref().filter(|n| !n.is_empty());

    match AuthService::new(state.store())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            start_session(&session, &user, next).await
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            tracing::warn!("Login failed");
            Ok(with_error("/auth/login", "credentials", next).into_response())
        }
        Err(e) => Err(AppError::Auth(e)),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<AuthQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        current_user: user,
        error: query.error.as_deref().map(error_message),
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_owned(),
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the new user in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let next = form.next.as_deref().filter(|n| !n.is_empty());

    if form.password != form.password_confirm {
        return Ok(with_error("/auth/register", "mismatch", next).into_response());
    }

    match AuthService::new(state.store())
        .register(&form.email, &form.password)
        .await
    {
        Ok(user) => start_session(&session, &user, next).await,
        Err(e) => {
            let code = match e {
                AuthError::InvalidEmail(_) => "email",
                AuthError::WeakPassword(_) => "weak",
                AuthError::UserAlreadyExists => "exists",
                other => return Err(AppError::Auth(other)),
            };
            Ok(with_error("/auth/register", code, next).into_response())
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;

    Ok(Redirect::to(DEFAULT_LANDING))
}
