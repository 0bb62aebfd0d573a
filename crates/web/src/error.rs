//! Request errors and the page shown for them.
//!
//! Handlers return [`Result`]. Failures on our side are reported to Sentry
//! and shown as a generic page; the visitor only sees details for errors
//! they caused.

use askama::Template;
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequestId};
use crate::models::CurrentUser;
use crate::services::{AuthError, ServiceError};
use crate::storage::StorageError;

/// Error returned by route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database: {0}")]
    Database(#[from] RepositoryError),

    #[error("photo storage: {0}")]
    Storage(#[from] StorageError),

    /// Only the failures the auth forms cannot report back end up here.
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    #[error("session: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The named thing does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => Self::NotFound("shop".to_owned()),
            ServiceError::Invalid(errors) => Self::BadRequest(errors.to_string()),
            ServiceError::MissingParameter(name) => {
                Self::BadRequest(format!("missing parameter: {name}"))
            }
            ServiceError::Repository(e) => Self::Database(e),
            ServiceError::Storage(e) => Self::Storage(e),
        }
    }
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Storage(_) | Self::Auth(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to show the visitor.
    fn public_message(&self) -> String {
        match self {
            Self::NotFound(what) => {
                let mut what = what.clone();
                if let Some(first) = what.get_mut(..1) {
                    first.make_ascii_uppercase();
                }
                format!("{what} not found.")
            }
            Self::BadRequest(detail) => detail.clone(),
            Self::Auth(AuthError::InvalidCredentials) => "Invalid email or password.".to_owned(),
            _ => "Something went wrong on our side. Please try again.".to_owned(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    current_user: Option<CurrentUser>,
    status: StatusCode,
    message: &'a str,
    request_id: Option<RequestId>,
}

/// What an error page shows. Attached to every `AppError` response so
/// [`render_error_page`] can redraw it with the visitor's navigation and the
/// request ID.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    status: StatusCode,
    message: String,
}

impl ErrorPage {
    fn render(
        &self,
        current_user: Option<CurrentUser>,
        request_id: Option<RequestId>,
    ) -> Response {
        let page = ErrorTemplate {
            current_user,
            status: self.status,
            message: &self.message,
            request_id,
        };

        match page.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (self.status, self.message.clone()).into_response()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request failed"
            );
        }

        // No request context here; `render_error_page` redraws the page with
        // the session user and request ID.
        let page = ErrorPage {
            status,
            message: self.public_message(),
        };
        let mut response = page.render(None, None);
        response.extensions_mut().insert(page);
        response
    }
}

/// Middleware that redraws `AppError` pages for the current visitor.
///
/// Must run inside the session and request ID layers.
pub async fn render_error_page(
    OptionalAuth(user): OptionalAuth,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request.extensions().get::<RequestId>().cloned();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorPage>() {
        Some(page) => page.render(user, request_id),
        None => response,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
