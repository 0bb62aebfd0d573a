//! Authentication extractors.
//!
//! Handlers that create shops or reviews take [`RequireAuth`]; pages that only
//! show the login state in the navigation bar take [`OptionalAuth`].

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use url::form_urlencoded;

use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, redirects to `/auth/login?next=<path>` so the
/// user lands back on the page they asked for.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, carrying the original location.
    RedirectToLogin { next: String },
    /// No session layer is installed.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
                Redirect::to(&format!("/auth/login?next={next}")).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read the logged-in user from the session, if any.
///
/// A session that cannot be loaded counts as logged out. The user found is
/// attached to the Sentry scope of this request.
async fn session_user(session: &Session) -> Option<CurrentUser> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to load session"))
        .ok()
        .flatten();

    tag_sentry_user(user.as_ref());
    user
}

/// Path and query the visitor asked for.
///
/// Nested routers see `parts.uri` with their prefix stripped, so the
/// untouched `OriginalUri` is preferred.
fn requested_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);

    uri.path_and_query()
        .map_or_else(|| "/".to_owned(), ToString::to_string)
}

fn tag_sentry_user(user: Option<&CurrentUser>) {
    sentry::configure_scope(|scope| {
        scope.set_user(user.map(|user| sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.as_str().to_owned()),
            ..Default::default()
        }));
    });
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        match session_user(session).await {
            Some(user) => Ok(Self(user)),
            None => Err(AuthRejection::RedirectToLogin {
                next: requested_path(parts),
            }),
        }
    }
}

/// Extractor for pages that render for everyone but show who is logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Log `user` in on this session.
///
/// The session ID is cycled first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    tag_sentry_user(Some(user));
    Ok(())
}

/// Log out: drop the session and its record in the store.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    tag_sentry_user(None);
    Ok(())
}
