//! Shop route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use coffeeshop_core::{FieldErrors, ShopId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{PhotoUpload, ShopSubmission};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Review, Shop};
use crate::services::{ServiceError, ShopDetails, ShopService, search_shops};
use crate::state::AppState;

/// Notice shown after being bounced from the review form without a shop.
pub const MISSING_SHOP_NOTICE: &str = "missing_shop";

// =============================================================================
// Query Types
// =============================================================================

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub notice: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Shop detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/details.html")]
pub struct ShopDetailsTemplate {
    pub current_user: Option<CurrentUser>,
    pub shop: Shop,
    pub avg_rating: Option<f64>,
    pub review_count: usize,
    pub review_comments: Vec<Review>,
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/search.html")]
pub struct SearchTemplate {
    pub current_user: Option<CurrentUser>,
    pub q: String,
    /// `None` when no search was made.
    pub shops: Option<Vec<Shop>>,
    pub notice: Option<&'static str>,
}

/// New shop form template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/create.html")]
pub struct ShopFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub form: ShopSubmission,
    pub errors: FieldErrors,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display a shop with its average rating and review comments.
///
/// Anything that is not a known shop ID, numeric or not, is a 404.
#[instrument(skip_all, fields(shop_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ShopDetailsTemplate> {
    let id: ShopId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("shop {id}")))?;

    let details = ShopService::new(state.store(), state.photos())
        .details(id)
        .await
        .map_err(|e| match e {
            ServiceError::NotFound => AppError::NotFound(format!("shop {id}")),
            other => other.into(),
        })?;

    let ShopDetails {
        shop,
        avg_rating,
        review_count,
        review_comments,
    } = details;

    Ok(ShopDetailsTemplate {
        current_user: user,
        shop,
        avg_rating,
        review_count,
        review_comments,
    })
}

/// Display the search form, and results when `q` is present.
#[instrument(skip_all, fields(q = ?query.q))]
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let shops = search_shops(state.store(), query.q.as_deref()).await?;

    let notice = (query.notice.as_deref() == Some(MISSING_SHOP_NOTICE))
        .then_some("You need to have a shop to review!");

    Ok(SearchTemplate {
        current_user: user,
        q: query.q.unwrap_or_default(),
        shops,
        notice,
    })
}

/// Display the new shop form.
pub async fn new_page(RequireAuth(user): RequireAuth) -> ShopFormTemplate {
    ShopFormTemplate {
        current_user: Some(user),
        form: ShopSubmission::default(),
        errors: FieldErrors::new(),
    }
}

/// Handle the multipart shop submission.
///
/// Redirects to the new shop on success; re-renders the form with
/// 422 Unprocessable Entity when validation fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable shop submission");
            return Ok(rejection.into_response());
        }
    };

    match ShopService::new(state.store(), state.photos())
        .create(user.id, &submission)
        .await
    {
        Ok(shop) => Ok(Redirect::to(&format!("/shop/{}", shop.id)).into_response()),
        Err(ServiceError::Invalid(errors)) => {
            let page = ShopFormTemplate {
                current_user: Some(user),
                // Don't echo the upload back
                form: ShopSubmission {
                    photo: None,
                    ..submission
                },
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// Collect the shop form fields from a multipart body.
async fn read_submission(
    mut multipart: Multipart,
) -> std::result::Result<ShopSubmission, MultipartError> {
    let mut submission = ShopSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "photo" => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await?;
                submission.photo = Some(PhotoUpload { filename, data });
            }
            "name" => submission.name = field.text().await?,
            "address" => submission.address = field.text().await?,
            "url" => submission.url = field.text().await?,
            "latitude" => submission.latitude = field.text().await?,
            "longitude" => submission.longitude = field.text().await?,
            _ => {}
        }
    }

    Ok(submission)
}
