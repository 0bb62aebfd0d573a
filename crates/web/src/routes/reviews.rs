//! Review route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use coffeeshop_core::{FieldErrors, Rating};

use super::shops::MISSING_SHOP_NOTICE;
use crate::error::Result;
use crate::filters;
use crate::forms::ReviewSubmission;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Shop};
use crate::services::{ReviewService, ServiceError};
use crate::state::AppState;

/// Review form query parameters.
#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub shop_id: Option<String>,
}

/// Review form template.
///
/// When `shop` is `None` the page says the shop was not found and the form
/// is not shown.
#[derive(Template, WebTemplate)]
#[template(path = "review/add.html")]
pub struct ReviewFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub shop: Option<Shop>,
    pub form: ReviewSubmission,
    pub errors: FieldErrors,
    pub ratings: Vec<i32>,
}

impl ReviewFormTemplate {
    fn new(
        user: CurrentUser,
        shop: Option<Shop>,
        form: ReviewSubmission,
        errors: FieldErrors,
    ) -> Self {
        Self {
            current_user: Some(user),
            shop,
            form,
            errors,
            ratings: Rating::all().map(Rating::value).collect(),
        }
    }
}

/// Display the review form for `?shop_id=`.
///
/// Without a `shop_id` the user is sent back to search with a notice.
#[instrument(skip_all, fields(shop_id = ?query.shop_id))]
pub async fn new_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ReviewQuery>,
) -> Result<Response> {
    let shop = match ReviewService::new(state.store())
        .target(query.shop_id.as_deref())
        .await
    {
        Ok(shop) => shop,
        Err(ServiceError::MissingParameter(_)) => {
            return Ok(
                Redirect::to(&format!("/shop/search?notice={MISSING_SHOP_NOTICE}"))
                    .into_response(),
            );
        }
        Err(other) => return Err(other.into()),
    };

    let form = ReviewSubmission {
        shop_id: query.shop_id.unwrap_or_default(),
        ..ReviewSubmission::default()
    };

    Ok(ReviewFormTemplate::new(user, shop, form, FieldErrors::new()).into_response())
}

/// Handle the review submission.
///
/// Redirects to the shop on success; re-renders the form with
/// 422 Unprocessable Entity when validation fails.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(submission): Form<ReviewSubmission>,
) -> Result<Response> {
    let service = ReviewService::new(state.store());

    match service.submit(user.id, &submission).await {
        Ok(review) => Ok(Redirect::to(&format!("/shop/{}", review.shop_id)).into_response()),
        Err(ServiceError::Invalid(errors)) => {
            let shop = service.target(Some(&submission.shop_id)).await?;
            let page = ReviewFormTemplate::new(user, shop, submission, errors);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(other) => Err(other.into()),
    }
}
