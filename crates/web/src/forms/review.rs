//! Review submission schema.

use serde::Deserialize;

use coffeeshop_core::{FieldErrors, Rating, ShopId};

use super::non_blank;
use crate::models::NewReview;

const MAX_COMMENT_LENGTH: usize = 2000;

/// Raw review form values.
///
/// Every field defaults to empty so a missing field is reported as a
/// validation error instead of a rejected request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSubmission {
    #[serde(default)]
    pub shop_id: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

impl ReviewSubmission {
    /// Check every field.
    ///
    /// An empty or whitespace-only comment becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns all field errors found.
    pub fn validate(&self) -> Result<NewReview, FieldErrors> {
        let mut errors = FieldErrors::new();

        let shop_id = match non_blank(&self.shop_id) {
            None => {
                errors.add("shop_id", "A shop is required.");
                None
            }
            Some(raw) => raw
                .parse::<ShopId>()
                .map_err(|_| errors.add("shop_id", "Not a valid shop."))
                .ok(),
        };

        let rating = match non_blank(&self.rating) {
            None => {
                errors.add("rating", "This field is required.");
                None
            }
            Some(raw) => Rating::parse(raw)
                .map_err(|e| errors.add("rating", format!("{e}.")))
                .ok(),
        };

        let comment = non_blank(&self.comment).map(str::to_owned);
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_LENGTH)
        {
            errors.add(
                "comment",
                format!("Must be at most {MAX_COMMENT_LENGTH} characters."),
            );
        }

        match (shop_id, rating) {
            (Some(shop_id), Some(rating)) if errors.is_empty() => Ok(NewReview {
                shop_id,
                rating,
                comment,
            }),
            _ => Err(errors),
        }
    }
}
