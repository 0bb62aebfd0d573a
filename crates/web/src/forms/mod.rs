//! Form schemas.
//!
//! Each submission type holds the raw field values exactly as posted and a
//! `validate` method that checks every field, returning either the validated
//! domain value or a [`FieldErrors`](coffeeshop_core::FieldErrors) map. The
//! raw values are kept so a rejected form can be re-rendered as typed.

pub mod review;
pub mod shop;

pub use review::ReviewSubmission;
pub use shop::{PhotoUpload, ShopSubmission, ValidShop};

/// Trimmed value, or `None` if nothing but whitespace was submitted.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
