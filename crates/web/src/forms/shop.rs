//! Shop submission schema.

use axum::body::Bytes;
use url::Url;

use coffeeshop_core::{FieldErrors, Latitude, Longitude};

use super::non_blank;
use crate::models::NewShop;
use crate::storage::secure_filename;

const MAX_NAME_LENGTH: usize = 120;
const MAX_ADDRESS_LENGTH: usize = 255;
const MAX_URL_LENGTH: usize = 2048;

/// Photo extensions accepted for shop listings (lowercase).
pub const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// An uploaded file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Client-supplied name, not yet sanitized.
    pub filename: String,
    pub data: Bytes,
}

/// Stem used when sanitizing leaves nothing in front of the extension.
const FALLBACK_PHOTO_STEM: &str = "photo";

impl PhotoUpload {
    /// The name the photo is stored under.
    ///
    /// This is the [`secure_filename`] of the client name. If sanitizing loses
    /// the stem or the extension (`\u{2615}.png` becomes `png`), the client's
    /// extension is put back behind a fixed stem.
    #[must_use]
    pub fn safe_filename(&self) -> String {
        let sanitized = secure_filename(&self.filename);
        let Some((_, client_ext)) = self.filename.rsplit_once('.') else {
            return sanitized;
        };

        match sanitized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case(client_ext) => {
                sanitized
            }
            _ => format!("{FALLBACK_PHOTO_STEM}.{client_ext}"),
        }
    }

    fn extension(&self) -> Option<String> {
        self.safe_filename()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// Raw shop form values.
#[derive(Debug, Clone, Default)]
pub struct ShopSubmission {
    pub name: String,
    pub address: String,
    pub url: String,
    pub latitude: String,
    pub longitude: String,
    pub photo: Option<PhotoUpload>,
}

/// A shop submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidShop {
    pub shop: NewShop,
    pub photo: Option<PhotoUpload>,
}

impl ShopSubmission {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns all field errors found. Nothing has been written when this fails.
    pub fn validate(&self) -> Result<ValidShop, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        let address = required_text(&mut errors, "address", &self.address, MAX_ADDRESS_LENGTH);

        let url = non_blank(&self.url).map(str::to_owned);
        if let Some(url) = &url {
            validate_url(&mut errors, url);
        }

        let latitude = Latitude::parse(&self.latitude)
            .map_err(|e| errors.add("latitude", format!("Latitude {e}")))
            .ok();
        let longitude = Longitude::parse(&self.longitude)
            .map_err(|e| errors.add("longitude", format!("Longitude {e}")))
            .ok();

        let photo = self.photo.clone().filter(|p| !p.filename.is_empty() || !p.data.is_empty());
        if let Some(photo) = &photo {
            validate_photo(&mut errors, photo);
        }

        match (name, address, latitude, longitude) {
            (Some(name), Some(address), Some(latitude), Some(longitude)) if errors.is_empty() => {
                Ok(ValidShop {
                    shop: NewShop {
                        name,
                        address,
                        url,
                        latitude,
                        longitude,
                    },
                    photo,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max: usize,
) -> Option<String> {
    let Some(value) = non_blank(value) else {
        errors.add(field, "This field is required.");
        return None;
    };
    if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters."));
        return None;
    }
    Some(value.to_owned())
}

fn validate_url(errors: &mut FieldErrors, url: &str) {
    if url.len() > MAX_URL_LENGTH {
        errors.add("url", format!("Must be at most {MAX_URL_LENGTH} characters."));
        return;
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => errors.add("url", "Enter a full web address, e.g. https://example.com."),
    }
}

fn validate_photo(errors: &mut FieldErrors, photo: &PhotoUpload) {
    let allowed = photo
        .extension()
        .is_some_and(|ext| ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        errors.add(
            "photo",
            format!("Photos must be one of: {}.", ALLOWED_PHOTO_EXTENSIONS.join(", ")),
        );
    }
    if photo.data.is_empty() {
        errors.add("photo", "The uploaded photo is empty.");
    }
}
