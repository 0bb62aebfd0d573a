//! Domain value types.

pub mod coordinate;
pub mod email;
pub mod id;
pub mod rating;

pub use coordinate::{CoordinateError, Latitude, Longitude};
pub use email::{Email, EmailError};
pub use id::*;
pub use rating::{Rating, RatingError};
