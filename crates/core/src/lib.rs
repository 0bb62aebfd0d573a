//! Coffeeshop Core - shared domain types.
//!
//! Used by:
//! - `web` - the public site (browse, search, review)
//! - `cli` - migrations and user management
//!
//! The core crate holds types and validation rules only. No I/O, no database
//! access, no HTTP.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, ratings, coordinates
//! - [`validation`] - Field-level error collection shared by the form schemas

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::FieldErrors;
