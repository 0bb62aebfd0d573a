//! Coffee shop site library.
//!
//! Browse shops with their average rating, search by name or address, and
//! submit shops and reviews. Exposed as a library so the router can be
//! exercised in-process by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
