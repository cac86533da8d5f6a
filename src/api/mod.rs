//! Read-only HTTP status surface over the session registry.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
