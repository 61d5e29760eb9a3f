//! HTTP route handlers.

pub mod addresses;
pub mod health;
pub mod users;
