pub mod app;
pub mod config;
pub mod error;
pub mod mapping;
pub mod middleware;
pub mod response;
pub mod routes;
