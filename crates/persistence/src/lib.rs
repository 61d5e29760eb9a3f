//! Persistence layer for the Roster backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The request-scoped persistence context (unit of work)
//! - Storage backends (PostgreSQL and in-memory)
//! - Repository implementations

pub mod context;
pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod storage;

pub use context::{EntryKey, ProgramContext};
pub use error::PersistenceError;
