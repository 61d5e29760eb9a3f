//! Domain layer for the Roster backend.
//!
//! This crate contains the wire shapes exchanged with clients:
//! - Read DTOs returned by the API (`AddressDto`, `UserDto`)
//! - Write DTOs accepted on create and update (`*ToManipulateDto`)

pub mod models;
