//! Data transfer objects for Roster.

pub mod address;
pub mod user;

pub use address::{AddressDto, AddressToManipulateDto};
pub use user::{UserDto, UserToManipulateDto};
