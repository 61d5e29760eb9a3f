//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod address;
pub mod user;

pub use address::AddressEntity;
pub use user::UserEntity;

/// Behaviour shared by every persisted entity.
///
/// Ids are assigned by the store on insert; an unsaved entity carries id 0.
pub trait Entity: Clone + PartialEq + Send + Sync + 'static {
    fn id(&self) -> i32;

    fn assign_id(&mut self, id: i32);
}
