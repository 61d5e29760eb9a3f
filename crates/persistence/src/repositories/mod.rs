//! Repository implementations over the persistence context.
//!
//! Each repository owns a [`ProgramContext`] for the lifetime of one request. Reads go
//! through the context so that returned entities are tracked, and writes are staged
//! until [`Repository::save`] is called.

pub mod address;
pub mod user;

use async_trait::async_trait;

use crate::context::EntryKey;
use crate::entities::{AddressEntity, Entity, UserEntity};
use crate::error::PersistenceError;

pub use address::AddressStore;
pub use user::UserStore;

/// Collection-like access to one entity type.
#[async_trait]
pub trait Repository: Send {
    type Entity: Entity;

    /// All stored entities.
    async fn list(&mut self) -> Result<Vec<Self::Entity>, PersistenceError>;

    /// The tracked instance for `id`. Edits made through the reference are saved by
    /// the next [`Repository::save`].
    async fn get_by_id(&mut self, id: i32) -> Result<Option<&mut Self::Entity>, PersistenceError>;

    /// Stage a new entity. `None` means the entity was skipped and nothing was staged.
    async fn add(&mut self, entity: Self::Entity) -> Result<Option<EntryKey>, PersistenceError>;

    /// Called after an in-place edit of a tracked entity.
    ///
    /// Intentionally does nothing: the context already sees the edit. Callers still
    /// invoke it so a store without change tracking can hook in here.
    fn update(&mut self, _entity: &Self::Entity) {}

    /// Stage deletion of the entity with `id`. Returns false if it does not exist.
    async fn delete(&mut self, id: i32) -> Result<bool, PersistenceError>;

    /// Commit staged work. True when the backend reported a non-negative count.
    async fn save(&mut self) -> Result<bool, PersistenceError>;

    /// An entity staged by [`Repository::add`], with its id once saved.
    fn staged(&self, key: EntryKey) -> Option<&Self::Entity>;
}

#[async_trait]
pub trait AddressRepository: Repository<Entity = AddressEntity> {
    /// True if an address with identical content is already stored.
    async fn exists(&self, address: &AddressEntity) -> Result<bool, PersistenceError>;
}

pub trait UserRepository: Repository<Entity = UserEntity> {}
