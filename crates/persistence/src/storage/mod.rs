//! Storage backends behind the persistence context.
//!
//! A backend answers reads directly and applies a [`ChangeSet`] atomically on commit.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::db::{create_pool, DatabaseConfig};
use crate::entities::{AddressEntity, UserEntity};
use crate::error::PersistenceError;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

/// URL scheme that selects the in-process backend.
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Pending changes for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Changes<E> {
    /// New rows, in the order they were staged.
    pub inserted: Vec<E>,
    pub updated: Vec<E>,
    pub deleted: Vec<i32>,
}

impl<E> Default for Changes<E> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<E> Changes<E> {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.deleted.len()
    }
}

/// Everything a context wants written in one commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub addresses: Changes<AddressEntity>,
    pub users: Changes<UserEntity>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.users.is_empty()
    }
}

/// Outcome of a commit.
///
/// A negative `affected` means the backend refused the commit and applied nothing.
/// On success the generated ids line up with the `inserted` lists of the change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub affected: i64,
    pub address_ids: Vec<i32>,
    pub user_ids: Vec<i32>,
}

impl Commit {
    pub fn failed() -> Self {
        Self {
            affected: -1,
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn fetch_addresses(&self) -> Result<Vec<AddressEntity>, PersistenceError>;

    async fn fetch_address(&self, id: i32) -> Result<Option<AddressEntity>, PersistenceError>;

    /// True if a stored address has the same four content fields. Nulls compare equal.
    async fn address_exists(&self, address: &AddressEntity) -> Result<bool, PersistenceError>;

    async fn fetch_users(&self) -> Result<Vec<UserEntity>, PersistenceError>;

    async fn fetch_user(&self, id: i32) -> Result<Option<UserEntity>, PersistenceError>;

    /// Apply all changes atomically.
    async fn commit(&self, changes: ChangeSet) -> Result<Commit, PersistenceError>;

    async fn ping(&self) -> Result<(), PersistenceError>;

    /// Bring the schema up to date.
    async fn migrate(&self) -> Result<(), PersistenceError>;
}

/// Open the backend named by `config.url`.
///
/// `memory://` yields an empty [`MemoryStorage`]; anything else is handed to the PostgreSQL pool.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>, PersistenceError> {
    if config.url.starts_with(MEMORY_URL_SCHEME) {
        info!("Using in-memory storage");
        return Ok(Arc::new(MemoryStorage::new()));
    }

    let pool = create_pool(config).await?;
    info!(
        max_connections = config.max_connections,
        "Database connection pool created"
    );
    Ok(Arc::new(PgStorage::new(pool)))
}
