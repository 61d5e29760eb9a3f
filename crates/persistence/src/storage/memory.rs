//! In-process storage backend.
//!
//! Used for local runs and tests. State lives only as long as the process.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use super::{ChangeSet, Changes, Commit, Storage};
use crate::entities::{AddressEntity, Entity, UserEntity};
use crate::error::PersistenceError;

#[derive(Debug)]
struct Table<E> {
    rows: BTreeMap<i32, E>,
    next_id: i32,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> Table<E> {
    fn seed(rows: Vec<E>) -> Self {
        let mut table = Self::default();
        for mut row in rows {
            if row.id() <= 0 {
                row.assign_id(table.next_id);
            }
            table.next_id = table.next_id.max(row.id() + 1);
            table.rows.insert(row.id(), row);
        }
        table
    }

    /// Returns the generated ids and the number of rows touched.
    fn apply(&mut self, changes: Changes<E>) -> (Vec<i32>, i64) {
        let mut affected = 0;
        let mut ids = Vec::with_capacity(changes.inserted.len());

        for mut row in changes.inserted {
            let id = self.next_id;
            self.next_id += 1;
            row.assign_id(id);
            self.rows.insert(id, row);
            ids.push(id);
            affected += 1;
        }

        for row in changes.updated {
            if let Some(existing) = self.rows.get_mut(&row.id()) {
                *existing = row;
                affected += 1;
            }
        }

        for id in changes.deleted {
            if self.rows.remove(&id).is_some() {
                affected += 1;
            }
        }

        (ids, affected)
    }
}

#[derive(Debug, Default)]
struct Tables {
    addresses: Table<AddressEntity>,
    users: Table<UserEntity>,
}

/// Storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
    fail_commits: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate both tables. Rows with id 0 get the next free id.
    pub fn with_data(addresses: Vec<AddressEntity>, users: Vec<UserEntity>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                addresses: Table::seed(addresses),
                users: Table::seed(users),
            }),
            fail_commits: AtomicBool::new(false),
        }
    }

    /// When set, every commit reports a negative count and applies nothing.
    pub fn report_failed_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn fetch_addresses(&self) -> Result<Vec<AddressEntity>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.addresses.rows.values().cloned().collect())
    }

    async fn fetch_address(&self, id: i32) -> Result<Option<AddressEntity>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.addresses.rows.get(&id).cloned())
    }

    async fn address_exists(&self, address: &AddressEntity) -> Result<bool, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables
            .addresses
            .rows
            .values()
            .any(|stored| stored.same_content(address)))
    }

    async fn fetch_users(&self) -> Result<Vec<UserEntity>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().cloned().collect())
    }

    async fn fetch_user(&self, id: i32) -> Result<Option<UserEntity>, PersistenceError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.get(&id).cloned())
    }

    async fn commit(&self, changes: ChangeSet) -> Result<Commit, PersistenceError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            warn!(
                pending = changes.addresses.len() + changes.users.len(),
                "Memory storage refusing commit"
            );
            return Ok(Commit::failed());
        }

        let mut tables = self.tables.write().await;
        let (address_ids, address_rows) = tables.addresses.apply(changes.addresses);
        let (user_ids, user_rows) = tables.users.apply(changes.users);

        Ok(Commit {
            affected: address_rows + user_rows,
            address_ids,
            user_ids,
        })
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn migrate(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(line1: &str) -> AddressEntity {
        AddressEntity {
            address_line1: Some(line1.to_string()),
            post_code: Some("PC1".to_string()),
            ..AddressEntity::default()
        }
    }

    #[tokio::test]
    async fn test_with_data_assigns_sequential_ids() {
        let storage = MemoryStorage::with_data(vec![address("a"), address("b")], vec![]);

        let rows = storage.fetch_addresses().await.unwrap();
        assert_eq!(rows.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_with_data_keeps_explicit_ids() {
        let user = UserEntity {
            id: 10,
            first_name: Some("Ada".to_string()),
            ..UserEntity::default()
        };
        let storage = MemoryStorage::with_data(vec![], vec![user.clone()]);

        assert_eq!(storage.fetch_user(10).await.unwrap(), Some(user));

        let mut changes = ChangeSet::default();
        changes.users.inserted.push(UserEntity::default());
        let commit = storage.commit(changes).await.unwrap();
        assert_eq!(commit.user_ids, vec![11]);
    }

    #[tokio::test]
    async fn test_commit_counts_rows() {
        let storage = MemoryStorage::with_data(vec![address("a"), address("b")], vec![]);

        let mut changes = ChangeSet::default();
        changes.addresses.inserted.push(address("c"));
        let mut renamed = address("renamed");
        renamed.id = 1;
        changes.addresses.updated.push(renamed);
        changes.addresses.deleted.push(2);
        changes.addresses.deleted.push(99);

        let commit = storage.commit(changes).await.unwrap();
        assert_eq!(commit.affected, 3);
        assert_eq!(commit.address_ids, vec![3]);

        let stored = storage.fetch_address(1).await.unwrap().unwrap();
        assert_eq!(stored.address_line1.as_deref(), Some("renamed"));
        assert!(storage.fetch_address(2).await.unwrap().is_none());
    }

    #[test]
    fn test_ping_and_migrate_are_no_ops() {
        let storage = MemoryStorage::new();
        tokio_test::assert_ok!(tokio_test::block_on(storage.ping()));
        tokio_test::assert_ok!(tokio_test::block_on(storage.migrate()));
        assert_eq!(storage.backend(), "memory");
    }

    #[tokio::test]
    async fn test_writes_to_vanished_rows_touch_nothing() {
        let storage = MemoryStorage::with_data(vec![address("a")], vec![]);

        let mut changes = ChangeSet::default();
        let mut gone = address("gone");
        gone.id = 7;
        changes.addresses.updated.push(gone);
        changes.addresses.deleted.push(8);
        let commit = storage.commit(changes).await.unwrap();

        assert_eq!(commit.affected, 0);
        assert!(commit.address_ids.is_empty());
        assert!(storage.fetch_address(7).await.unwrap().is_none());
        assert_eq!(storage.fetch_addresses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_commit_affects_nothing() {
        let storage = MemoryStorage::new();
        let commit = storage.commit(ChangeSet::default()).await.unwrap();
        assert_eq!(commit, Commit::default());
    }

    #[tokio::test]
    async fn test_failed_commit_applies_nothing() {
        let storage = MemoryStorage::new();
        storage.report_failed_commits(true);

        let mut changes = ChangeSet::default();
        changes.addresses.inserted.push(address("a"));
        let commit = storage.commit(changes).await.unwrap();

        assert_eq!(commit.affected, -1);
        assert!(storage.fetch_addresses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_address_exists_matches_all_fields() {
        let storage = MemoryStorage::with_data(vec![address("a")], vec![]);

        assert!(storage.address_exists(&address("a")).await.unwrap());
        assert!(!storage.address_exists(&address("b")).await.unwrap());

        let mut different_line2 = address("a");
        different_line2.address_line2 = Some("x".to_string());
        assert!(!storage.address_exists(&different_line2).await.unwrap());
    }
}
