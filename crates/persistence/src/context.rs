//! Request-scoped persistence context.
//!
//! A [`ProgramContext`] tracks every entity read or staged through it. Loaded entities
//! keep a snapshot of their stored state, so edits made in place through `&mut` are
//! detected on [`ProgramContext::save_changes`] without any explicit update call.
//! Nothing reaches the backend until `save_changes` runs, and then all staged
//! inserts, modifications and deletions are committed together.

use std::sync::Arc;

use tracing::debug;

use crate::entities::{AddressEntity, Entity, UserEntity};
use crate::error::PersistenceError;
use crate::metrics::record_commit;
use crate::storage::{ChangeSet, Changes, Storage};

/// Handle to an entity staged for insertion.
///
/// The key stays valid after the save, so the store-assigned id can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Unchanged,
    Added,
    Deleted,
}

#[derive(Debug)]
struct Entry<E> {
    key: EntryKey,
    state: EntryState,
    snapshot: Option<E>,
    current: E,
}

impl<E: Entity> Entry<E> {
    /// Entries that correspond to a stored row.
    fn is_persisted(&self) -> bool {
        self.state != EntryState::Added
    }
}

/// Tracked entities of a single type.
#[derive(Debug)]
pub struct EntitySet<E> {
    entries: Vec<Entry<E>>,
    next_key: u64,
}

impl<E> Default for EntitySet<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_key: 0,
        }
    }
}

impl<E: Entity> EntitySet<E> {
    fn next_key(&mut self) -> EntryKey {
        let key = EntryKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn position(&self, id: i32) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_persisted() && entry.current.id() == id)
    }

    /// Start tracking a freshly loaded row.
    ///
    /// If the row is already tracked the tracked instance wins and the loaded copy is
    /// dropped. Returns `None` when the row is tracked as deleted.
    pub fn attach(&mut self, loaded: E) -> Option<&mut E> {
        let index = match self.position(loaded.id()) {
            Some(index) => index,
            None => {
                let key = self.next_key();
                self.entries.push(Entry {
                    key,
                    state: EntryState::Unchanged,
                    snapshot: Some(loaded.clone()),
                    current: loaded,
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index];
        match entry.state {
            EntryState::Deleted => None,
            _ => Some(&mut entry.current),
        }
    }

    /// True if a stored row with this id is tracked, including rows marked for deletion.
    pub fn is_tracked(&self, id: i32) -> bool {
        self.position(id).is_some()
    }

    /// The tracked instance of a stored row, unless it is marked for deletion.
    pub fn find_mut(&mut self, id: i32) -> Option<&mut E> {
        let index = self.position(id)?;
        let entry = &mut self.entries[index];
        match entry.state {
            EntryState::Deleted => None,
            _ => Some(&mut entry.current),
        }
    }

    /// Stage a new entity for insertion.
    pub fn add(&mut self, entity: E) -> EntryKey {
        let key = self.next_key();
        self.entries.push(Entry {
            key,
            state: EntryState::Added,
            snapshot: None,
            current: entity,
        });
        key
    }

    /// Mark a tracked stored row for deletion. Returns false if it is not tracked.
    pub fn remove(&mut self, id: i32) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries[index].state = EntryState::Deleted;
                true
            }
            None => false,
        }
    }

    /// The entity behind a key handed out by [`EntitySet::add`].
    pub fn get(&self, key: EntryKey) -> Option<&E> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.current)
    }

    /// Pending changes, with inserts in staging order.
    pub fn changes(&self) -> Changes<E> {
        let mut changes = Changes::default();
        for entry in &self.entries {
            match entry.state {
                EntryState::Added => changes.inserted.push(entry.current.clone()),
                EntryState::Deleted => changes.deleted.push(entry.current.id()),
                EntryState::Unchanged => {
                    if entry.snapshot.as_ref() != Some(&entry.current) {
                        changes.updated.push(entry.current.clone());
                    }
                }
            }
        }
        changes
    }

    /// Mark everything as persisted after a successful commit.
    ///
    /// `assigned_ids` pairs up with the inserts returned by [`EntitySet::changes`].
    fn accept(&mut self, assigned_ids: &[i32]) {
        self.entries.retain(|entry| entry.state != EntryState::Deleted);

        let mut ids = assigned_ids.iter();
        for entry in &mut self.entries {
            if entry.state == EntryState::Added {
                if let Some(id) = ids.next() {
                    entry.current.assign_id(*id);
                }
                entry.state = EntryState::Unchanged;
            }
            entry.snapshot = Some(entry.current.clone());
        }
    }
}

/// Unit of work over one storage backend.
///
/// Create one per request; it is not meant to be shared.
pub struct ProgramContext {
    storage: Arc<dyn Storage>,
    addresses: EntitySet<AddressEntity>,
    users: EntitySet<UserEntity>,
}

impl ProgramContext {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            addresses: EntitySet::default(),
            users: EntitySet::default(),
        }
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }

    pub fn addresses(&self) -> &EntitySet<AddressEntity> {
        &self.addresses
    }

    pub fn addresses_mut(&mut self) -> &mut EntitySet<AddressEntity> {
        &mut self.addresses
    }

    pub fn users(&self) -> &EntitySet<UserEntity> {
        &self.users
    }

    pub fn users_mut(&mut self) -> &mut EntitySet<UserEntity> {
        &mut self.users
    }

    /// Everything that would be written by [`ProgramContext::save_changes`].
    pub fn pending(&self) -> ChangeSet {
        ChangeSet {
            addresses: self.addresses.changes(),
            users: self.users.changes(),
        }
    }

    /// Commit all staged changes and return the number of rows affected.
    ///
    /// A negative count means the backend refused the commit; staged state is kept.
    pub async fn save_changes(&mut self) -> Result<i64, PersistenceError> {
        let changes = self.pending();
        let commit = self.storage.commit(changes).await?;
        record_commit(self.storage.backend(), commit.affected);

        if commit.affected >= 0 {
            self.addresses.accept(&commit.address_ids);
            self.users.accept(&commit.user_ids);
        }

        debug!(
            backend = self.storage.backend(),
            affected = commit.affected,
            "Saved changes"
        );
        Ok(commit.affected)
    }
}
