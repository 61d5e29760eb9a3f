//! User repository.

use async_trait::async_trait;

use super::{Repository, UserRepository};
use crate::context::{EntryKey, ProgramContext};
use crate::entities::UserEntity;
use crate::error::PersistenceError;

/// User repository backed by a [`ProgramContext`].
///
/// Users are added unconditionally; there is no duplicate check.
pub struct UserStore {
    context: ProgramContext,
}

impl UserStore {
    pub fn new(context: ProgramContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Repository for UserStore {
    type Entity = UserEntity;

    async fn list(&mut self) -> Result<Vec<UserEntity>, PersistenceError> {
        let rows = self.context.storage().fetch_users().await?;
        let tracked = self.context.users_mut();
        Ok(rows
            .into_iter()
            .filter_map(|row| tracked.attach(row).cloned())
            .collect())
    }

    async fn get_by_id(&mut self, id: i32) -> Result<Option<&mut UserEntity>, PersistenceError> {
        if !self.context.users().is_tracked(id) {
            let row = self.context.storage().fetch_user(id).await?;
            if let Some(row) = row {
                self.context.users_mut().attach(row);
            }
        }
        Ok(self.context.users_mut().find_mut(id))
    }

    async fn add(&mut self, user: UserEntity) -> Result<Option<EntryKey>, PersistenceError> {
        Ok(Some(self.context.users_mut().add(user)))
    }

    async fn delete(&mut self, id: i32) -> Result<bool, PersistenceError> {
        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.context.users_mut().remove(id))
    }

    async fn save(&mut self) -> Result<bool, PersistenceError> {
        Ok(self.context.save_changes().await? >= 0)
    }

    fn staged(&self, key: EntryKey) -> Option<&UserEntity> {
        self.context.users().get(key)
    }
}

impl UserRepository for UserStore {}
