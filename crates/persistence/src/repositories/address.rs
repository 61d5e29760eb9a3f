//! Address repository.

use async_trait::async_trait;
use tracing::debug;

use super::{AddressRepository, Repository};
use crate::context::{EntryKey, ProgramContext};
use crate::entities::AddressEntity;
use crate::error::PersistenceError;

/// Address repository backed by a [`ProgramContext`].
pub struct AddressStore {
    context: ProgramContext,
}

impl AddressStore {
    pub fn new(context: ProgramContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Repository for AddressStore {
    type Entity = AddressEntity;

    async fn list(&mut self) -> Result<Vec<AddressEntity>, PersistenceError> {
        let rows = self.context.storage().fetch_addresses().await?;
        let tracked = self.context.addresses_mut();
        Ok(rows
            .into_iter()
            .filter_map(|row| tracked.attach(row).cloned())
            .collect())
    }

    async fn get_by_id(&mut self, id: i32) -> Result<Option<&mut AddressEntity>, PersistenceError> {
        if !self.context.addresses().is_tracked(id) {
            let row = self.context.storage().fetch_address(id).await?;
            if let Some(row) = row {
                self.context.addresses_mut().attach(row);
            }
        }
        Ok(self.context.addresses_mut().find_mut(id))
    }

    async fn add(&mut self, address: AddressEntity) -> Result<Option<EntryKey>, PersistenceError> {
        if self.exists(&address).await? {
            debug!(post_code = ?address.post_code, "Address already exists, skipping insert");
            return Ok(None);
        }
        Ok(Some(self.context.addresses_mut().add(address)))
    }

    async fn delete(&mut self, id: i32) -> Result<bool, PersistenceError> {
        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        Ok(self.context.addresses_mut().remove(id))
    }

    async fn save(&mut self) -> Result<bool, PersistenceError> {
        Ok(self.context.save_changes().await? >= 0)
    }

    fn staged(&self, key: EntryKey) -> Option<&AddressEntity> {
        self.context.addresses().get(key)
    }
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn exists(&self, address: &AddressEntity) -> Result<bool, PersistenceError> {
        self.context.storage().address_exists(address).await
    }
}
