//! Address entity (database row mapping).

use sqlx::FromRow;

use super::Entity;

/// Database row for the addresses table.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct AddressEntity {
    pub id: i32,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub post_code: Option<String>,
}

impl AddressEntity {
    /// True when all four content fields match. Ids are ignored.
    pub fn same_content(&self, other: &AddressEntity) -> bool {
        self.address_line1 == other.address_line1
            && self.address_line2 == other.address_line2
            && self.address_line3 == other.address_line3
            && self.post_code == other.post_code
    }
}

impl Entity for AddressEntity {
    fn id(&self) -> i32 {
        self.id
    }

    fn assign_id(&mut self, id: i32) {
        self.id = id;
    }
}
