//! User entity (database row mapping).

use sqlx::FromRow;

use super::Entity;

/// Database row for the users table.
///
/// `address_id` is a loose reference; it is not enforced against the addresses table.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserEntity {
    pub id: i32,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address_id: Option<i32>,
}

impl Entity for UserEntity {
    fn id(&self) -> i32 {
        self.id
    }

    fn assign_id(&mut self, id: i32) {
        self.id = id;
    }
}
