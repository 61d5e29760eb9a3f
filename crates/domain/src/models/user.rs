//! User DTOs.

use serde::{Deserialize, Serialize};

/// User as returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address_id: Option<i32>,
}

/// Request payload for creating or replacing a user.
///
/// `address_id` is a plain reference; the address it names is not required to exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserToManipulateDto {
    #[serde(alias = "FirstName")]
    pub first_name: Option<String>,

    #[serde(alias = "MiddleName")]
    pub middle_name: Option<String>,

    #[serde(alias = "LastName")]
    pub last_name: Option<String>,

    #[serde(alias = "Email")]
    pub email: Option<String>,

    #[serde(alias = "AddressId")]
    pub address_id: Option<i32>,
}
