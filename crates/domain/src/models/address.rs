//! Address DTOs.

use serde::{Deserialize, Serialize};

/// Address as returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub id: i32,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub post_code: Option<String>,
}

/// Request payload for creating or replacing an address.
///
/// Field names are accepted in camelCase and PascalCase. Missing fields are null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressToManipulateDto {
    #[serde(alias = "AddressLine1")]
    pub address_line1: Option<String>,

    #[serde(alias = "AddressLine2")]
    pub address_line2: Option<String>,

    #[serde(alias = "AddressLine3")]
    pub address_line3: Option<String>,

    #[serde(alias = "PostCode")]
    pub post_code: Option<String>,
}
