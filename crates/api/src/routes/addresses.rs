//! Address endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{AddressDto, AddressToManipulateDto};
use persistence::entities::AddressEntity;
use persistence::repositories::{AddressStore, Repository};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::mapping::{Map, MapOnto};
use crate::middleware::record_entity_change;
use crate::response::{CreatedAtRoute, RouteName};

/// List all addresses.
///
/// GET /api/address
pub async fn list_addresses(
    State(state): State<AppState>,
) -> Result<Json<Vec<AddressDto>>, ApiError> {
    let mut repo = AddressStore::new(state.context());
    let addresses = repo.list().await?;

    Ok(Json(state.mapper.map_all(&addresses)))
}

/// Get one address.
///
/// GET /api/address/:id
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AddressDto>, ApiError> {
    let mut repo = AddressStore::new(state.context());
    let address = repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(state.mapper.map(&*address)))
}

/// Create an address.
///
/// POST /api/address
///
/// An address identical to a stored one is not inserted. The response is still 201,
/// carrying id 0.
pub async fn create_address(
    State(state): State<AppState>,
    body: Option<Json<AddressToManipulateDto>>,
) -> Result<CreatedAtRoute<AddressDto>, ApiError> {
    let Some(Json(input)) = body else {
        return Err(ApiError::BadRequest);
    };

    let address: AddressEntity = state.mapper.map(&input);
    let mut repo = AddressStore::new(state.context());
    let key = repo.add(address.clone()).await?;

    if !repo.save().await? {
        return Err(ApiError::Internal(
            "Creating an address failed on save.".to_string(),
        ));
    }

    let created = key
        .and_then(|key| repo.staged(key))
        .cloned()
        .unwrap_or(address);

    if key.is_some() {
        record_entity_change("address", "create");
        info!(address_id = created.id, "Address created");
    }

    let dto: AddressDto = state.mapper.map(&created);
    Ok(CreatedAtRoute::new(RouteName::GetAddress, dto.id, dto))
}

/// Replace an address.
///
/// PUT /api/address/:id
///
/// Answers 201 and echoes the request body, matching the create response shape.
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Option<Json<AddressToManipulateDto>>,
) -> Result<CreatedAtRoute<AddressToManipulateDto>, ApiError> {
    let Some(Json(input)) = body else {
        return Err(ApiError::BadRequest);
    };

    let mut repo = AddressStore::new(state.context());
    let address = repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    // The tracked instance is edited in place; save picks the change up.
    state.mapper.map_onto(&input, address);
    let updated = address.clone();
    repo.update(&updated);

    if !repo.save().await? {
        return Err(ApiError::Internal(format!(
            "Updating address {id} failed on save."
        )));
    }

    record_entity_change("address", "update");
    info!(address_id = id, "Address updated");

    Ok(CreatedAtRoute::new(RouteName::GetAddress, id, input))
}

/// Delete an address.
///
/// DELETE /api/address/:id
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let mut repo = AddressStore::new(state.context());
    if repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    repo.delete(id).await?;

    if !repo.save().await? {
        return Err(ApiError::Internal(format!(
            "Deleting address {id} failed on save."
        )));
    }

    record_entity_change("address", "delete");
    info!(address_id = id, "Address deleted");

    Ok(StatusCode::NO_CONTENT)
}
