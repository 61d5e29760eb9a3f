//! User endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{UserDto, UserToManipulateDto};
use persistence::entities::UserEntity;
use persistence::repositories::{Repository, UserStore};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::mapping::{Map, MapOnto};
use crate::middleware::record_entity_change;
use crate::response::{CreatedAtRoute, RouteName};

/// GET /api/user
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let mut repo = UserStore::new(state.context());
    let users = repo.list().await?;

    Ok(Json(state.mapper.map_all(&users)))
}

/// GET /api/user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let mut repo = UserStore::new(state.context());
    let user = repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(state.mapper.map(&*user)))
}

/// POST /api/user
///
/// `addressId` is stored as given; it is not checked against existing addresses.
pub async fn create_user(
    State(state): State<AppState>,
    body: Option<Json<UserToManipulateDto>>,
) -> Result<CreatedAtRoute<UserDto>, ApiError> {
    let Some(Json(input)) = body else {
        return Err(ApiError::BadRequest);
    };

    let user: UserEntity = state.mapper.map(&input);
    let mut repo = UserStore::new(state.context());
    let key = repo.add(user.clone()).await?;

    if !repo.save().await? {
        return Err(ApiError::Internal("Creating a user failed on save.".to_string()));
    }

    let created = key
        .and_then(|key| repo.staged(key))
        .cloned()
        .unwrap_or(user);

    record_entity_change("user", "create");
    info!(user_id = created.id, "User created");

    let dto: UserDto = state.mapper.map(&created);
    Ok(CreatedAtRoute::new(RouteName::GetUser, dto.id, dto))
}

/// PUT /api/user/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Option<Json<UserToManipulateDto>>,
) -> Result<CreatedAtRoute<UserToManipulateDto>, ApiError> {
    let Some(Json(input)) = body else {
        return Err(ApiError::BadRequest);
    };

    let mut repo = UserStore::new(state.context());
    let user = repo.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    state.mapper.map_onto(&input, user);
    let updated = user.clone();
    repo.update(&updated);

    if !repo.save().await? {
        return Err(ApiError::Internal(format!(
            "Updating user {id} failed on save."
        )));
    }

    record_entity_change("user", "update");
    info!(user_id = id, "User updated");

    Ok(CreatedAtRoute::new(RouteName::GetUser, id, input))
}

/// DELETE /api/user/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let mut repo = UserStore::new(state.context());
    if repo.get_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    repo.delete(id).await?;

    if !repo.save().await? {
        return Err(ApiError::Internal(format!(
            "Deleting user {id} failed on save."
        )));
    }

    record_entity_change("user", "delete");
    info!(user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
