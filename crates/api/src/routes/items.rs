//! Catalog item routes. Every handler requires a bearer token.

use axum::{Json, extract::State};

use atelier_core::ItemId;

use super::extract::{ApiJson, ApiPath};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::item::{
    DeleteResponse, Item, ItemFields, ItemInput, ItemPatch, ItemPatchInput,
};
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Item not found".to_string())
}

fn invalid(err: impl std::fmt::Display) -> AppError {
    AppError::Validation(err.to_string())
}

/// `GET /items`
pub async fn list(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.items().list().await?))
}

/// `POST /items`
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<Json<Item>> {
    let fields = ItemFields::try_from(input).map_err(invalid)?;
    let item = state.items().insert(&fields).await?;
    tracing::info!(item_id = %item.id, user_id = %user.id, "Item created");
    Ok(Json(item))
}

/// `GET /items/{id}`
pub async fn show(
    CurrentUser(_): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<Json<Item>> {
    let item = state.items().get(id).await?.ok_or_else(not_found)?;
    Ok(Json(item))
}

/// `PUT /items/{id}`
pub async fn replace(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<Json<Item>> {
    let fields = ItemFields::try_from(input).map_err(invalid)?;
    let item = state
        .items()
        .replace(id, &fields)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(item_id = %id, user_id = %user.id, "Item replaced");
    Ok(Json(item))
}

/// `PATCH /items/{id}`
///
/// An empty patch returns the item unchanged.
pub async fn patch(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
    ApiJson(input): ApiJson<ItemPatchInput>,
) -> Result<Json<Item>> {
    let patch = ItemPatch::try_from(input).map_err(invalid)?;

    let item = if patch.is_empty() {
        state.items().get(id).await?
    } else {
        state.items().patch(id, &patch).await?
    };
    let item = item.ok_or_else(not_found)?;

    tracing::info!(item_id = %id, user_id = %user.id, "Item patched");
    Ok(Json(item))
}

/// `DELETE /items/{id}`
pub async fn delete(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<Json<DeleteResponse>> {
    if !state.items().delete(id).await? {
        return Err(not_found());
    }
    tracing::info!(item_id = %id, user_id = %user.id, "Item deleted");
    Ok(Json(DeleteResponse::item_deleted()))
}
