//! Item routes, including the batch endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use grocery_core::{Item, ItemId, ListId};

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireIdentity;
use crate::services::{ItemDraft, ItemPatch};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub list_id: ListId,
    pub name: String,
    pub completed: Option<bool>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub completed: Option<bool>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub list_id: ListId,
    pub names: Vec<String>,
    /// Applied to every created item. Defaults to 1.
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BatchDeleteResponse {
    pub deleted: u64,
}

/// `POST /items`
pub async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(req): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state
        .items()
        .create(
            &identity,
            req.list_id,
            ItemDraft {
                name: req.name,
                completed: req.completed,
                quantity: req.quantity,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /items/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(item_id): ApiPath<ItemId>,
) -> Result<Json<Item>> {
    Ok(Json(state.items().get(&identity, item_id).await?))
}

/// `PUT /items/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(item_id): ApiPath<ItemId>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<Item>> {
    let item = state
        .items()
        .update(
            &identity,
            item_id,
            ItemPatch {
                name: req.name,
                completed: req.completed,
                quantity: req.quantity,
            },
        )
        .await?;
    Ok(Json(item))
}

/// `DELETE /items/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(item_id): ApiPath<ItemId>,
) -> Result<StatusCode> {
    state.items().delete(&identity, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /items/batch-create`
pub async fn batch_create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(req): ApiJson<BatchCreateRequest>,
) -> Result<(StatusCode, Json<Vec<Item>>)> {
    let items = state
        .batch()
        .create_items(&identity, req.list_id, &req.names, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(items)))
}

/// `DELETE /items/batch-delete`, body is a bare JSON array of item IDs.
pub async fn batch_delete(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(ids): ApiJson<Vec<ItemId>>,
) -> Result<Json<BatchDeleteResponse>> {
    let deleted = state.batch().delete_items(&identity, &ids).await?;
    Ok(Json(BatchDeleteResponse { deleted }))
}
