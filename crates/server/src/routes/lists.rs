//! Grocery list routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use grocery_core::{GroceryList, Item, ListId};

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireIdentity;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub name: String,
}

/// `GET /lists`
pub async fn index(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Vec<GroceryList>>> {
    Ok(Json(state.lists().lists_for_identity(&identity).await?))
}

/// `POST /lists`
pub async fn create(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(req): ApiJson<ListRequest>,
) -> Result<(StatusCode, Json<GroceryList>)> {
    let list = state.lists().create(&identity, &req.name).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// `GET /lists/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(list_id): ApiPath<ListId>,
) -> Result<Json<GroceryList>> {
    Ok(Json(state.lists().get(&identity, list_id).await?))
}

/// `PUT /lists/{id}`
pub async fn rename(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(list_id): ApiPath<ListId>,
    ApiJson(req): ApiJson<ListRequest>,
) -> Result<Json<GroceryList>> {
    Ok(Json(state.lists().rename(&identity, list_id, &req.name).await?))
}

/// `DELETE /lists/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(list_id): ApiPath<ListId>,
) -> Result<StatusCode> {
    state.lists().delete(&identity, list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /lists/{id}/items`
pub async fn items(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(list_id): ApiPath<ListId>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.items().items_for_list(&identity, list_id).await?))
}
