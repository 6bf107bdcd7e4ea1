//! Self-service account routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use grocery_core::{Account, AccountId, GroceryList};

use super::extract::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::RequireIdentity;
use crate::services::AccountUpdate;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `GET /accounts/me`
pub async fn me(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<Account>> {
    Ok(Json(state.accounts().get_self(&identity).await?))
}

/// `PUT /accounts/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
    ApiJson(req): ApiJson<UpdateAccountRequest>,
) -> Result<Json<Account>> {
    let account = state
        .accounts()
        .update(
            &identity,
            account_id,
            AccountUpdate {
                name: req.name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;
    Ok(Json(account))
}

/// `DELETE /accounts/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
) -> Result<StatusCode> {
    state.accounts().delete(&identity, account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /accounts/{id}/lists`
pub async fn lists(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiPath(owner_id): ApiPath<AccountId>,
) -> Result<Json<Vec<GroceryList>>> {
    Ok(Json(state.lists().lists_for_owner(&identity, owner_id).await?))
}
