use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pantry_core::{ItemDraft, ItemId, ItemPatch};

use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

use super::schemas::{ErrorResponse, ItemResponse};
use super::{AppState, json_body, parse_id};

/// `POST /api/add-item` -- track a new item.
///
/// An authenticated caller may omit `userId`; it defaults to the caller.
#[utoipa::path(
    post,
    path = "/api/add-item",
    tag = "Items",
    summary = "Add item",
    request_body(content = ItemDraft, description = "name, category, expiryDate and userId are required"),
    responses(
        (status = 201, description = "Item stored", body = ItemResponse),
        (status = 400, description = "A required field is missing or blank", body = ErrorResponse),
        (status = 403, description = "Item would belong to another user", body = ErrorResponse),
    )
)]
pub async fn add_item(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    payload: Result<Json<ItemDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let mut draft = json_body(payload)?;
    if draft.user_id.is_none() {
        draft.user_id = identity.user_id;
    }
    if let Some(owner) = &draft.user_id {
        identity.authorize(owner)?;
    }

    let item = state.service.add_item_draft(draft).await?;
    let body = ItemResponse {
        message: "item added successfully".into(),
        item,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// `PUT /api/edit-item/{id}` -- change some fields of an item.
#[utoipa::path(
    put,
    path = "/api/edit-item/{id}",
    tag = "Items",
    summary = "Edit item",
    params(("id" = String, Path, description = "Item id")),
    request_body(content = ItemPatch, description = "Fields to change; at least one is required"),
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, description = "Nothing to change or malformed id", body = ErrorResponse),
        (status = 403, description = "Item belongs to another user", body = ErrorResponse),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn edit_item(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<ItemPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let id: ItemId = parse_id(&id, "id")?;
    let patch = json_body(payload)?;
    authorize_item(&state, &identity, id).await?;

    let item = state.service.edit_item(id, &patch).await?;
    let body = ItemResponse {
        message: "item updated successfully".into(),
        item,
    };
    Ok((StatusCode::OK, Json(body)))
}

/// `DELETE /api/delete-item/{id}` -- stop tracking an item.
#[utoipa::path(
    delete,
    path = "/api/delete-item/{id}",
    tag = "Items",
    summary = "Delete item",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = ItemResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 403, description = "Item belongs to another user", body = ErrorResponse),
        (status = 404, description = "Unknown item", body = ErrorResponse),
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let id: ItemId = parse_id(&id, "id")?;
    authorize_item(&state, &identity, id).await?;

    let item = state.service.delete_item(id).await?;
    let body = ItemResponse {
        message: "item deleted successfully".into(),
        item,
    };
    Ok((StatusCode::OK, Json(body)))
}

/// Authenticated callers may only touch their own items. Unknown ids fall
/// through as `NotFound`.
async fn authorize_item(
    state: &AppState,
    identity: &CallerIdentity,
    id: ItemId,
) -> Result<(), ServerError> {
    if identity.is_anonymous() {
        return Ok(());
    }
    let item = state.service.get_item(id).await?;
    identity.authorize(&item.added_by)
}
