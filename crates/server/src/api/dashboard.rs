use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pantry_core::UserId;

use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

use super::schemas::{DashboardResponse, ErrorResponse};
use super::{AppState, parse_id};

/// `GET /api/dashboard/{userId}` -- item names mapped to expiry dates.
#[utoipa::path(
    get,
    path = "/api/dashboard/{userId}",
    tag = "Reports",
    summary = "User dashboard",
    description = "Maps each of the user's item names to its expiry date. When names repeat, the most recently created item wins.",
    params(("userId" = String, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Dashboard built", body = DashboardResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 403, description = "Another user's dashboard", body = ErrorResponse),
        (status = 404, description = "The user has no items", body = ErrorResponse),
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let owner: UserId = parse_id(&user_id, "userId")?;
    identity.authorize(&owner)?;

    let items = state.service.dashboard(&owner).await?;
    let body = DashboardResponse {
        message: "user dashboard fetched successfully".into(),
        items,
    };
    Ok((StatusCode::OK, Json(body)))
}
