use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use pantry_core::{Statistics, UserId};

use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

use super::schemas::{ErrorResponse, StatisticsQuery};
use super::{AppState, parse_id};

/// `GET /api/statistics/{userId}` -- expired/active split, monthly waste and
/// most-wasted items.
#[utoipa::path(
    get,
    path = "/api/statistics/{userId}",
    tag = "Reports",
    summary = "Waste statistics",
    description = "An item is expired when its expiry date is strictly before `now`. A user with no items gets zero counts.",
    params(
        ("userId" = String, Path, description = "Owner id"),
        StatisticsQuery,
    ),
    responses(
        (status = 200, description = "Reports computed", body = Statistics),
        (status = 400, description = "Malformed id or timestamp", body = ErrorResponse),
        (status = 403, description = "Another user's statistics", body = ErrorResponse),
    )
)]
pub async fn statistics(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(user_id): Path<String>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let owner: UserId = parse_id(&user_id, "userId")?;
    identity.authorize(&owner)?;
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let now = query.now.unwrap_or_else(Utc::now);
    let stats = state.service.statistics(&owner, now).await?;
    Ok((StatusCode::OK, Json(stats)))
}
