use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use pantry_core::{Dashboard, Item, User, UserId};
use pantry_service::MetricsSnapshot;

/// Response body for the health check endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Current service counters.
    pub metrics: MetricsSnapshot,
}

/// Error body returned on every failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "item not found")]
    pub error: String,
}

/// Request body for `POST /api/signup`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "Ada Lovelace")]
    pub fullname: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

/// Request body for `POST /api/signin`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    #[schema(example = "sign in successful")]
    pub message: String,
    /// Bearer token for protected routes.
    pub token: String,
    /// Token lifetime in seconds.
    #[schema(example = 3600)]
    pub expires_in: u64,
    pub user_id: UserId,
}

/// Request body for `PUT /api/edit-user/{id}`. At least one field is required.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EditUserRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A user, as returned by signup and edit-user.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "user updated successfully")]
    pub message: String,
    pub user: User,
}

/// A single item, as returned by add, edit and delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    #[schema(example = "item added successfully")]
    pub message: String,
    pub item: Item,
}

/// Item names mapped to expiry dates.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    #[schema(example = "user dashboard fetched successfully")]
    pub message: String,
    #[schema(value_type = Object, example = json!({"Milk": "2024-01-10T00:00:00Z"}))]
    pub items: Dashboard,
}

/// Query parameters for `GET /api/statistics/{userId}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticsQuery {
    /// Reference instant as RFC 3339 or `YYYY-MM-DD`. Defaults to the current
    /// time.
    #[serde(default, deserialize_with = "pantry_core::timestamp::deserialize_option")]
    pub now: Option<DateTime<Utc>>,
}
