#![allow(clippy::needless_for_each)]

use pantry_core::{
    ExpiredItemCount, Item, ItemDraft, ItemPatch, MonthlyWaste, Statistics, StatusSplit, User,
};
use pantry_service::MetricsSnapshot;

use super::schemas::{
    DashboardResponse, EditUserRequest, ErrorResponse, HealthResponse, ItemResponse,
    SigninRequest, SigninResponse, SignupRequest, UserResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Pantry API",
        version = "0.1.0",
        description = "HTTP API for tracking perishable household items, their expiry dates and waste statistics.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Users", description = "Registration, sign-in and account edits"),
        (name = "Items", description = "Adding, editing and removing tracked items"),
        (name = "Reports", description = "Per-user dashboard and waste statistics")
    ),
    paths(
        super::health::health,
        super::health::metrics,
        super::users::signup,
        super::users::signin,
        super::users::edit_user,
        super::items::add_item,
        super::items::edit_item,
        super::items::delete_item,
        super::dashboard::dashboard,
        super::statistics::statistics,
    ),
    components(schemas(
        Item, ItemDraft, ItemPatch, User,
        Statistics, StatusSplit, MonthlyWaste, ExpiredItemCount,
        MetricsSnapshot, HealthResponse, ErrorResponse,
        SignupRequest, SigninRequest, SigninResponse, EditUserRequest, UserResponse,
        ItemResponse, DashboardResponse,
    ))
)]
pub struct ApiDoc;
