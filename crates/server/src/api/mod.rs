pub mod dashboard;
pub mod health;
pub mod items;
pub mod openapi;
pub mod schemas;
pub mod statistics;
pub mod users;

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pantry_core::ValidationError;
use pantry_service::{PantryService, ServiceError};

use crate::auth::AuthProvider;
use crate::auth::middleware::AuthLayer;
use crate::error::ServerError;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Item operations and counters.
    pub service: Arc<PantryService>,
    /// Accounts and tokens.
    pub auth: Arc<AuthProvider>,
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/signup", post(users::signup))
        .route("/signin", post(users::signin));

    let enforced = state.auth.enforced().then(|| Arc::clone(&state.auth));
    let protected = Router::new()
        .route("/edit-user/{id}", put(users::edit_user))
        .route("/add-item", post(items::add_item))
        .route("/edit-item/{id}", put(items::edit_item))
        .route("/delete-item/{id}", delete(items::delete_item))
        .route("/dashboard/{user_id}", get(dashboard::dashboard))
        .route("/statistics/{user_id}", get(statistics::statistics))
        .layer(AuthLayer::new(enforced));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Parse a path segment as an id. Garbage is a validation error.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: &'static str) -> Result<T, ServerError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        ServerError::from(ServiceError::Validation(ValidationError::Invalid {
            field,
            reason: e.to_string(),
        }))
    })
}

/// Unwrap a JSON body, turning axum's rejection into a JSON 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}
