use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use pantry_core::UserId;

use crate::auth::identity::CallerIdentity;
use crate::error::ServerError;

use super::schemas::{
    EditUserRequest, ErrorResponse, SigninRequest, SigninResponse, SignupRequest, UserResponse,
};
use super::{AppState, json_body, parse_id};

/// `POST /api/signup` -- register an account.
#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "Users",
    summary = "Sign up",
    request_body(content = SignupRequest, description = "New account details"),
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Email already registered or invalid input", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let req = json_body(payload)?;
    let user = state
        .auth
        .signup(&req.fullname, &req.email, &req.password)
        .await?;
    let body = UserResponse {
        message: "user registered successfully".into(),
        user,
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// `POST /api/signin` -- exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/signin",
    tag = "Users",
    summary = "Sign in",
    request_body(content = SigninRequest, description = "Account credentials"),
    responses(
        (status = 200, description = "Token issued", body = SigninResponse),
        (status = 400, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown email", body = ErrorResponse),
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let req = json_body(payload)?;
    let session = state.auth.signin(&req.email, &req.password).await?;
    let body = SigninResponse {
        message: "sign in successful".into(),
        token: session.token,
        expires_in: session.expires_in,
        user_id: session.user_id,
    };
    Ok((StatusCode::OK, Json(body)))
}

/// `PUT /api/edit-user/{id}` -- change name, email or password.
#[utoipa::path(
    put,
    path = "/api/edit-user/{id}",
    tag = "Users",
    summary = "Edit user",
    params(("id" = String, Path, description = "User id")),
    request_body(content = EditUserRequest, description = "Fields to change"),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Nothing to change or malformed id", body = ErrorResponse),
        (status = 403, description = "Not the caller's account", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse),
    )
)]
pub async fn edit_user(
    State(state): State<AppState>,
    axum::Extension(identity): axum::Extension<CallerIdentity>,
    Path(id): Path<String>,
    payload: Result<Json<EditUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let id: UserId = parse_id(&id, "id")?;
    identity.authorize(&id)?;
    let req = json_body(payload)?;
    let user = state
        .auth
        .update_user(id, req.fullname, req.email, req.password.as_deref())
        .await?;
    let body = UserResponse {
        message: "user updated successfully".into(),
        user,
    };
    Ok((StatusCode::OK, Json(body)))
}
