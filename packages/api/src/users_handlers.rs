// ABOUTME: HTTP request handlers for the local account mirror
// ABOUTME: Lets the identity provider register accounts that orders can be linked to

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::body::JsonBody;
use crate::response::{error_response, ok, ApiResponse, ApiStorageError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
}

/// Record an account created by the identity provider
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Response {
    info!("Registering user: {}", request.email);

    if !storefront_core::validation::is_valid_email(&request.email) {
        return error_response(StatusCode::BAD_REQUEST, "Please enter a valid email address");
    }

    match state
        .user_storage
        .create_user(&request.email, &request.name)
        .await
    {
        Ok(user) => (StatusCode::CREATED, ResponseJson(ApiResponse::success(user))).into_response(),
        Err(e) => ApiStorageError(e).into_response(),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    info!("Getting user: {}", user_id);

    match state.user_storage.get_user(&user_id).await {
        Ok(user) => ok(user),
        Err(e) => ApiStorageError(e).into_response(),
    }
}
