use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use hearth_model::{Credentials, UserId};

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user_id: UserId,
    pub username: String,
    /// Signed identity claim; send it as `Authorization: Bearer` on
    /// mutating requests to stop relying on the body-asserted id.
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.auth.register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> AppResult<Json<LoginResponse>> {
    let user = state.auth.login(&request).await?;
    let token = state
        .tokens
        .sign(user.id)
        .map_err(|_| AppError::internal("failed to sign identity token"))?;

    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        user_id: user.id,
        username: user.username,
        token,
    }))
}
