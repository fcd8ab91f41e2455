//! Registration and token routes.

use axum::{Json, extract::State};

use super::extract::{ApiForm, ApiJson};
use crate::error::Result;
use crate::models::user::{AccessToken, LoginForm, RegisterRequest, UserResponse};
use crate::state::AppState;

/// Register a new user.
///
/// `POST /register` with JSON `{username, email, password}`.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    let user = state.auth().register(&request).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Exchange username and password for a bearer token.
///
/// `POST /token` with form fields `username` and `password`.
pub async fn token(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<Json<AccessToken>> {
    let access = state.auth().login(&form.username, &form.password).await?;
    Ok(Json(access))
}
