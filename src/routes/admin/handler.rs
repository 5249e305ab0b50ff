use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, middleware::AuthUser, utils::success_response};

use super::model::{WhitelistEntry, WhitelistRequest, validate_email};

#[axum::debug_handler]
pub async fn list_whitelist(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = WhitelistEntry::list(&state.pool).await?;
    Ok(success_response(entries))
}

#[axum::debug_handler]
pub async fn add_whitelist(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<WhitelistRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_email(&req.email).map_err(AppError::Validation)?;

    WhitelistEntry::add(&state.pool, &req.email, &auth.user_id).await?;
    Ok(success_response(()))
}

#[axum::debug_handler]
pub async fn remove_whitelist(
    State(state): State<AppState>,
    Json(req): Json<WhitelistRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !WhitelistEntry::remove(&state.pool, &req.email).await? {
        return Err(AppError::NotFound);
    }
    Ok(success_response(()))
}
