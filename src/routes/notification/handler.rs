use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, middleware::AuthUser, utils::success_response};

use super::model::{
    MarkAllReadResponse, MarkReadRequest, Notification, PushEndpoint, SubscribeRequest,
    UnsubscribeRequest, validate_endpoint,
};

#[axum::debug_handler]
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = Notification::list_for_user(&state.pool, &auth.user_id).await?;
    Ok(success_response(notifications))
}

#[axum::debug_handler]
pub async fn mark_read(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !Notification::mark_read(&state.pool, req.id, &auth.user_id).await? {
        return Err(AppError::NotFound);
    }
    Ok(success_response(()))
}

#[axum::debug_handler]
pub async fn mark_all_read(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let updated = Notification::mark_all_read(&state.pool, &auth.user_id).await?;
    Ok(success_response(MarkAllReadResponse { updated }))
}

#[axum::debug_handler]
pub async fn subscribe(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_endpoint(&req.endpoint).map_err(AppError::Validation)?;

    let endpoint = PushEndpoint::register(&state.pool, &auth.user_id, &req).await?;
    Ok(success_response(endpoint))
}

#[axum::debug_handler]
pub async fn unsubscribe(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !PushEndpoint::remove_by_endpoint(&state.pool, &auth.user_id, &req.endpoint).await? {
        return Err(AppError::NotFound);
    }
    Ok(success_response(()))
}
