use axum::{
    extract::{Extension, Json, Path, State},
    response::IntoResponse,
};

use crate::{AppState, error::AppError, middleware::AuthUser, utils::success_response};

use super::model::{
    EditRequest, RoadmapItem, SuggestRequest, validate_body, validate_status, validate_title,
};

#[axum::debug_handler]
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let items = RoadmapItem::list(&state.pool).await?;
    Ok(success_response(items))
}

#[axum::debug_handler]
pub async fn suggest(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_title(&req.title).map_err(AppError::Validation)?;
    validate_body(&req.body).map_err(AppError::Validation)?;

    let item = RoadmapItem::suggest(&state.pool, &auth.user_id, &req).await?;
    Ok(success_response(item))
}

#[axum::debug_handler]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<EditRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(title) = &req.title {
        validate_title(title).map_err(AppError::Validation)?;
    }
    if let Some(body) = &req.body {
        validate_body(body).map_err(AppError::Validation)?;
    }
    if let Some(status) = &req.status {
        validate_status(status).map_err(AppError::Validation)?;
    }

    let item = RoadmapItem::edit(&state.pool, id, &req)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(success_response(item))
}
