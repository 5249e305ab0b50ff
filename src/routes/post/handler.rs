use axum::{
    extract::{Extension, Json, Path, State},
    response::IntoResponse,
};

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    notify::{NotificationKind, notify},
    routes::user::model::User,
    utils::success_response,
};

use super::model::{
    CreatePostRequest, LikeResponse, Post, PostReply, ReplyRequest, extract_mentions,
    validate_content,
};

/// 给正文中@到的每个真实用户发提及通知，未注册的用户名直接跳过
async fn notify_mentions(
    state: &AppState,
    content: &str,
    actor: &User,
    post_id: i64,
    reply_id: Option<i64>,
) -> Result<(), AppError> {
    for username in extract_mentions(content) {
        let Some(mentioned) = User::find_by_username(&state.pool, &username).await? else {
            continue;
        };

        notify(
            state,
            &mentioned.user_id,
            &actor.user_id,
            &actor.display_name,
            NotificationKind::Mention { post_id, reply_id },
        )
        .await?;
    }

    Ok(())
}

#[axum::debug_handler]
pub async fn create_post(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_content(&req.content, 2000).map_err(AppError::Validation)?;

    let actor = User::find_by_id(&state.pool, &auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let post = Post::create(&state.pool, &auth.user_id, &req.content).await?;

    notify_mentions(&state, &post.content, &actor, post.id, None).await?;

    Ok(success_response(post))
}

#[axum::debug_handler]
pub async fn like_post(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = Post::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let newly_liked = Post::like(&state.pool, post.id, &auth.user_id).await?;

    // 重复点赞不再重复通知
    if newly_liked {
        let actor = User::find_by_id(&state.pool, &auth.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        notify(
            &state,
            &post.author_id,
            &auth.user_id,
            &actor.display_name,
            NotificationKind::Like { post_id: post.id },
        )
        .await?;
    }

    Ok(success_response(LikeResponse { liked: true }))
}

#[axum::debug_handler]
pub async fn reply_post(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_content(&req.content, 1000).map_err(AppError::Validation)?;

    let post = Post::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let actor = User::find_by_id(&state.pool, &auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let reply = PostReply::create(&state.pool, post.id, &auth.user_id, &req.content).await?;

    notify(
        &state,
        &post.author_id,
        &auth.user_id,
        &actor.display_name,
        NotificationKind::Reply {
            post_id: post.id,
            reply_id: reply.id,
        },
    )
    .await?;

    notify_mentions(&state, &reply.content, &actor, post.id, Some(reply.id)).await?;

    Ok(success_response(reply))
}
