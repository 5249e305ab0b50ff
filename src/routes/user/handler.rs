use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Extension, Json, Path, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    AppState,
    cache::SessionCacheOperations,
    error::AppError,
    middleware::{AuthUser, SESSION_COOKIE, session_removal_cookie},
    notify::{NotificationKind, notify},
    utils::{sign_session_token, success_response},
};

use super::model::{
    FollowResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    UpdatePasswordRequest, User, validate_display_name, validate_password, validate_username,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_username(&req.username).map_err(AppError::Validation)?;
    validate_display_name(&req.display_name).map_err(AppError::Validation)?;
    validate_password(&req.password).map_err(AppError::Validation)?;

    match User::create(&state.pool, req).await {
        Ok(user) => Ok(success_response(RegisterResponse {
            user_id: user.user_id,
            username: user.username,
        })),
        Err(e) if e.to_string().contains("unique constraint") => {
            Err(AppError::Validation("用户名已被占用".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.verify_login(&req.password)? {
        return Err(AppError::Unauthorized);
    }

    let token = sign_session_token(&user.user_id, &state.config)?;

    // 令牌与缓存条目成对创建
    let client_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| Some(addr.ip().to_string()));
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    SessionCacheOperations::store_session(
        &state.redis,
        &user.user_id,
        &token,
        client_ip,
        user_agent,
        state.config.session_ttl_secs,
    )
    .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        success_response(LoginResponse {
            user_id: user.user_id,
            username: user.username,
            display_name: user.display_name,
        }),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    SessionCacheOperations::remove_session(&state.redis, &auth.user_id, &auth.token).await?;

    let jar = CookieJar::new().add(session_removal_cookie());
    Ok((jar, success_response(())))
}

#[axum::debug_handler]
pub async fn me(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = User::find_by_id(&state.pool, &auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(success_response(user))
}

#[axum::debug_handler]
pub async fn update_password(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_password(&req.password).map_err(AppError::Validation)?;

    User::update_password(&state.pool, &auth.user_id, &req.password).await?;

    // 改密后吊销该用户全部会话，客户端需要重新登录
    SessionCacheOperations::revoke_user_sessions(&state.redis, &auth.user_id).await?;

    let jar = CookieJar::new().add(session_removal_cookie());
    Ok((jar, success_response(())))
}

#[axum::debug_handler]
pub async fn follow(
    Extension(auth): Extension<AuthUser>,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = User::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::NotFound)?;

    if target.user_id == auth.user_id {
        return Err(AppError::Validation("不能关注自己".to_string()));
    }

    let newly_followed = User::follow(&state.pool, &auth.user_id, &target.user_id).await?;

    if newly_followed {
        let actor = User::find_by_id(&state.pool, &auth.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        notify(
            &state,
            &target.user_id,
            &auth.user_id,
            &actor.display_name,
            NotificationKind::Follow,
        )
        .await?;
    }

    Ok(success_response(FollowResponse { following: true }))
}
