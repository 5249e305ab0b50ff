use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, error::AppError, middleware::AuthUser, routes::user::model::User};

/// 管理员门：在认证门之后运行，校验主体的管理员标记
pub async fn admin_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth) = req.extensions().get::<AuthUser>() else {
        return AppError::Unauthorized.into_response();
    };

    match User::find_by_id(&state.pool, &auth.user_id).await {
        Ok(Some(user)) if user.is_admin => next.run(req).await,
        Ok(Some(_)) => AppError::Forbidden.into_response(),
        // 缓存里有会话但用户记录已不在，按未授权处理
        Ok(None) => AppError::Unauthorized.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "管理员校验查询失败");
            AppError::Internal.into_response()
        }
    }
}
