use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    AppState,
    cache::{CachedSession, SessionCacheOperations},
    error::AppError,
    utils::decode_session_token,
};

/// 会话cookie名
pub const SESSION_COOKIE: &str = "folks_sid";

/// 认证通过后挂到请求扩展上的主体信息
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub session: CachedSession,
    pub token: String,
}

/// 清除客户端会话cookie的Set-Cookie
pub fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// 认证门：校验cookie令牌与缓存会话是否成对存在
///
/// 无cookie直接401且不访问缓存；令牌或缓存任何异常一律降级为401，
/// 详细错误只记录在服务端
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return AppError::Unauthorized.into_response(),
    };

    match authenticate(&state, &token).await {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => {
            // 认证失败时顺带下发cookie清除指令
            let jar = CookieJar::new().add(session_removal_cookie());
            (jar, err).into_response()
        }
    }
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    // 先验签再取claims里的用户ID，再用(用户ID, 令牌)复合键查缓存；
    // 伪造会话等价于猜中一条活跃缓存键
    let claims = decode_session_token(token, &state.config).map_err(|e| {
        tracing::debug!(error = %e, "会话令牌解码失败");
        AppError::Unauthorized
    })?;

    match SessionCacheOperations::get_session(&state.redis, &claims.id, token).await {
        Ok(Some(session)) => {
            // 活跃会话顺延TTL，失败不影响本次请求
            if let Err(e) = SessionCacheOperations::touch_session(
                &state.redis,
                &claims.id,
                token,
                state.config.session_ttl_secs,
            )
            .await
            {
                tracing::warn!(error = %e, "刷新会话TTL失败");
            }

            Ok(AuthUser {
                user_id: claims.id,
                session,
                token: token.to_string(),
            })
        }
        Ok(None) => {
            // 未命中：尽力清理可能残留的键，保持令牌与缓存条目成对销毁
            if let Err(e) =
                SessionCacheOperations::remove_session(&state.redis, &claims.id, token).await
            {
                tracing::warn!(error = %e, "清理残留会话键失败");
            }
            Err(AppError::Unauthorized)
        }
        Err(e) => {
            tracing::error!(error = %e, "会话缓存不可用");
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        http::{StatusCode, header},
        routing::get,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{bus::EventBus, config::Config, push::PushDispatcher, utils::sign_session_token};

    /// 懒连接的离线状态，下面的用例都在触达缓存/数据库之前就返回了
    fn test_state() -> AppState {
        let config = Config {
            database_url: String::new(),
            redis_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            session_ttl_secs: 3600,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        };

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://folks@127.0.0.1/folks")
            .unwrap();
        let redis = Arc::new(redis::Client::open("redis://127.0.0.1/").unwrap());

        AppState {
            pool,
            config,
            redis: redis.clone(),
            bus: EventBus::new(redis),
            push: PushDispatcher::new(),
        }
    }

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route("/protected", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state)
    }

    #[test]
    fn removal_cookie_clears_session() {
        let cookie = session_removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        // removal cookie 的过期时间在过去
        assert!(cookie.max_age().is_some() || cookie.expires().is_some());
    }

    #[tokio::test]
    async fn missing_cookie_gets_401_without_cookie_clear() {
        let app = protected_app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        // 客户端本来就没有cookie，不需要下发清除指令
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn malformed_token_gets_401_and_cookie_clear() {
        let app = protected_app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(header::COOKIE, format!("{}=abc", SESSION_COOKIE))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("响应应携带cookie清除指令")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn tampered_token_gets_401_and_cookie_clear() {
        let state = test_state();

        // 用别的密钥签出的令牌在验签阶段就被拒绝，不会拿claims去查缓存
        let mut other = state.config.clone();
        other.jwt_secret = "other-secret".to_string();
        let token = sign_session_token("42", &other).unwrap();

        let app = protected_app(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }
}
