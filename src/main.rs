use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use folks_backend::{
    AppState,
    bus::EventBus,
    config::Config,
    middleware::{
        RateLimiter, admin_middleware, auth_middleware, log_errors, rate_limit,
    },
    push::PushDispatcher,
    routes,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // Redis客户端：会话缓存、限流计数和事件广播共用
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let redis_arc = Arc::new(redis_client);

    // 客户端统一在启动时构造，经AppState注入，不做模块级单例
    let state = AppState {
        pool,
        config: config.clone(),
        redis: redis_arc.clone(),
        bus: EventBus::new(redis_arc.clone()),
        push: PushDispatcher::new(),
    };

    let rate_limiter = Arc::new(RateLimiter::new(redis_arc, config.clone()));

    // 公开路由
    let public_routes = Router::new()
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
        .route("/roadmap", get(routes::roadmap::list));

    // 需要认证的路由
    let protected_routes = Router::new()
        .route("/users/logout", post(routes::user::logout))
        .route("/users/me", get(routes::user::me))
        .route("/users/update-password", put(routes::user::update_password))
        .route("/users/{username}/follow", post(routes::user::follow))
        // 帖子与互动
        .route("/posts", post(routes::post::create_post))
        .route("/posts/{id}/like", post(routes::post::like_post))
        .route("/posts/{id}/reply", post(routes::post::reply_post))
        // 通知与推送端点
        .route("/notifications", get(routes::notification::list))
        .route("/notifications/read", put(routes::notification::mark_read))
        .route(
            "/notifications/read-all",
            put(routes::notification::mark_all_read),
        )
        .route("/push/subscribe", post(routes::notification::subscribe))
        .route("/push/unsubscribe", post(routes::notification::unsubscribe))
        .route("/roadmap/suggest", post(routes::roadmap::suggest))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // 管理路由：先过认证门，再过管理员门
    let admin_routes = Router::new()
        .route("/roadmap/edit/{id}", patch(routes::roadmap::edit))
        .route("/admin/whitelist", get(routes::admin::list_whitelist))
        .route("/admin/whitelist/add", post(routes::admin::add_whitelist))
        .route(
            "/admin/whitelist/remove",
            post(routes::admin::remove_whitelist),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    // 日志与限流
    let router = router.layer(axum::middleware::from_fn(log_errors)).layer(
        axum::middleware::from_fn_with_state(rate_limiter, rate_limit),
    );

    // 开发模式下放开CORS
    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    let app = router.with_state(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
