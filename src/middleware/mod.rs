mod admin;
mod auth;
mod error_handler;
mod rate_limit;

pub use admin::admin_middleware;
pub use auth::{AuthUser, SESSION_COOKIE, auth_middleware, session_removal_cookie};
pub use error_handler::log_errors;
pub use rate_limit::{RateLimiter, rate_limit};
