// 缓存模块
// 会话记录只存在于缓存中，从不落盘

pub mod keys;
pub mod models;
pub mod operations;

pub use models::session::CachedSession;
pub use operations::session::SessionCacheOperations;
