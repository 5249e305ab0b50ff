/// 缓存操作

pub mod session;

pub use session::SessionCacheOperations;
