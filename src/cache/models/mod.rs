pub mod session;

pub use session::CachedSession;
