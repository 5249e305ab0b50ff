mod handler;
pub mod model;

pub use handler::{list, mark_all_read, mark_read, subscribe, unsubscribe};
