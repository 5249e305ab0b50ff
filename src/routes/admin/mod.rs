mod handler;
pub mod model;

pub use handler::{add_whitelist, list_whitelist, remove_whitelist};
