mod handler;
pub mod model;

pub use handler::{edit, list, suggest};
