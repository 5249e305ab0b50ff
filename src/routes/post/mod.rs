mod handler;
pub mod model;

pub use handler::{create_post, like_post, reply_post};
