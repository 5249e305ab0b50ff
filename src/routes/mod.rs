pub mod admin;
pub mod notification;
pub mod post;
pub mod roadmap;
pub mod user;
