mod handler;
pub mod model;

pub use handler::{follow, login, logout, me, register, update_password};
