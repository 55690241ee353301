pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod server;

pub use crate::error::AppError;
pub use crate::server::AppState;
