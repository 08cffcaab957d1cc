pub mod config;
pub mod error;
pub mod rest;

pub use config::ServerConfig;
pub use error::ApiError;
pub use rest::{AppState, RestApi};
