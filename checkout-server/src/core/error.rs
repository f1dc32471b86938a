//! Startup errors
//!
//! Request-time failures use [`crate::utils::AppError`]; this type only
//! covers the path from process start to a bound listener.

use thiserror::Error;

use crate::core::config::ConfigError;
use crate::utils::AppError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Startup error: {0}")]
    Startup(#[from] AppError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
