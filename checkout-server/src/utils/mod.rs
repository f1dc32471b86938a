//! Utility module - error types, response envelope, logging
//!
//! # Contents
//!
//! - [`AppError`] - application error taxonomy
//! - [`AppResponse`] - error response envelope
//! - [`logger`] - tracing setup

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult};
