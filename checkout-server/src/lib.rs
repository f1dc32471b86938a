//! Checkout Server - payment and order orchestration for the storefront
//!
//! # Architecture overview
//!
//! The server fronts four external collaborators and owns the one flow
//! the storefront must never get wrong: money is captured exactly once,
//! an order exists for every capture, and a discount is counted for
//! every order that used one.
//!
//! - **Payment gateway**: card capture with a 3-D Secure challenge
//! - **Backend**: discount ledger, order intake and invoice documents
//! - **FX source**: origin-to-capture currency rate, cached with TTL
//!
//! # Module structure
//!
//! ```text
//! checkout-server/src/
//! ├── core/          # configuration, state, server, background tasks
//! ├── clients/       # HTTP clients for the external collaborators
//! ├── checkout/      # orchestration, rate cache, pending payments,
//! │                  # reconciliation journal
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, response envelope, logging
//! ```

pub mod api;
pub mod checkout;
pub mod clients;
pub mod core;
pub mod utils;

// Re-export common types
pub use checkout::CheckoutService;
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
