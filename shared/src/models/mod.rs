//! Domain models
//!
//! # Contents
//!
//! - [`CartItem`] - cart line with a unit price snapshot
//! - [`Address`] - free-form delivery/billing address
//! - [`DiscountTerms`] - validated discount code terms
//! - [`ExchangeRateSnapshot`] / [`RateQuote`] - FX rate with freshness

pub mod address;
pub mod cart;
pub mod discount;
pub mod rate;

pub use address::Address;
pub use cart::CartItem;
pub use discount::{DiscountKind, DiscountTerms};
pub use rate::{ExchangeRateSnapshot, RateQuote};
