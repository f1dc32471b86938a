//! Order assembly and records

pub mod record;
pub mod request;

pub use record::OrderRecord;
pub use request::{OrderLine, OrderRequest, assemble};
