//! Helper types shared by the entity model and the wire codec.
//!
//! - [`amount`] - Price-like decimal coercion from numbers and formatted strings
//! - [`guid`] - Per-request unique identifiers for server-side deduplication

pub mod amount;
pub mod guid;

pub use amount::*;
pub use guid::*;
