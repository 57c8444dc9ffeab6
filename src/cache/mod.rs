//! Response caching for the request pipeline.
//!
//! Successful reads are memoized for a bounded window, keyed by request
//! identity (method + path + query). Volatile resource families are never
//! admitted regardless of method or status.

mod key;
mod layer;

pub use key::request_key;
pub use layer::ResponseCache;
