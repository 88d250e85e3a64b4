//! Record store library
//!
//! Typed records, an in-memory record set with sort and filter, and a
//! [`Store`](store::Store) that loads record sets from inline arrays or a
//! remote JSON endpoint.

pub mod busy;
pub mod error;
pub mod millis;
pub mod model;
pub mod store;
pub mod transport;

pub use store::Store;
