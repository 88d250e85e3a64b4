//! HTTP transport with retry and request coalescing.

mod client;
mod request;
mod retry;

pub use client::*;
pub use request::*;
pub use retry::RetryConfig;
