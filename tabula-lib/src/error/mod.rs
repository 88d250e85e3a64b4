//! Error types

mod api;
mod field;
mod store;

pub use api::*;
pub use field::*;
pub use store::*;

/// Top-level error for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport or response error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Typed field access error.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Store configuration or load error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
