//! Typed models

mod data;
mod field;
mod filter;
mod keycode;
mod record;
mod sort;
mod value;

pub use data::*;
pub use field::*;
pub use filter::*;
pub use keycode::keycode;
pub use record::*;
pub use sort::*;
pub use value::*;
