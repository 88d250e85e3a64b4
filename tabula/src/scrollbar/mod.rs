//! Momentum scrollbar.

mod frame;
mod state;
mod types;

pub use frame::FrameLoop;
pub use state::Scrollbar;
pub use types::*;
