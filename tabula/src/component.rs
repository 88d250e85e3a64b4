//! Lifecycle contract shared by components.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Visibility and enablement flags of a component.
///
/// Cheap to clone; clones share the flags.
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    hidden: Arc<AtomicBool>,
    disabled: Arc<AtomicBool>,
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Whether the component should react to input.
    pub fn is_interactive(&self) -> bool {
        !self.is_hidden() && !self.is_disabled()
    }
}

/// A renderable component.
///
/// Components are handles over shared state, so every hook takes `&self`.
/// `render` produces a plain view model the host draws.
pub trait Component {
    /// Render model produced by this component.
    type View;

    fn state(&self) -> &ComponentState;

    fn render(&self) -> Self::View;

    fn show(&self) {
        log::trace!("show");
        self.state().set_hidden(false);
    }

    fn hide(&self) {
        log::trace!("hide");
        self.state().set_hidden(true);
    }

    fn set_disabled(&self, disabled: bool) {
        self.state().set_disabled(disabled);
    }

    fn is_hidden(&self) -> bool {
        self.state().is_hidden()
    }

    fn is_disabled(&self) -> bool {
        self.state().is_disabled()
    }
}
