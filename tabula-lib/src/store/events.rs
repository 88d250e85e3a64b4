//! Store lifecycle events

use std::sync::Arc;

/// Events a store fires to its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A load is about to hit the proxy.
    BeforeLoad,
    /// A load completed (or `load()` was called on a loaded store).
    Load,
    /// Sort and filter converged after a load or a sort/filter change.
    Update,
}

/// Registered listener callback.
pub type Listener = Arc<dyn Fn(StoreEvent) + Send + Sync>;

/// Handle returned by [`Store::on`](super::Store::on), used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(super) usize);

/// Load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}
