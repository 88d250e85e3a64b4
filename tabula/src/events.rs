//! Input event types and handler results.
//!
//! The host translates its native input into these types and feeds them to
//! components. Coordinates are pixels relative to the component's top-left
//! corner.

// =============================================================================
// Event Result
// =============================================================================

/// Result of handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
    /// Event started a drag operation on this component.
    StartDrag,
}

impl EventResult {
    /// Check if the event was handled (consumed or started drag).
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }
}

// =============================================================================
// Keyboard
// =============================================================================

/// Keys components react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Character key
    Char(char),
    /// Enter/Return
    Enter,
    /// Escape
    Escape,
    /// Tab
    Tab,
    /// Space
    Space,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Whether the "add to selection" modifier is held (ctrl or meta).
    pub fn extends_selection(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

// =============================================================================
// Pointer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer press, move or release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// A wheel (or touchpad) scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelEvent {
    pub dx: f64,
    pub dy: f64,
    pub mode: DeltaMode,
}

impl WheelEvent {
    pub fn pixels(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            mode: DeltaMode::Pixel,
        }
    }

    pub fn lines(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            mode: DeltaMode::Line,
        }
    }

    pub fn pages(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            mode: DeltaMode::Page,
        }
    }
}
