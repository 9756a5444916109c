//! Viewport query contract.
//!
//! The window manager reads the live viewport on demand (maximize, cascade clamping). It never
//! caches the value or subscribes to resize events.

use std::{cell::Cell, rc::Rc};

use serde::{Deserialize, Serialize};

/// Viewport used when the host cannot report one (for example, before the document exists).
pub const FALLBACK_VIEWPORT: ViewportSize = ViewportSize {
    width: 1920,
    height: 1080,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Viewport dimensions in CSS pixels.
pub struct ViewportSize {
    /// Viewport width.
    pub width: i32,
    /// Viewport height.
    pub height: i32,
}

impl ViewportSize {
    /// Creates a viewport size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Host service reporting the current viewport size.
pub trait ViewportProvider {
    /// Returns the current viewport size.
    fn viewport(&self) -> ViewportSize;
}

#[derive(Debug, Clone, Default)]
/// Viewport provider holding a settable size. Clones share the same value.
pub struct FixedViewport {
    size: Rc<Cell<Option<ViewportSize>>>,
}

impl FixedViewport {
    /// Creates a provider reporting `size`.
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size: Rc::new(Cell::new(Some(size))),
        }
    }

    /// Changes the reported size.
    pub fn set(&self, size: ViewportSize) {
        self.size.set(Some(size));
    }
}

impl ViewportProvider for FixedViewport {
    fn viewport(&self) -> ViewportSize {
        self.size.get().unwrap_or(FALLBACK_VIEWPORT)
    }
}
