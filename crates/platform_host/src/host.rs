//! Host service bundle injected into the desktop runtime.

use std::rc::Rc;

use crate::{
    FixedViewport, FrameScheduler, ManualFrameScheduler, MemoryRecordStore, RecordStore,
    ViewportProvider, ViewportSize,
};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition (`localStorage`, `requestAnimationFrame`).
    Browser,
    /// In-memory composition with caller-driven frames, used off the browser.
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Runtime-selected host service bundle.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `desktop_runtime`, which keeps the window manager free of browser API details.
#[derive(Clone)]
pub struct HostServices {
    /// Durable named-record storage.
    pub records: Rc<dyn RecordStore>,
    /// Live viewport query.
    pub viewport: Rc<dyn ViewportProvider>,
    /// Rendering-frame scheduler.
    pub frames: Rc<dyn FrameScheduler>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds an in-memory bundle reporting a fixed viewport.
    pub fn headless(viewport: ViewportSize) -> Self {
        Self {
            records: Rc::new(MemoryRecordStore::default()),
            viewport: Rc::new(FixedViewport::new(viewport)),
            frames: Rc::new(ManualFrameScheduler::default()),
            host_strategy: HostStrategy::Headless,
        }
    }
}
