//! Compile-time host-strategy selection and the browser service bundle.

use std::rc::Rc;

use platform_host::{HostServices, HostStrategy, ManualFrameScheduler, MemoryRecordStore};

use crate::{AnimationFrameScheduler, WebRecordStore, WebViewport};

/// Returns the host strategy for the active build target.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        HostStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStrategy::Headless
    }
}

/// Builds the host service bundle for the active build target.
///
/// Browser builds get `localStorage`, the live window viewport, and `requestAnimationFrame`.
/// Other targets get in-memory storage and caller-driven frames so the runtime stays usable in
/// native tests and tools.
pub fn build_host_services() -> HostServices {
    match selected_host_strategy() {
        HostStrategy::Browser => HostServices {
            records: Rc::new(WebRecordStore),
            viewport: Rc::new(WebViewport),
            frames: Rc::new(AnimationFrameScheduler),
            host_strategy: HostStrategy::Browser,
        },
        HostStrategy::Headless => HostServices {
            records: Rc::new(MemoryRecordStore::default()),
            viewport: Rc::new(WebViewport),
            frames: Rc::new(ManualFrameScheduler::default()),
            host_strategy: HostStrategy::Headless,
        },
    }
}
