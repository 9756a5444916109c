//! Browser viewport adapter.

use platform_host::{ViewportProvider, ViewportSize, FALLBACK_VIEWPORT};

#[derive(Debug, Clone, Copy, Default)]
/// Viewport provider reading `window.innerWidth` / `window.innerHeight` on every query.
pub struct WebViewport;

impl ViewportProvider for WebViewport {
    fn viewport(&self) -> ViewportSize {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                return FALLBACK_VIEWPORT;
            };
            let width = window.inner_width().ok().and_then(|v| v.as_f64());
            let height = window.inner_height().ok().and_then(|v| v.as_f64());
            match (width, height) {
                (Some(width), Some(height)) => ViewportSize::new(width as i32, height as i32),
                _ => FALLBACK_VIEWPORT,
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            FALLBACK_VIEWPORT
        }
    }
}
