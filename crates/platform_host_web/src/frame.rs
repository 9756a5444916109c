//! `requestAnimationFrame` scheduler adapter.

use platform_host::{FrameCallback, FrameHandle, FrameScheduler};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};

#[derive(Debug, Clone, Copy, Default)]
/// Frame scheduler backed by `window.requestAnimationFrame`.
///
/// Off the browser there is no frame clock, so callbacks run immediately and the returned handle
/// is inert.
pub struct AnimationFrameScheduler;

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                callback();
                return FrameHandle(-1);
            };
            let js_callback = Closure::once_into_js(move || callback());
            match window.request_animation_frame(js_callback.unchecked_ref()) {
                Ok(id) => FrameHandle(i64::from(id)),
                Err(_) => FrameHandle(-1),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            callback();
            FrameHandle(-1)
        }
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        #[cfg(target_arch = "wasm32")]
        {
            if handle.0 < 0 {
                return;
            }
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0 as i32);
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = handle;
        }
    }
}
