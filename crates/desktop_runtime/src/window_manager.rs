//! Window geometry helpers and tunables shared by the store and the interaction controller.

use crate::model::{ResizeEdge, ViewportSize, WindowBounds};

/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 320;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 200;
/// Width of a freshly created window.
pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
/// Height of a freshly created window.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;
/// Top-left corner of the first cascaded window.
pub const CASCADE_ORIGIN: (i32, i32) = (100, 100);
/// Offset between consecutive cascaded windows, on both axes.
pub const CASCADE_STEP_PX: i32 = 32;
/// Number of cascade slots before placement wraps back to the origin.
pub const CASCADE_SLOTS: usize = 8;
/// Pixels of a new window that must stay inside the viewport.
pub const CASCADE_MIN_VISIBLE_PX: i32 = 64;
/// Grace period between a soft close request and removal.
pub const CLOSE_ANIMATION_MS: u64 = 160;
/// Height the taskbar reserves when it is not auto-hidden.
pub const TASKBAR_HEIGHT_PX: i32 = 48;

/// Raises the size of `bounds` to the window floor.
pub fn enforce_size_floor(bounds: WindowBounds) -> WindowBounds {
    bounds.clamped_min(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
}

/// Initial bounds for a window created while `open_windows` windows already exist.
pub fn cascade_bounds(open_windows: usize, viewport: ViewportSize) -> WindowBounds {
    let step = (open_windows % CASCADE_SLOTS) as i32 * CASCADE_STEP_PX;
    let max_x = (viewport.width - CASCADE_MIN_VISIBLE_PX).max(0);
    let max_y = (viewport.height - CASCADE_MIN_VISIBLE_PX).max(0);
    WindowBounds {
        x: (CASCADE_ORIGIN.0 + step).clamp(0, max_x),
        y: (CASCADE_ORIGIN.1 + step).clamp(0, max_y),
        width: DEFAULT_WINDOW_WIDTH,
        height: DEFAULT_WINDOW_HEIGHT,
    }
}

/// Bounds covering the whole viewport, floor-clamped.
pub fn maximized_bounds(viewport: ViewportSize) -> WindowBounds {
    enforce_size_floor(WindowBounds::new(0, 0, viewport.width, viewport.height))
}

/// Applies resize deltas for a given edge/corner drag.
///
/// Only the size is clamped afterwards: shrinking past the floor from a north or west handle
/// keeps moving the origin while the size sticks at the minimum.
pub fn resize_bounds(start: WindowBounds, edge: ResizeEdge, dx: i32, dy: i32) -> WindowBounds {
    let mut next = start;
    if edge.moves_east() {
        next.width += dx;
    }
    if edge.moves_west() {
        next.x += dx;
        next.width -= dx;
    }
    if edge.moves_south() {
        next.height += dy;
    }
    if edge.moves_north() {
        next.y += dy;
        next.height -= dy;
    }
    enforce_size_floor(next)
}
