//! Keyboard focus cycling across open windows (Alt+Tab / Alt+Shift+Tab).

use crate::{model::WindowId, window_store::WindowStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl CycleDirection {
    fn step(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Keyboard shortcut that cycles window focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusCycleShortcut;

impl FocusCycleShortcut {
    /// Maps a keydown to a cycle direction. Shift reverses the direction.
    pub fn from_key(key: &str, alt: bool, shift: bool) -> Option<CycleDirection> {
        if !alt || key != "Tab" {
            return None;
        }
        Some(if shift {
            CycleDirection::Backward
        } else {
            CycleDirection::Forward
        })
    }
}

/// Window that a cycle step in `direction` would focus.
pub fn next_focus_target(store: &WindowStore, direction: CycleDirection) -> Option<WindowId> {
    let candidates = store.focusable_windows();
    if candidates.len() < 2 {
        return None;
    }
    let count = candidates.len() as isize;
    let current = store.get_focused_window().and_then(|focused| {
        candidates
            .iter()
            .position(|window| window.id == focused.id)
    });
    let next = match current {
        Some(index) => (index as isize + direction.step() + count) % count,
        None => 0,
    };
    Some(candidates[next as usize].id.clone())
}

/// Focuses the next window in `direction`. Returns the newly focused window.
pub fn cycle_focus(store: &mut WindowStore, direction: CycleDirection) -> Option<WindowId> {
    let target = next_focus_target(store, direction)?;
    store.focus_window(&target);
    Some(target)
}
