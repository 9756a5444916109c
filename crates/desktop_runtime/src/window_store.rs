//! Window store: the single owner of the windows collection and the z-index allocator.
//!
//! Every lifecycle transition (create, focus, minimize, maximize/restore, update, soft and hard
//! close) goes through a `&mut self` command here. Commands that change state notify subscribers
//! with a [`WindowStoreEvent`] once the mutation is complete; commands that turn out to be
//! no-ops stay silent.

use std::{collections::BTreeMap, rc::Rc};

use leptos::logging;
use platform_host::{unix_time_ms_now, ViewportProvider};

use crate::{
    model::{AppId, WindowId, WindowMetadata, WindowPatch, WindowPlacement},
    subscription::{Subscribers, Subscription},
    window_manager::{cascade_bounds, enforce_size_floor, maximized_bounds},
};

/// First value handed out by the z-index allocator.
pub const INITIAL_Z_INDEX: u64 = 1;

/// Largest z-index a restored layout may carry as-is (the largest integer a browser record holds
/// exactly). Layouts at or above it are renumbered on hydration.
pub const MAX_Z_INDEX: u64 = (1 << 53) - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Change notification emitted after a mutating store command.
pub enum WindowStoreEvent {
    Created(WindowId),
    Updated(WindowId),
    Focused(WindowId),
    Minimized(WindowId),
    Maximized(WindowId),
    Restored(WindowId),
    Closing(WindowId),
    Removed(WindowId),
    Cleared,
    Hydrated,
}

impl WindowStoreEvent {
    /// The window the event is about, when there is exactly one.
    pub fn window_id(&self) -> Option<&WindowId> {
        match self {
            Self::Created(id)
            | Self::Updated(id)
            | Self::Focused(id)
            | Self::Minimized(id)
            | Self::Maximized(id)
            | Self::Restored(id)
            | Self::Closing(id)
            | Self::Removed(id) => Some(id),
            Self::Cleared | Self::Hydrated => None,
        }
    }
}

type WindowStoreListener = dyn Fn(&WindowStore, &WindowStoreEvent);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Owned copy of the store contents, ordered bottom-to-top by z-index.
pub struct WindowStoreSnapshot {
    pub windows: Vec<WindowMetadata>,
    pub focused_window_id: Option<WindowId>,
    pub next_z_index: u64,
}

impl WindowStoreSnapshot {
    pub fn window(&self, window_id: &WindowId) -> Option<&WindowMetadata> {
        self.windows.iter().find(|window| &window.id == window_id)
    }
}

/// Windows restored from a persisted layout, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HydratedLayout {
    pub windows: Vec<WindowMetadata>,
    pub next_z_index: u64,
}

pub struct WindowStore {
    windows: BTreeMap<WindowId, WindowMetadata>,
    next_z_index: u64,
    /// Latest `created_at` handed out or restored; creation stamps stay strictly increasing.
    last_created_at: u64,
    viewport: Rc<dyn ViewportProvider>,
    listeners: Subscribers<WindowStoreListener>,
}

impl WindowStore {
    /// Creates an empty store that reads the live viewport from `viewport`.
    pub fn new(viewport: Rc<dyn ViewportProvider>) -> Self {
        Self {
            windows: BTreeMap::new(),
            next_z_index: INITIAL_Z_INDEX,
            last_created_at: 0,
            viewport,
            listeners: Subscribers::default(),
        }
    }

    /// Registers `listener` for change notifications until the returned handle is dropped.
    pub fn subscribe(
        &self,
        listener: impl Fn(&WindowStore, &WindowStoreEvent) + 'static,
    ) -> Subscription {
        let listener: Rc<WindowStoreListener> = Rc::new(listener);
        self.listeners.add(listener)
    }

    /// Opens a cascaded, focused window on top of the stack and returns its id.
    pub fn create_window(&mut self, app_id: AppId, title: impl Into<String>) -> WindowId {
        let created_at = self.stamp_creation();
        let mut id = WindowId::generate(app_id, created_at);
        while self.windows.contains_key(&id) {
            id = WindowId::generate(app_id, created_at);
        }

        let bounds = cascade_bounds(self.windows.len(), self.viewport.viewport());
        for window in self.windows.values_mut() {
            window.is_focused = false;
        }
        let z_index = self.allocate_z_index();
        self.windows.insert(
            id.clone(),
            WindowMetadata {
                id: id.clone(),
                app_id,
                title: title.into(),
                placement: WindowPlacement::Normal(bounds),
                is_minimized: false,
                is_closing: false,
                is_focused: true,
                z_index,
                created_at,
            },
        );
        self.emit(WindowStoreEvent::Created(id.clone()));
        id
    }

    /// Removes a window immediately, without focus transfer.
    pub fn close_window(&mut self, window_id: &WindowId) -> bool {
        if self.windows.remove(window_id).is_none() {
            return false;
        }
        self.emit(WindowStoreEvent::Removed(window_id.clone()));
        true
    }

    /// Marks a window as closing and hands focus to the next candidate.
    ///
    /// The window stays in the store until [`WindowStore::remove_window`] runs after the close
    /// animation.
    pub fn request_close_window(&mut self, window_id: &WindowId) -> bool {
        let Some(window) = self.windows.get_mut(window_id) else {
            return false;
        };
        if window.is_closing {
            return false;
        }
        window.is_closing = true;
        window.is_focused = false;
        self.transfer_focus_from(window_id);
        self.emit(WindowStoreEvent::Closing(window_id.clone()));
        true
    }

    /// Finalizes a soft close.
    pub fn remove_window(&mut self, window_id: &WindowId) -> bool {
        self.close_window(window_id)
    }

    /// Merges `patch` into a window. Sizes are clamped to the window floor.
    pub fn update_window(&mut self, window_id: &WindowId, patch: WindowPatch) -> bool {
        let Some(window) = self.windows.get_mut(window_id) else {
            return false;
        };

        let mut changed = false;
        if let Some(title) = patch.title.as_ref() {
            if &window.title != title {
                window.title = title.clone();
                changed = true;
            }
        }
        let bounds = window.placement.bounds_mut();
        let next = enforce_size_floor(patch.apply_to_bounds(*bounds));
        if *bounds != next {
            *bounds = next;
            changed = true;
        }

        if changed {
            self.emit(WindowStoreEvent::Updated(window_id.clone()));
        }
        changed
    }

    /// Focuses, unminimizes, and raises a window.
    pub fn focus_window(&mut self, window_id: &WindowId) -> bool {
        if !self.raise_and_focus(window_id) {
            return false;
        }
        self.emit(WindowStoreEvent::Focused(window_id.clone()));
        true
    }

    /// Minimizes a window and hands focus to the next candidate.
    pub fn minimize_window(&mut self, window_id: &WindowId) -> bool {
        let Some(window) = self.windows.get_mut(window_id) else {
            return false;
        };
        if window.is_closing || (window.is_minimized && !window.is_focused) {
            return false;
        }
        window.is_minimized = true;
        window.is_focused = false;
        self.transfer_focus_from(window_id);
        self.emit(WindowStoreEvent::Minimized(window_id.clone()));
        true
    }

    /// Maximizes a window to the viewport, or restores it when already maximized.
    pub fn maximize_window(&mut self, window_id: &WindowId) -> bool {
        let viewport = self.viewport.viewport();
        let Some(window) = self.windows.get_mut(window_id) else {
            return false;
        };
        if window.is_closing {
            return false;
        }
        if window.is_maximized() {
            return self.restore_window(window_id);
        }

        window.placement = WindowPlacement::Maximized {
            bounds: maximized_bounds(viewport),
            restore_bounds: window.bounds(),
        };
        window.is_minimized = false;
        self.raise_and_focus(window_id);
        self.emit(WindowStoreEvent::Maximized(window_id.clone()));
        true
    }

    /// Leaves the maximized state (restoring the saved bounds) or the minimized state, then
    /// focuses the window.
    pub fn restore_window(&mut self, window_id: &WindowId) -> bool {
        let Some(window) = self.windows.get_mut(window_id) else {
            return false;
        };
        if window.is_closing {
            return false;
        }
        let mut changed = false;
        if let WindowPlacement::Maximized { restore_bounds, .. } = window.placement {
            window.placement = WindowPlacement::Normal(restore_bounds);
            changed = true;
        }
        if window.is_minimized {
            window.is_minimized = false;
            changed = true;
        }
        changed |= self.raise_and_focus(window_id);
        if !changed {
            return false;
        }
        self.emit(WindowStoreEvent::Restored(window_id.clone()));
        true
    }

    /// Drops every window and resets the z-index allocator.
    pub fn clear_all_windows(&mut self) {
        self.windows.clear();
        self.next_z_index = INITIAL_Z_INDEX;
        self.emit(WindowStoreEvent::Cleared);
    }

    /// Replaces the store contents with a normalized persisted layout.
    pub fn hydrate(&mut self, layout: HydratedLayout) {
        let mut windows = layout.windows;
        let top_z_index = windows.iter().map(|window| window.z_index).max();
        self.next_z_index = match top_z_index {
            Some(top) if top >= MAX_Z_INDEX || layout.next_z_index >= MAX_Z_INDEX => {
                compact_z_indices(&mut windows)
            }
            Some(top) => layout.next_z_index.max(top + 1),
            None if layout.next_z_index >= MAX_Z_INDEX => INITIAL_Z_INDEX,
            None => layout.next_z_index.max(INITIAL_Z_INDEX),
        };
        if let Some(newest) = windows.iter().map(|window| window.created_at).max() {
            self.last_created_at = self.last_created_at.max(newest);
        }
        self.windows = windows
            .into_iter()
            .map(|window| (window.id.clone(), window))
            .collect();
        self.emit(WindowStoreEvent::Hydrated);
    }

    pub fn get_window(&self, window_id: &WindowId) -> Option<&WindowMetadata> {
        self.windows.get(window_id)
    }

    /// Returns the focused window.
    ///
    /// When no focusable window carries the focus flag, the top of the focusable stack is
    /// returned instead.
    pub fn get_focused_window(&self) -> Option<&WindowMetadata> {
        let focus = self.resolve_focus()?;
        if let FocusResolution::TopOfStack(top) = focus {
            logging::debug_warn!(
                "no window carries focus; falling back to top of stack {}",
                top.id
            );
        }
        Some(focus.window())
    }

    fn resolve_focus(&self) -> Option<FocusResolution<'_>> {
        let focusable = self.windows.values().filter(|window| window.is_focusable());
        if let Some(focused) = focusable
            .clone()
            .filter(|window| window.is_focused)
            .max_by_key(|window| window.z_index)
        {
            return Some(FocusResolution::Flagged(focused));
        }
        focusable
            .max_by_key(|window| window.z_index)
            .map(FocusResolution::TopOfStack)
    }

    /// Windows of `app_id`, oldest first.
    pub fn get_windows_by_app_id(&self, app_id: AppId) -> Vec<&WindowMetadata> {
        let mut windows: Vec<_> = self
            .windows
            .values()
            .filter(|window| window.app_id == app_id)
            .collect();
        windows.sort_by_key(|window| (window.created_at, window.z_index));
        windows
    }

    /// Number of windows that are neither minimized nor closing.
    pub fn get_open_window_count(&self) -> usize {
        self.windows
            .values()
            .filter(|window| window.is_focusable())
            .count()
    }

    /// All windows, bottom of the stack first.
    pub fn windows_by_z_order(&self) -> Vec<&WindowMetadata> {
        let mut windows: Vec<_> = self.windows.values().collect();
        windows.sort_by_key(|window| window.z_index);
        windows
    }

    /// Focus candidates, top of the stack first.
    pub fn focusable_windows(&self) -> Vec<&WindowMetadata> {
        let mut windows: Vec<_> = self
            .windows
            .values()
            .filter(|window| window.is_focusable())
            .collect();
        windows.sort_by(|a, b| b.z_index.cmp(&a.z_index));
        windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn next_z_index(&self) -> u64 {
        self.next_z_index
    }

    pub fn snapshot(&self) -> WindowStoreSnapshot {
        WindowStoreSnapshot {
            windows: self.windows_by_z_order().into_iter().cloned().collect(),
            focused_window_id: self
                .resolve_focus()
                .map(|focus| focus.window().id.clone()),
            next_z_index: self.next_z_index,
        }
    }

    /// Wall-clock milliseconds, bumped past the previous stamp when the clock has not advanced.
    fn stamp_creation(&mut self) -> u64 {
        let created_at = unix_time_ms_now().max(self.last_created_at.saturating_add(1));
        self.last_created_at = created_at;
        created_at
    }

    fn allocate_z_index(&mut self) -> u64 {
        let z_index = self.next_z_index;
        self.next_z_index = self.next_z_index.saturating_add(1);
        z_index
    }

    fn top_z_index(&self) -> Option<u64> {
        self.windows.values().map(|window| window.z_index).max()
    }

    /// Focus transition without notification. Returns `false` when nothing changed.
    fn raise_and_focus(&mut self, window_id: &WindowId) -> bool {
        let top_z_index = self.top_z_index();
        let Some(target) = self.windows.get(window_id) else {
            return false;
        };
        if target.is_closing {
            return false;
        }
        let already_focused_top = target.is_focused
            && !target.is_minimized
            && Some(target.z_index) == top_z_index
            && self
                .windows
                .values()
                .all(|window| window.id == *window_id || !window.is_focused);
        if already_focused_top {
            return false;
        }

        let z_index = self.allocate_z_index();
        for window in self.windows.values_mut() {
            if window.id == *window_id {
                window.is_focused = true;
                window.is_minimized = false;
                window.z_index = z_index;
            } else {
                window.is_focused = false;
            }
        }
        true
    }

    /// Hands focus to the highest focusable window other than `departing`, if any.
    fn transfer_focus_from(&mut self, departing: &WindowId) -> Option<WindowId> {
        let candidate = self
            .windows
            .values()
            .filter(|window| window.id != *departing && window.is_focusable())
            .max_by_key(|window| window.z_index)
            .map(|window| window.id.clone())?;
        self.raise_and_focus(&candidate);
        Some(candidate)
    }

    fn emit(&self, event: WindowStoreEvent) {
        for listener in self.listeners.listeners() {
            listener(self, &event);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusResolution<'a> {
    /// The highest focusable window carrying the focus flag.
    Flagged(&'a WindowMetadata),
    /// No focusable window is flagged; the top of the focusable stack stands in.
    TopOfStack(&'a WindowMetadata),
}

impl<'a> FocusResolution<'a> {
    fn window(self) -> &'a WindowMetadata {
        match self {
            Self::Flagged(window) | Self::TopOfStack(window) => window,
        }
    }
}

/// Renumbers `windows` to consecutive z-indices from [`INITIAL_Z_INDEX`], keeping their stacking
/// order. Returns the next free z-index.
pub(crate) fn compact_z_indices(windows: &mut [WindowMetadata]) -> u64 {
    windows.sort_by_key(|window| window.z_index);
    let mut next_z_index = INITIAL_Z_INDEX;
    for window in windows.iter_mut() {
        window.z_index = next_z_index;
        next_z_index += 1;
    }
    next_z_index
}
