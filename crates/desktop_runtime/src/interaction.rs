//! Drag and resize gestures.
//!
//! Pointer moves only touch controller-local draft bounds. Drafts become visible once per
//! rendering frame, and the store sees a single `update_window` when the pointer is released.
//! Each gesture is keyed by its pointer id, so two pointers can drive two windows at once.

use std::{cell::RefCell, rc::Rc};

use platform_host::{FrameHandle, FrameScheduler};

use crate::{
    model::{
        PointerPosition, PointerSample, ResizeEdge, WindowBounds, WindowId, WindowMetadata,
        WindowPatch,
    },
    subscription::{Subscribers, Subscription},
    window_manager::resize_bounds,
    window_store::WindowStore,
};

/// `PointerEvent.button` value of the primary (usually left) button.
pub const PRIMARY_POINTER_BUTTON: i16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize(ResizeEdge),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Gesture {
    window_id: WindowId,
    pointer_id: i32,
    kind: GestureKind,
    pointer_start: PointerPosition,
    bounds_start: WindowBounds,
    /// Latest computed bounds; committed on pointer-up.
    pending: WindowBounds,
    /// Bounds flushed on the last frame tick; what the window renders with.
    visible: WindowBounds,
}

impl Gesture {
    fn bounds_at(&self, position: PointerPosition) -> WindowBounds {
        let dx = position.x - self.pointer_start.x;
        let dy = position.y - self.pointer_start.y;
        match self.kind {
            GestureKind::Drag => self.bounds_start.offset(dx, dy),
            GestureKind::Resize(edge) => resize_bounds(self.bounds_start, edge, dx, dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    Requesting,
    Scheduled(FrameHandle),
}

struct InteractionState {
    gestures: Vec<Gesture>,
    frame: FrameState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Visible draft change delivered to draft subscribers. `bounds` is `None` when the gesture ended.
pub struct DraftUpdate {
    pub window_id: WindowId,
    pub bounds: Option<WindowBounds>,
}

type DraftListener = dyn Fn(&[DraftUpdate]);

/// Pointer-driven drag/resize controller. Clones share the same gestures.
#[derive(Clone)]
pub struct InteractionController {
    state: Rc<RefCell<InteractionState>>,
    frames: Rc<dyn FrameScheduler>,
    listeners: Subscribers<DraftListener>,
}

impl InteractionController {
    pub fn new(frames: Rc<dyn FrameScheduler>) -> Self {
        Self {
            state: Rc::new(RefCell::new(InteractionState {
                gestures: Vec::new(),
                frame: FrameState::Idle,
            })),
            frames,
            listeners: Subscribers::default(),
        }
    }

    /// Registers `listener` for visible draft changes until the returned handle is dropped.
    pub fn subscribe_drafts(&self, listener: impl Fn(&[DraftUpdate]) + 'static) -> Subscription {
        let listener: Rc<DraftListener> = Rc::new(listener);
        self.listeners.add(listener)
    }

    /// Starts moving a window with the pointer. Returns `false` when the gesture is ignored.
    pub fn begin_drag(
        &self,
        store: &mut WindowStore,
        window_id: &WindowId,
        button: i16,
        pointer: PointerSample,
    ) -> bool {
        self.begin(store, window_id, GestureKind::Drag, button, pointer)
    }

    /// Starts resizing a window from `edge`. Returns `false` when the gesture is ignored.
    pub fn begin_resize(
        &self,
        store: &mut WindowStore,
        window_id: &WindowId,
        edge: ResizeEdge,
        button: i16,
        pointer: PointerSample,
    ) -> bool {
        self.begin(store, window_id, GestureKind::Resize(edge), button, pointer)
    }

    /// Updates the pending draft of the gesture driven by `pointer`.
    ///
    /// Returns `false` when no gesture is tracking that pointer id.
    pub fn pointer_move(&self, pointer: PointerSample) -> bool {
        let needs_frame = {
            let mut state = self.state.borrow_mut();
            let Some(gesture) = state
                .gestures
                .iter_mut()
                .find(|gesture| gesture.pointer_id == pointer.pointer_id)
            else {
                return false;
            };
            gesture.pending = gesture.bounds_at(pointer.position);
            if state.frame == FrameState::Idle {
                state.frame = FrameState::Requesting;
                true
            } else {
                false
            }
        };
        if needs_frame {
            self.request_flush();
        }
        true
    }

    /// Ends the gesture driven by `pointer`, committing its latest draft to the store.
    ///
    /// Returns the committed window id, or `None` when no gesture is tracking that pointer id.
    pub fn pointer_up(&self, store: &mut WindowStore, pointer: PointerSample) -> Option<WindowId> {
        let gesture = self.take_gestures(|gesture| gesture.pointer_id == pointer.pointer_id)?;
        store.update_window(&gesture.window_id, WindowPatch::bounds(gesture.pending));
        self.notify(&[DraftUpdate {
            window_id: gesture.window_id.clone(),
            bounds: None,
        }]);
        Some(gesture.window_id)
    }

    /// Drops any gesture on `window_id` without committing it.
    pub fn release_window(&self, window_id: &WindowId) -> bool {
        let Some(gesture) = self.take_gestures(|gesture| gesture.window_id == *window_id) else {
            return false;
        };
        self.notify(&[DraftUpdate {
            window_id: gesture.window_id,
            bounds: None,
        }]);
        true
    }

    /// Drops every gesture without committing.
    pub fn release_all(&self) {
        let released: Vec<_> = {
            let mut state = self.state.borrow_mut();
            state
                .gestures
                .drain(..)
                .map(|gesture| DraftUpdate {
                    window_id: gesture.window_id,
                    bounds: None,
                })
                .collect()
        };
        self.cancel_frame_if_idle();
        if !released.is_empty() {
            self.notify(&released);
        }
    }

    /// Bounds a window should render with: its visible draft mid-gesture, else its committed
    /// bounds.
    pub fn display_bounds(&self, window: &WindowMetadata) -> WindowBounds {
        self.draft_bounds(&window.id)
            .unwrap_or_else(|| window.bounds())
    }

    /// Visible draft bounds for `window_id`, if a gesture is in flight on it.
    pub fn draft_bounds(&self, window_id: &WindowId) -> Option<WindowBounds> {
        self.state
            .borrow()
            .gestures
            .iter()
            .find(|gesture| gesture.window_id == *window_id)
            .map(|gesture| gesture.visible)
    }

    pub fn gesture_kind(&self, window_id: &WindowId) -> Option<GestureKind> {
        self.state
            .borrow()
            .gestures
            .iter()
            .find(|gesture| gesture.window_id == *window_id)
            .map(|gesture| gesture.kind)
    }

    pub fn active_gesture_count(&self) -> usize {
        self.state.borrow().gestures.len()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.state.borrow().frame != FrameState::Idle
    }

    fn begin(
        &self,
        store: &mut WindowStore,
        window_id: &WindowId,
        kind: GestureKind,
        button: i16,
        pointer: PointerSample,
    ) -> bool {
        if button != PRIMARY_POINTER_BUTTON {
            return false;
        }
        let Some(window) = store.get_window(window_id) else {
            return false;
        };
        if window.is_closing || window.is_maximized() {
            return false;
        }
        let bounds_start = self.display_bounds(window);

        store.focus_window(window_id);
        let displaced: Vec<_> = {
            let mut state = self.state.borrow_mut();
            let (replaced, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.gestures)
                .into_iter()
                .partition(|gesture| {
                    gesture.window_id == *window_id || gesture.pointer_id == pointer.pointer_id
                });
            state.gestures = kept;
            state.gestures.push(Gesture {
                window_id: window_id.clone(),
                pointer_id: pointer.pointer_id,
                kind,
                pointer_start: pointer.position,
                bounds_start,
                pending: bounds_start,
                visible: bounds_start,
            });
            replaced
                .into_iter()
                .filter(|gesture| gesture.window_id != *window_id)
                .map(|gesture| DraftUpdate {
                    window_id: gesture.window_id,
                    bounds: None,
                })
                .collect()
        };
        // Windows that lost their pointer fall back to committed bounds.
        if !displaced.is_empty() {
            self.notify(&displaced);
        }
        true
    }

    fn take_gestures(&self, predicate: impl Fn(&Gesture) -> bool) -> Option<Gesture> {
        let gesture = {
            let mut state = self.state.borrow_mut();
            let index = state.gestures.iter().position(predicate)?;
            state.gestures.remove(index)
        };
        self.cancel_frame_if_idle();
        Some(gesture)
    }

    fn request_flush(&self) {
        let state = Rc::downgrade(&self.state);
        let listeners = self.listeners.clone();
        let handle = self.frames.request_frame(Box::new(move || {
            if let Some(state) = state.upgrade() {
                flush_drafts(&state, &listeners);
            }
        }));

        let mut state = self.state.borrow_mut();
        // A synchronous scheduler may already have flushed and reset the frame state.
        if state.frame == FrameState::Requesting {
            state.frame = FrameState::Scheduled(handle);
        }
    }

    fn cancel_frame_if_idle(&self) {
        let handle = {
            let mut state = self.state.borrow_mut();
            if !state.gestures.is_empty() {
                return;
            }
            match std::mem::replace(&mut state.frame, FrameState::Idle) {
                FrameState::Scheduled(handle) => Some(handle),
                FrameState::Idle | FrameState::Requesting => None,
            }
        };
        if let Some(handle) = handle {
            self.frames.cancel_frame(handle);
        }
    }

    fn notify(&self, updates: &[DraftUpdate]) {
        for listener in self.listeners.listeners() {
            listener(updates);
        }
    }
}

fn flush_drafts(state: &RefCell<InteractionState>, listeners: &Subscribers<DraftListener>) {
    let updates: Vec<_> = {
        let mut state = state.borrow_mut();
        state.frame = FrameState::Idle;
        state
            .gestures
            .iter_mut()
            .filter(|gesture| gesture.visible != gesture.pending)
            .map(|gesture| {
                gesture.visible = gesture.pending;
                DraftUpdate {
                    window_id: gesture.window_id.clone(),
                    bounds: Some(gesture.visible),
                }
            })
            .collect()
    };
    if updates.is_empty() {
        return;
    }
    for listener in listeners.listeners() {
        listener(&updates);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use platform_host::{FixedViewport, ManualFrameScheduler, ViewportSize};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        model::AppId,
        window_manager::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH},
    };

    struct Harness {
        store: WindowStore,
        frames: ManualFrameScheduler,
        controller: InteractionController,
    }

    fn harness() -> Harness {
        let frames = ManualFrameScheduler::default();
        Harness {
            store: WindowStore::new(Rc::new(FixedViewport::new(ViewportSize::new(1920, 1080)))),
            controller: InteractionController::new(Rc::new(frames.clone())),
            frames,
        }
    }

    fn place(store: &mut WindowStore, window_id: &WindowId, bounds: WindowBounds) {
        store.update_window(window_id, WindowPatch::bounds(bounds));
    }

    #[test]
    fn drag_commits_translated_bounds_on_release() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        place(&mut h.store, &a, WindowBounds::new(100, 100, 800, 600));

        assert!(h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 150, 120)
        ));
        h.controller.pointer_move(PointerSample::new(1, 250, 170));

        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(100, 100, 800, 600)
        );

        h.frames.run_frame();
        assert_eq!(
            h.controller.draft_bounds(&a),
            Some(WindowBounds::new(200, 150, 800, 600))
        );

        assert_eq!(
            h.controller.pointer_up(&mut h.store, PointerSample::new(1, 250, 170)),
            Some(a.clone())
        );
        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(200, 150, 800, 600)
        );
        assert_eq!(h.controller.active_gesture_count(), 0);
    }

    #[test]
    fn south_east_resize_grows_size() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        place(&mut h.store, &a, WindowBounds::new(100, 100, 800, 600));

        h.controller.begin_resize(
            &mut h.store,
            &a,
            ResizeEdge::SouthEast,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 900, 700),
        );
        h.controller.pointer_move(PointerSample::new(1, 950, 740));
        h.controller.pointer_up(&mut h.store, PointerSample::new(1, 950, 740));

        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(100, 100, 850, 640)
        );
    }

    #[test]
    fn west_resize_past_floor_moves_origin_but_holds_width() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        place(&mut h.store, &a, WindowBounds::new(100, 100, 400, 300));

        h.controller.begin_resize(
            &mut h.store,
            &a,
            ResizeEdge::West,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 100, 200),
        );
        h.controller.pointer_move(PointerSample::new(1, 400, 200));
        h.controller.pointer_up(&mut h.store, PointerSample::new(1, 400, 200));

        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(400, 100, MIN_WINDOW_WIDTH, 300)
        );
    }

    #[test]
    fn resize_never_commits_below_floor() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");

        h.controller.begin_resize(
            &mut h.store,
            &a,
            ResizeEdge::NorthWest,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.pointer_move(PointerSample::new(1, 5000, 5000));
        h.controller.pointer_up(&mut h.store, PointerSample::new(1, 5000, 5000));

        let bounds = h.store.get_window(&a).expect("a").bounds();
        assert_eq!((bounds.width, bounds.height), (MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT));
    }

    #[test]
    fn gestures_are_ignored_for_maximized_closing_and_secondary_buttons() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        let b = h.store.create_window(AppId::Browser, "Browser");
        let c = h.store.create_window(AppId::Settings, "Settings");
        h.store.maximize_window(&a);
        h.store.request_close_window(&b);

        let down = PointerSample::new(1, 10, 10);
        assert!(!h
            .controller
            .begin_drag(&mut h.store, &a, PRIMARY_POINTER_BUTTON, down));
        assert!(!h
            .controller
            .begin_drag(&mut h.store, &b, PRIMARY_POINTER_BUTTON, down));
        assert!(!h.controller.begin_drag(&mut h.store, &c, 2, down));
        assert!(!h.controller.begin_drag(
            &mut h.store,
            &WindowId::from("ghost"),
            PRIMARY_POINTER_BUTTON,
            down
        ));
        assert_eq!(h.controller.active_gesture_count(), 0);
    }

    #[test]
    fn begin_focuses_the_window() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        h.store.create_window(AppId::Browser, "Browser");

        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );

        assert_eq!(
            h.store.get_focused_window().map(|window| window.id.clone()),
            Some(a)
        );
    }

    #[test]
    fn many_moves_coalesce_into_one_flush() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        let flushes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&flushes);
        let _subscription = h
            .controller
            .subscribe_drafts(move |updates| sink.borrow_mut().push(updates.to_vec()));

        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        for step in 1..=10 {
            h.controller.pointer_move(PointerSample::new(1, step, step));
        }

        assert_eq!(h.frames.pending_count(), 1);
        assert_eq!(h.frames.run_frame(), 1);
        assert_eq!(
            *flushes.borrow(),
            vec![vec![DraftUpdate {
                window_id: a.clone(),
                bounds: Some(WindowBounds::new(110, 110, 800, 600)),
            }]]
        );
        assert!(!h.controller.has_pending_frame());
    }

    #[test]
    fn simultaneous_gestures_are_isolated_by_pointer_id() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        let b = h.store.create_window(AppId::Browser, "Browser");
        place(&mut h.store, &a, WindowBounds::new(0, 0, 400, 300));
        place(&mut h.store, &b, WindowBounds::new(500, 0, 400, 300));

        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.begin_resize(
            &mut h.store,
            &b,
            ResizeEdge::East,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(2, 900, 100),
        );
        h.controller.pointer_move(PointerSample::new(1, 30, 40));
        h.controller.pointer_move(PointerSample::new(2, 950, 100));
        assert!(!h.controller.pointer_move(PointerSample::new(3, 999, 999)));
        h.frames.run_frame();

        assert_eq!(
            h.controller.draft_bounds(&a),
            Some(WindowBounds::new(30, 40, 400, 300))
        );
        assert_eq!(
            h.controller.draft_bounds(&b),
            Some(WindowBounds::new(500, 0, 450, 300))
        );

        assert_eq!(
            h.controller.pointer_up(&mut h.store, PointerSample::new(2, 0, 0)),
            Some(b.clone())
        );
        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(0, 0, 400, 300)
        );
        assert_eq!(
            h.store.get_window(&b).expect("b").bounds(),
            WindowBounds::new(500, 0, 450, 300)
        );
        assert_eq!(h.controller.active_gesture_count(), 1);
    }

    #[test]
    fn pointer_up_with_unknown_id_is_ignored() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );

        assert_eq!(
            h.controller.pointer_up(&mut h.store, PointerSample::new(9, 0, 0)),
            None
        );
        assert_eq!(h.controller.active_gesture_count(), 1);
    }

    #[test]
    fn last_release_cancels_the_pending_frame() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.pointer_move(PointerSample::new(1, 5, 5));
        assert_eq!(h.frames.pending_count(), 1);

        h.controller.pointer_up(&mut h.store, PointerSample::new(1, 5, 5));

        assert_eq!(h.frames.pending_count(), 0);
        assert!(!h.controller.has_pending_frame());
    }

    #[test]
    fn release_window_drops_gesture_without_committing() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        let before = h.store.get_window(&a).expect("a").bounds();
        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.pointer_move(PointerSample::new(1, 300, 300));

        assert!(h.controller.release_window(&a));
        h.frames.run_frame();

        assert_eq!(h.store.get_window(&a).expect("a").bounds(), before);
        assert_eq!(
            h.controller.display_bounds(h.store.get_window(&a).expect("a")),
            before
        );
    }

    #[test]
    fn new_gesture_on_same_window_replaces_previous_one() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.begin_resize(
            &mut h.store,
            &a,
            ResizeEdge::South,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(2, 0, 0),
        );

        assert_eq!(h.controller.active_gesture_count(), 1);
        assert_eq!(
            h.controller.gesture_kind(&a),
            Some(GestureKind::Resize(ResizeEdge::South))
        );
        assert!(!h.controller.pointer_move(PointerSample::new(1, 10, 10)));
    }

    #[test]
    fn reusing_a_pointer_on_another_window_clears_the_old_draft() {
        let mut h = harness();
        let a = h.store.create_window(AppId::Terminal, "Terminal");
        let b = h.store.create_window(AppId::Browser, "Browser");
        place(&mut h.store, &a, WindowBounds::new(100, 100, 800, 600));
        let drafts = Rc::new(RefCell::new(HashMap::new()));
        let sink = Rc::clone(&drafts);
        let _subscription = h.controller.subscribe_drafts(move |updates| {
            let mut drafts = sink.borrow_mut();
            for update in updates {
                match update.bounds {
                    Some(bounds) => {
                        drafts.insert(update.window_id.clone(), bounds);
                    }
                    None => {
                        drafts.remove(&update.window_id);
                    }
                }
            }
        });

        h.controller.begin_drag(
            &mut h.store,
            &a,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        h.controller.pointer_move(PointerSample::new(1, 300, 300));
        h.frames.run_frame();
        assert_eq!(
            drafts.borrow().get(&a),
            Some(&WindowBounds::new(400, 400, 800, 600))
        );

        h.controller.begin_drag(
            &mut h.store,
            &b,
            PRIMARY_POINTER_BUTTON,
            PointerSample::new(1, 0, 0),
        );
        assert_eq!(drafts.borrow().get(&a), None);
        assert_eq!(h.controller.draft_bounds(&a), None);

        h.controller.pointer_up(&mut h.store, PointerSample::new(1, 0, 0));
        assert!(drafts.borrow().is_empty());
        assert_eq!(
            h.store.get_window(&a).expect("a").bounds(),
            WindowBounds::new(100, 100, 800, 600)
        );
    }
}
