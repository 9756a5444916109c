//! Scoped change-notification plumbing shared by the stores and the interaction controller.

use std::{cell::RefCell, fmt, rc::Rc};

struct ListenerList<F: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Rc<F>)>,
}

/// Listener registry. `F` is the listener signature, for example `dyn Fn(&DesktopSettings)`.
pub(crate) struct Subscribers<F: ?Sized> {
    inner: Rc<RefCell<ListenerList<F>>>,
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerList {
                next_id: 1,
                entries: Vec::new(),
            })),
        }
    }
}

impl<F: ?Sized> Clone for Subscribers<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<F: ?Sized + 'static> Subscribers<F> {
    pub(crate) fn add(&self, listener: Rc<F>) -> Subscription {
        let id = {
            let mut list = self.inner.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, listener));
            id
        };
        let list = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(list) = list.upgrade() {
                list.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Current listeners, cloned so callbacks may subscribe or unsubscribe while being notified.
    pub(crate) fn listeners(&self) -> Vec<Rc<F>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keeps the listener registered for as long as its source lives.
    pub fn keep(mut self) {
        self.unsubscribe = None;
    }

    /// Unsubscribes now. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
