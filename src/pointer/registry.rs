use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use glam::Vec2;

use crate::pointer::state::{PointerHandlers, PointerState, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notify {
    Enter,
    Move,
    Click,
    Leave,
}

struct Entry {
    bounds: Rect,
    state: PointerState,
    handlers: PointerHandlers,
}

#[derive(Default)]
struct RegistryInner {
    entries: BTreeMap<u64, Entry>,
    next_id: u64,
    pointer: Vec2,
    listening: bool,
}

/// Tracks pointer and touch interaction for every registered region of a window.
///
/// All regions share the last known pointer position. The registry only listens
/// to input while at least one region is registered; the application shell checks
/// [`PointerRegistry::is_listening`] before forwarding events.
///
/// Handlers run with no borrow held, so they may register or dispose regions
/// (their own included) while a dispatch is in progress.
#[derive(Clone, Default)]
pub struct PointerRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl PointerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, bounds: Rect, handlers: PointerHandlers) -> PointerHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.insert(
            id,
            Entry {
                bounds,
                state: PointerState::default(),
                handlers,
            },
        );

        if !inner.listening {
            log::debug!("Attaching pointer listeners");
            inner.listening = true;
        }

        PointerHandle {
            id,
            registry: Rc::downgrade(&self.inner),
            disposed: false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.inner.borrow().listening
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pointer_position(&self) -> Vec2 {
        self.inner.borrow().pointer
    }

    pub fn pointer_moved(&self, position: Vec2) {
        self.inner.borrow_mut().pointer = position;
        self.dispatch(|pointer, entry, pending| {
            if entry.bounds.contains(pointer) {
                entry.state.track(pointer, &entry.bounds);
                if !entry.state.hover {
                    entry.state.hover = true;
                    pending.push(Notify::Enter);
                }
                pending.push(Notify::Move);
            } else if entry.state.hover && !entry.state.touching {
                entry.state.hover = false;
                pending.push(Notify::Leave);
            }
        });
    }

    /// The pointer left the window entirely.
    pub fn pointer_left(&self) {
        self.dispatch(|_, entry, pending| {
            if entry.state.hover {
                entry.state.hover = false;
                pending.push(Notify::Leave);
            }
        });
    }

    pub fn clicked(&self, position: Vec2) {
        self.inner.borrow_mut().pointer = position;
        self.dispatch(|pointer, entry, pending| {
            entry.state.track(pointer, &entry.bounds);
            if entry.bounds.contains(pointer) {
                pending.push(Notify::Click);
            }
        });
    }

    pub fn touch_started(&self, position: Vec2) {
        self.inner.borrow_mut().pointer = position;
        self.dispatch(|pointer, entry, pending| {
            if entry.bounds.contains(pointer) {
                entry.state.touching = true;
                entry.state.track(pointer, &entry.bounds);
                if !entry.state.hover {
                    entry.state.hover = true;
                    pending.push(Notify::Enter);
                }
                pending.push(Notify::Move);
            }
        });
    }

    pub fn touch_moved(&self, position: Vec2) {
        self.inner.borrow_mut().pointer = position;
        self.dispatch(|pointer, entry, pending| {
            entry.state.track(pointer, &entry.bounds);
            if entry.bounds.contains(pointer) {
                if !entry.state.hover {
                    entry.state.hover = true;
                    entry.state.touching = true;
                    pending.push(Notify::Enter);
                }
                pending.push(Notify::Move);
            } else if entry.state.hover && entry.state.touching {
                // A held touch keeps steering after sliding off the region
                pending.push(Notify::Move);
            }
        });
    }

    /// Touch ended or was cancelled.
    pub fn touch_ended(&self) {
        self.dispatch(|_, entry, pending| {
            if entry.state.touching {
                entry.state.touching = false;
                if entry.state.hover {
                    entry.state.hover = false;
                    pending.push(Notify::Leave);
                }
            }
        });
    }

    fn dispatch(&self, mut visit: impl FnMut(Vec2, &mut Entry, &mut Vec<Notify>)) {
        let ids: Vec<u64> = self.inner.borrow().entries.keys().copied().collect();
        let mut pending = Vec::with_capacity(2);

        for id in ids {
            let (state, mut handlers) = {
                let mut guard = self.inner.borrow_mut();
                let inner = &mut *guard;
                let Some(entry) = inner.entries.get_mut(&id) else {
                    // Disposed by an earlier handler in this dispatch
                    continue;
                };

                pending.clear();
                visit(inner.pointer, entry, &mut pending);
                if pending.is_empty() {
                    continue;
                }
                (entry.state, std::mem::take(&mut entry.handlers))
            };

            for notify in &pending {
                fire(&mut handlers, *notify, &state);
            }

            if let Some(entry) = self.inner.borrow_mut().entries.get_mut(&id) {
                entry.handlers = handlers;
            }
        }
    }
}

fn fire(handlers: &mut PointerHandlers, notify: Notify, state: &PointerState) {
    let callback = match notify {
        Notify::Enter => handlers.on_enter.as_mut(),
        Notify::Move => handlers.on_move.as_mut(),
        Notify::Click => handlers.on_click.as_mut(),
        Notify::Leave => handlers.on_leave.as_mut(),
    };
    if let Some(callback) = callback {
        callback(state);
    }
}

/// Registration of one region. Disposing (or dropping) it removes the region.
pub struct PointerHandle {
    id: u64,
    registry: Weak<RefCell<RegistryInner>>,
    disposed: bool,
}

impl PointerHandle {
    pub fn set_bounds(&self, bounds: Rect) {
        if let Some(inner) = self.registry.upgrade() {
            if let Some(entry) = inner.borrow_mut().entries.get_mut(&self.id) {
                entry.bounds = bounds;
            }
        }
    }

    pub fn state(&self) -> Option<PointerState> {
        let inner = self.registry.upgrade()?;
        let inner = inner.borrow();
        inner.entries.get(&self.id).map(|entry| entry.state)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let Some(inner) = self.registry.upgrade() else {
            return;
        };

        // Drop the entry after releasing the borrow; its handlers may own other handles
        let removed = {
            let mut inner = inner.borrow_mut();
            let removed = inner.entries.remove(&self.id);
            if inner.entries.is_empty() && inner.listening {
                log::debug!("Detaching pointer listeners");
                inner.listening = false;
            }
            removed
        };
        drop(removed);
    }
}

impl Drop for PointerHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listening_follows_registration_count() {
        let registry = PointerRegistry::new();
        assert!(!registry.is_listening());

        let mut a = registry.register(Rect::from_size(10.0, 10.0), PointerHandlers::new());
        let mut b = registry.register(Rect::from_size(10.0, 10.0), PointerHandlers::new());
        assert!(registry.is_listening());

        a.dispose();
        assert!(registry.is_listening());
        b.dispose();
        assert!(!registry.is_listening());
        assert!(registry.is_empty());
    }

    #[test]
    fn dropping_a_handle_unregisters() {
        let registry = PointerRegistry::new();
        {
            let _handle = registry.register(Rect::from_size(10.0, 10.0), PointerHandlers::new());
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
        assert!(!registry.is_listening());
    }

    #[test]
    fn handle_outlives_registry() {
        let registry = PointerRegistry::new();
        let mut handle = registry.register(Rect::from_size(10.0, 10.0), PointerHandlers::new());
        drop(registry);
        assert!(handle.state().is_none());
        handle.dispose();
        assert!(handle.is_disposed());
    }
}
