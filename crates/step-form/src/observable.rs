//! Ordered listener registry with idempotent unsubscribe handles.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub type Listener<T> = Rc<dyn Fn(&T)>;

/// Called after the listener set grows or shrinks, with the new count.
pub trait SubscriptionHooks {
    fn on_subscribe(&self, _listener_count: usize) {}
    fn on_unsubscribe(&self, _listener_count: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SubscriptionHooks for NoHooks {}

struct Registry<T, H> {
    next_listener_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Listener<T>>>,
    hooks: H,
}

impl<T, H: SubscriptionHooks> Registry<T, H> {
    fn remove(&self, id: u64) {
        let removed = self.listeners.borrow_mut().remove(&id);
        if removed.is_some() {
            let count = self.listeners.borrow().len();
            self.hooks.on_unsubscribe(count);
        }
    }
}

/// Handle returned by `subscribe`. Calling it more than once, or on a clone,
/// does nothing after the first call.
#[derive(Clone)]
pub struct Unsubscribe {
    remove: Rc<dyn Fn()>,
}

impl Unsubscribe {
    fn new(remove: impl Fn() + 'static) -> Self {
        Self {
            remove: Rc::new(remove),
        }
    }

    pub fn unsubscribe(&self) {
        (self.remove)()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unsubscribe")
    }
}

/// A set of listeners notified synchronously in registration order.
///
/// Listeners may subscribe or unsubscribe while being notified; a
/// notification pass always runs over the set as it was when it started.
pub struct Subscribable<T: 'static, H: SubscriptionHooks + 'static = NoHooks> {
    registry: Rc<Registry<T, H>>,
}

impl<T: 'static> Subscribable<T, NoHooks> {
    pub fn new() -> Self {
        Self::with_hooks(NoHooks)
    }
}

impl<T: 'static> Default for Subscribable<T, NoHooks> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static, H: SubscriptionHooks + 'static> Subscribable<T, H> {
    pub fn with_hooks(hooks: H) -> Self {
        Self {
            registry: Rc::new(Registry {
                next_listener_id: Cell::new(1),
                listeners: RefCell::new(BTreeMap::new()),
                hooks,
            }),
        }
    }

    /// Register `listener`. Registering the same `Rc` again returns a handle
    /// for the existing registration.
    pub fn subscribe(&self, listener: Listener<T>) -> Unsubscribe {
        let existing = self
            .registry
            .listeners
            .borrow()
            .iter()
            .find(|(_, registered)| Rc::ptr_eq(registered, &listener))
            .map(|(id, _)| *id);
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.registry.next_listener_id.get();
                self.registry.next_listener_id.set(id + 1);
                let count = {
                    let mut listeners = self.registry.listeners.borrow_mut();
                    listeners.insert(id, listener);
                    listeners.len()
                };
                self.registry.hooks.on_subscribe(count);
                id
            }
        };
        let registry: Weak<Registry<T, H>> = Rc::downgrade(&self.registry);
        Unsubscribe::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }

    pub fn notify(&self, snapshot: &T) {
        let listeners: Vec<Listener<T>> = self.registry.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.registry.listeners.borrow().is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listeners.borrow().len()
    }

    /// Drop every listener without running the hooks.
    pub fn clear(&self) {
        self.registry.listeners.borrow_mut().clear();
    }

    pub fn hooks(&self) -> &H {
        &self.registry.hooks
    }
}

impl<T: 'static, H: SubscriptionHooks + 'static> fmt::Debug for Subscribable<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribable")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Listener<u32> {
        let log = Rc::clone(log);
        Rc::new(move |value: &u32| log.borrow_mut().push(format!("{name}:{value}")))
    }

    #[test]
    fn test_notify_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subject = Subscribable::<u32>::new();
        subject.subscribe(recorder(&log, "a"));
        subject.subscribe(recorder(&log, "b"));
        subject.subscribe(recorder(&log, "c"));
        subject.notify(&7);
        assert_eq!(*log.borrow(), vec!["a:7", "b:7", "c:7"]);
    }

    #[test]
    fn test_same_listener_registered_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subject = Subscribable::<u32>::new();
        let listener = recorder(&log, "a");
        let first = subject.subscribe(Rc::clone(&listener));
        let second = subject.subscribe(listener);
        assert_eq!(subject.listener_count(), 1);
        subject.notify(&1);
        assert_eq!(log.borrow().len(), 1);
        second.unsubscribe();
        assert!(!subject.has_listeners());
        first.unsubscribe();
    }

    #[test]
    fn test_double_unsubscribe_is_noop() {
        struct Counting(Rc<RefCell<Vec<usize>>>);
        impl SubscriptionHooks for Counting {
            fn on_unsubscribe(&self, count: usize) {
                self.0.borrow_mut().push(count);
            }
        }
        let calls = Rc::new(RefCell::new(Vec::new()));
        let subject = Subscribable::<u32, _>::with_hooks(Counting(Rc::clone(&calls)));
        let a = subject.subscribe(Rc::new(|_: &u32| {}));
        let b = subject.subscribe(Rc::new(|_: &u32| {}));
        a.unsubscribe();
        a.clone().unsubscribe();
        a.unsubscribe();
        assert_eq!(subject.listener_count(), 1);
        b.unsubscribe();
        assert_eq!(*calls.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_unsubscribe_during_notify() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let subject = Rc::new(Subscribable::<u32>::new());
        let handle: Rc<RefCell<Option<Unsubscribe>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&handle);
        let inner_log = Rc::clone(&log);
        let h = subject.subscribe(Rc::new(move |value: &u32| {
            inner_log.borrow_mut().push(format!("once:{value}"));
            if let Some(h) = inner.borrow().as_ref() {
                h.unsubscribe();
            }
        }));
        *handle.borrow_mut() = Some(h);
        subject.subscribe(recorder(&log, "b"));
        subject.notify(&1);
        subject.notify(&2);
        assert_eq!(*log.borrow(), vec!["once:1", "b:1", "b:2"]);
    }

    #[test]
    fn test_handle_outlives_subject() {
        let subject = Subscribable::<u32>::new();
        let handle = subject.subscribe(Rc::new(|_: &u32| {}));
        drop(subject);
        handle.unsubscribe();
    }
}
