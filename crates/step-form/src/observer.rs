//! Lazily attached observer over a schema.
//!
//! The observer only subscribes to its schema while it has listeners of its
//! own, and can be pointed at a different schema without its listeners
//! resubscribing.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::observable::{Listener, Subscribable, SubscriptionHooks, Unsubscribe};
use crate::schema::MultiStepFormSchema;

struct ObserverInner {
    schema: RefCell<MultiStepFormSchema>,
    upstream: RefCell<Option<Unsubscribe>>,
    subscribers: Subscribable<MultiStepFormSchema, AttachOnDemand>,
}

struct AttachOnDemand {
    observer: Weak<ObserverInner>,
}

impl SubscriptionHooks for AttachOnDemand {
    fn on_subscribe(&self, listener_count: usize) {
        if listener_count == 1 {
            if let Some(inner) = self.observer.upgrade() {
                inner.attach();
            }
        }
    }

    fn on_unsubscribe(&self, listener_count: usize) {
        if listener_count == 0 {
            if let Some(inner) = self.observer.upgrade() {
                inner.detach();
            }
        }
    }
}

impl ObserverInner {
    fn attach(self: &Rc<Self>) {
        if self.upstream.borrow().is_some() {
            return;
        }
        let observer = Rc::downgrade(self);
        let schema = self.schema.borrow().clone();
        let handle = schema.subscribe_fn(move |schema| {
            if let Some(inner) = observer.upgrade() {
                inner.subscribers.notify(schema);
            }
        });
        *self.upstream.borrow_mut() = Some(handle);
        tracing::trace!("observer attached");
    }

    fn detach(&self) {
        let handle = self.upstream.borrow_mut().take();
        if let Some(handle) = handle {
            handle.unsubscribe();
            tracing::trace!("observer detached");
        }
    }
}

impl Drop for ObserverInner {
    fn drop(&mut self) {
        if let Some(handle) = self.upstream.get_mut().take() {
            handle.unsubscribe();
        }
    }
}

#[derive(Clone)]
pub struct MultiStepFormObserver {
    inner: Rc<ObserverInner>,
}

impl MultiStepFormObserver {
    pub fn new(schema: MultiStepFormSchema) -> Self {
        let inner = Rc::new_cyclic(|observer| ObserverInner {
            schema: RefCell::new(schema),
            upstream: RefCell::new(None),
            subscribers: Subscribable::with_hooks(AttachOnDemand {
                observer: observer.clone(),
            }),
        });
        Self { inner }
    }

    pub fn subscribe(&self, listener: Listener<MultiStepFormSchema>) -> Unsubscribe {
        self.inner.subscribers.subscribe(listener)
    }

    pub fn subscribe_fn(&self, listener: impl Fn(&MultiStepFormSchema) + 'static) -> Unsubscribe {
        self.subscribe(Rc::new(listener))
    }

    pub fn has_listeners(&self) -> bool {
        self.inner.subscribers.has_listeners()
    }

    /// Whether the observer is currently subscribed to its schema.
    pub fn is_attached(&self) -> bool {
        self.inner.upstream.borrow().is_some()
    }

    pub fn get_snapshot(&self) -> MultiStepFormObserver {
        self.clone()
    }

    pub fn get_result(&self) -> MultiStepFormSchema {
        self.inner.schema.borrow().clone()
    }

    /// Observe `schema` instead. Listeners are notified when it differs from
    /// the current one.
    pub fn set_schema(&self, schema: MultiStepFormSchema) {
        if self.inner.schema.borrow().ptr_eq(&schema) {
            return;
        }
        self.inner.detach();
        *self.inner.schema.borrow_mut() = schema.clone();
        if self.inner.subscribers.has_listeners() {
            self.inner.attach();
        }
        self.inner.subscribers.notify(&schema);
    }

    /// Detach and drop every listener.
    pub fn destroy(&self) {
        self.inner.detach();
        self.inner.subscribers.clear();
    }
}

impl fmt::Debug for MultiStepFormObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiStepFormObserver")
            .field("attached", &self.is_attached())
            .field("listeners", &self.inner.subscribers.listener_count())
            .finish()
    }
}
