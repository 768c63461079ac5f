//! Observer registry with disposable subscriptions.
//!
//! Dropping a [`Subscription`] detaches its callback, so a listener cannot
//! outlive the scope that acquired it, including early returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// Single-threaded publisher of `E` events.
pub struct Observers<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it stays registered until the handle is disposed or dropped.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let callback: Callback<E> = Rc::new(RefCell::new(callback));
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, callback));
            id
        };
        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .borrow_mut()
                        .entries
                        .retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    /// Deliver `event` to every listener registered when publishing starts.
    ///
    /// Listeners may subscribe or unsubscribe from inside a callback. A
    /// listener detached mid-publish is skipped; one that publishes re-entrantly
    /// does not receive its own nested event. Returns the number of listeners
    /// that were invoked.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<(u64, Callback<E>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();
        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.is_registered(id) {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)(event);
                delivered += 1;
            }
        }
        delivered
    }

    fn is_registered(&self, id: u64) -> bool {
        self.registry
            .borrow()
            .entries
            .iter()
            .any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Observers::subscribe`].
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn dispose(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn dispose_detaches_listener() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let subscription = observers.subscribe(move |value| counter.set(counter.get() + value));

        assert_eq!(observers.publish(&2), 1);
        subscription.dispose();
        assert_eq!(observers.publish(&5), 0);
        assert_eq!(seen.get(), 2);
        assert!(observers.is_empty());
    }

    #[test]
    fn drop_on_early_return_detaches() {
        fn scoped(observers: &Observers<()>, bail: bool) -> Option<()> {
            let _subscription = observers.subscribe(|_| {});
            if bail {
                return None;
            }
            Some(())
        }

        let observers = Observers::new();
        assert!(scoped(&observers, true).is_none());
        assert!(observers.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let subscription = {
            let observers = Observers::<()>::new();
            observers.subscribe(|_| {})
        };
        drop(subscription);
    }

    #[test]
    fn listener_removed_during_publish_is_skipped() {
        let observers = Observers::<()>::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let slot = Rc::clone(&victim);
        let _killer = observers.subscribe(move |_| {
            slot.borrow_mut().take();
        });
        let counter = Rc::clone(&calls);
        *victim.borrow_mut() = Some(observers.subscribe(move |_| counter.set(counter.get() + 1)));

        assert_eq!(observers.publish(&()), 1);
        assert_eq!(calls.get(), 0);
        assert_eq!(observers.len(), 1);
    }
}
