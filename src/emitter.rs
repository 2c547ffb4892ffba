//! Emitter - A multicast push source that is invoked like a callback.
//!
//! The emitter plays the role a "function-subject" plays in prototype-based
//! stream libraries: something you can hand out as an event callback that is,
//! at the same time, a live stream source. Here that duck-typing trick becomes
//! a small struct with a subscriber registry and an explicit [`Emitter::invoke`].
//!
//! Semantics are standard push-stream multicast:
//!
//! - Invoking with zero subscribers is a silent no-op (no buffering, no error).
//! - Every current subscriber receives every value invoked after it subscribed,
//!   in registration order.
//! - Disposing a subscription never affects the emitter itself; it stays
//!   invokable after every subscriber has gone.
//!
//! Clones share the same registry, so the emitter can be captured in a transform
//! closure and embedded in derived props as a stable callback reference.
//! Equality is identity equality for the same reason.
//!
//! # Example
//!
//! ```ignore
//! use stream_props::Emitter;
//!
//! let increment = Emitter::new();
//! let count = increment.stream().scan(0, |total, _: &()| total + 1);
//!
//! let sub = count.subscribe(|n| println!("count = {n}"));
//! increment.invoke(());
//! increment.invoke(());
//! sub.dispose();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::stream::Stream;
use crate::subscription::Subscription;

// =============================================================================
// Subscriber Registry
// =============================================================================

/// Observer callback stored in the registry.
type Observer<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    subscribers: Vec<(usize, Observer<T>)>,
    next_id: usize,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// =============================================================================
// Emitter
// =============================================================================

/// Invokable multicast push source.
pub struct Emitter<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Emitter<T> {
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::new())),
        }
    }

    /// Push a value to every current subscriber.
    ///
    /// The registry is snapshotted before delivery, so an observer may dispose
    /// its own (or any other) subscription mid-delivery without invalidating
    /// the iteration. With zero subscribers this is a no-op.
    pub fn invoke(&self, value: T) {
        let snapshot: Vec<Observer<T>> = self
            .registry
            .borrow()
            .subscribers
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();

        for observer in snapshot {
            observer(&value);
        }
    }

    /// Register an observer. The returned subscription removes it.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id();
            registry.subscribers.push((id, Rc::new(observer)));
            id
        };

        let registry = Rc::clone(&self.registry);
        Subscription::new(move || {
            registry
                .borrow_mut()
                .subscribers
                .retain(|(observer_id, _)| *observer_id != id);
        })
    }

    /// View this emitter as a composable [`Stream`].
    ///
    /// Subscribing to the stream registers directly on the emitter, so all
    /// stream operators apply to values invoked after subscription.
    pub fn stream(&self) -> Stream<T> {
        let emitter = self.clone();
        Stream::from_source(move |observer| emitter.subscribe(move |value| observer(value)))
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

/// Identity equality: two emitters are equal when they share a registry.
///
/// This lets an emitter live inside `PartialEq` render state the way a stable
/// callback reference would, without defeating the update-skip comparison.
impl<T> PartialEq for Emitter<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.registry.borrow().subscribers.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
