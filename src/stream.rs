//! Stream - Composable push-based value sequences.
//!
//! A [`Stream`] is a subscribe function: handing it an observer wires the
//! observer to a live source and returns the [`Subscription`] that unwires it.
//! Operators compose by wrapping that subscribe function, so all operator state
//! (scan accumulators, combine latches, skip counters) is created fresh per
//! subscription while the underlying sources stay hot and shared.
//!
//! Everything here is synchronous and single-threaded: a value pushed into the
//! source reaches every downstream observer before the push returns. No operator
//! defers, buffers, or replays (except [`Stream::start_with`], which delivers its
//! initial value synchronously at subscribe time).
//!
//! # Example
//!
//! ```ignore
//! use stream_props::Emitter;
//!
//! let increment = Emitter::new();
//! let count = increment
//!     .stream()
//!     .scan(0, |total, _: &()| total + 1)
//!     .start_with(0);
//!
//! let sub = count.subscribe(|n| println!("count = {n}"));
//! increment.invoke(()); // count = 1
//! increment.invoke(()); // count = 2
//! sub.dispose();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::subscription::Subscription;

/// Observer handed to a stream source.
pub type Observer<T> = Rc<dyn Fn(&T)>;

// =============================================================================
// Stream
// =============================================================================

/// A composable push-based sequence of values.
pub struct Stream<T> {
    source: Rc<dyn Fn(Observer<T>) -> Subscription>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T: 'static> Stream<T> {
    /// Build a stream from a subscribe function.
    ///
    /// The function is called once per subscription and must return the
    /// subscription that detaches the given observer.
    pub fn from_source(source: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    /// Attach an observer. Synchronous emissions (e.g. from `start_with`)
    /// are delivered before this call returns.
    pub fn subscribe(&self, observer: impl Fn(&T) + 'static) -> Subscription {
        (self.source)(Rc::new(observer))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// Transform each value.
    pub fn map<U: 'static>(&self, transform: impl Fn(&T) -> U + 'static) -> Stream<U> {
        let source = self.clone();
        let transform = Rc::new(transform);
        Stream::from_source(move |observer| {
            let transform = Rc::clone(&transform);
            source.subscribe(move |value| observer(&transform(value)))
        })
    }

    /// Drop values the predicate rejects.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Stream::from_source(move |observer| {
            let predicate = Rc::clone(&predicate);
            source.subscribe(move |value| {
                if predicate(value) {
                    observer(value);
                }
            })
        })
    }

    /// Prefix with an initial value, delivered synchronously to each new
    /// subscriber before any source value.
    pub fn start_with(&self, initial: T) -> Stream<T>
    where
        T: Clone,
    {
        let source = self.clone();
        Stream::from_source(move |observer| {
            observer(&initial);
            source.subscribe(move |value| observer(value))
        })
    }

    /// Accumulate state across values, emitting each step's result.
    ///
    /// The seed itself is not emitted; combine with [`Stream::start_with`]
    /// when the accumulator's starting point should render.
    pub fn scan<A: Clone + 'static>(
        &self,
        seed: A,
        step: impl Fn(&A, &T) -> A + 'static,
    ) -> Stream<A> {
        let source = self.clone();
        let step = Rc::new(step);
        Stream::from_source(move |observer| {
            let step = Rc::clone(&step);
            let accumulator = RefCell::new(seed.clone());
            source.subscribe(move |value| {
                let next = step(&accumulator.borrow(), value);
                *accumulator.borrow_mut() = next.clone();
                observer(&next);
            })
        })
    }

    /// Skip the first `count` values of each subscription.
    pub fn skip(&self, count: usize) -> Stream<T> {
        let source = self.clone();
        Stream::from_source(move |observer| {
            let remaining = Cell::new(count);
            source.subscribe(move |value| {
                if remaining.get() > 0 {
                    remaining.set(remaining.get() - 1);
                } else {
                    observer(value);
                }
            })
        })
    }

    /// Pair the latest values of two streams.
    ///
    /// Emits on every emission of either side once both sides have latched a
    /// value. The latches are cleared per subscription, not shared.
    pub fn combine_latest<U: Clone + 'static, V: 'static>(
        &self,
        other: &Stream<U>,
        combine: impl Fn(&T, &U) -> V + 'static,
    ) -> Stream<V>
    where
        T: Clone,
    {
        let left = self.clone();
        let right = other.clone();
        let combine = Rc::new(combine);
        Stream::from_source(move |observer| {
            let latest_left: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
            let latest_right: Rc<RefCell<Option<U>>> = Rc::new(RefCell::new(None));

            let left_sub = {
                let latest_left = Rc::clone(&latest_left);
                let latest_right = Rc::clone(&latest_right);
                let combine = Rc::clone(&combine);
                let observer = Rc::clone(&observer);
                left.subscribe(move |value| {
                    *latest_left.borrow_mut() = Some(value.clone());
                    // Drop the latch borrow before notifying, in case the
                    // observer feeds back into this stream synchronously.
                    let combined = latest_right.borrow().as_ref().map(|r| combine(value, r));
                    if let Some(out) = combined {
                        observer(&out);
                    }
                })
            };

            let right_sub = {
                let latest_left = Rc::clone(&latest_left);
                let latest_right = Rc::clone(&latest_right);
                let combine = Rc::clone(&combine);
                right.subscribe(move |value| {
                    *latest_right.borrow_mut() = Some(value.clone());
                    let combined = latest_left.borrow().as_ref().map(|l| combine(l, value));
                    if let Some(out) = combined {
                        observer(&out);
                    }
                })
            };

            Subscription::join(left_sub, right_sub)
        })
    }

    /// Interleave two streams of the same type.
    pub fn merge(&self, other: &Stream<T>) -> Stream<T> {
        let left = self.clone();
        let right = other.clone();
        Stream::from_source(move |observer| {
            let left_sub = {
                let observer = Rc::clone(&observer);
                left.subscribe(move |value| observer(value))
            };
            let right_sub = right.subscribe(move |value| observer(value));
            Subscription::join(left_sub, right_sub)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
