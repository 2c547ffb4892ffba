//! Subscription - The live link between a stream and an observer.
//!
//! Every `subscribe` call returns a [`Subscription`]. Disposing it removes the
//! observer from the source; dropping an undisposed subscription does the same,
//! so a subscription held in a struct field is released when the struct goes away.
//!
//! Disposal runs exactly once. `dispose()` consumes the subscription, and the
//! drop path only fires if the cancel closure is still present.
//!
//! # Example
//!
//! ```ignore
//! use stream_props::Emitter;
//!
//! let clicks = Emitter::new();
//! let sub = clicks.subscribe(|_: &()| println!("click"));
//!
//! clicks.invoke(()); // delivered
//! sub.dispose();
//! clicks.invoke(()); // not delivered, emitter still fine
//! ```

// =============================================================================
// Subscription
// =============================================================================

/// Handle to an active observer registration.
///
/// Cancels on `dispose()` or on drop, whichever comes first.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancel closure. The closure runs at most once.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that does nothing when disposed.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Compose two subscriptions into one that disposes both.
    ///
    /// Used by pairwise operators (combine, merge) that subscribe upstream twice.
    pub fn join(first: Subscription, second: Subscription) -> Self {
        Self::new(move || {
            first.dispose();
            second.dispose();
        })
    }

    /// Cancel the registration. Consumes the subscription, so a second call
    /// cannot happen; the drop path sees the cancel slot already empty.
    pub fn dispose(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
