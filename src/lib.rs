//! # stream-props
//!
//! Stream-driven component props: a small adapter that lets a component's
//! rendered output be driven by a push-based stream of properties instead of
//! imperative lifecycle calls.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! render-effect side of the bridge.
//!
//! ## Architecture
//!
//! Two cooperating pieces, both generators of behavior rather than services:
//!
//! - [`StreamComponent`] turns a transform over property streams into a
//!   component factory. Each instance seeds an input stream with its initial
//!   props (and context), runs the transform once, and keeps the latest derived
//!   emission as render state.
//! - [`Emitter`] is a multicast push source invoked like a callback, so
//!   rendered output can call back into the stream pipeline (a click handler
//!   that is also a stream source).
//!
//! The full per-instance pipeline:
//!
//! ```text
//! owner push -> receive Emitter -> props$/context$ -> transform -> derived$
//!                                                                     |
//!                                      render effect <- state Signal <-+
//! ```
//!
//! The first derived emission is drained synchronously at construction, so the
//! first render has defined state without waiting on post-mount delivery. Every
//! later emission is committed through an equality check: derived values equal
//! to the current state never re-render.
//!
//! ## Modules
//!
//! - [`component`] - Component factory and per-instance lifecycle
//! - [`emitter`] - Invokable multicast push source
//! - [`stream`] - Composable push streams and their operators
//! - [`subscription`] - Dispose-once observer registrations
//! - [`mount`] - Render effect wiring and teardown
//! - [`error`] - Construction error type

pub mod component;
pub mod emitter;
pub mod error;
pub mod mount;
pub mod stream;
pub mod subscription;

// Re-export commonly used items
pub use component::{ComponentInstance, RenderFn, Renderable, StreamComponent};
pub use emitter::Emitter;
pub use error::{Error, Result};
pub use mount::{MountHandle, mount, unmount};
pub use stream::{Observer, Stream};
pub use subscription::Subscription;
