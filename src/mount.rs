//! Mount API - Render effect wiring and teardown.
//!
//! This is the host-side harness: it connects a [`ComponentInstance`] to a
//! render effect so every committed render-state change produces one render.
//! The effect runs immediately on creation, so the first render happens with
//! the synchronously captured construction state, before the instance is
//! marked mounted. That mirrors a single-pass render performed by a host
//! framework before mount completes.
//!
//! # Example
//!
//! ```ignore
//! use stream_props::{mount, StreamComponent};
//!
//! let instance = factory.instantiate(props)?;
//! let handle = mount(instance, |output| println!("{output}"));
//!
//! // ... push updates, each re-render goes through the sink ...
//!
//! handle.unmount();
//! ```

use spark_signals::effect;
use tracing::trace;

use crate::component::ComponentInstance;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`] that allows unmounting.
///
/// Holds the render effect stop function and the instance teardown. Dropping
/// the handle performs the same cleanup, so an early return cannot leak the
/// subscription or leave the effect running.
pub struct MountHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    teardown: Option<Box<dyn FnOnce()>>,
}

impl MountHandle {
    /// Stop the render effect and tear the instance down.
    ///
    /// Cleanup order: the effect stops first so teardown cannot trigger a
    /// render, then the derived-stream subscription is disposed.
    pub fn unmount(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        if let Some(teardown) = self.teardown.take() {
            teardown();
            trace!(target: "stream_props::mount", "unmounted");
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount an instance: create its render effect, then mark it mounted.
///
/// The sink receives every rendered output, starting with the initial render
/// during this call. Instances with neither a render function nor children
/// render nothing, so the sink is never called for them.
pub fn mount<P, C, S, O>(
    instance: ComponentInstance<P, C, S, O>,
    sink: impl FnMut(O) + 'static,
) -> MountHandle
where
    P: Clone + 'static,
    C: Clone + 'static,
    S: Clone + PartialEq + 'static,
    O: 'static,
{
    let render_instance = instance.clone();
    let mut sink = sink;

    // The ONE render effect: reading render state inside the closure makes
    // the effect re-run whenever a new derived value is committed.
    let stop = effect(move || {
        if let Some(output) = render_instance.render() {
            sink(output);
        }
    });

    instance.mounted();
    trace!(target: "stream_props::mount", "mounted");

    MountHandle {
        stop_effect: Some(Box::new(stop)),
        teardown: Some(Box::new(move || instance.unmount())),
    }
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Tests
// =============================================================================
