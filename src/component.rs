//! Component adapter - Stream-driven render state.
//!
//! [`StreamComponent`] is the component factory: it pairs a transform (from an
//! input props stream and a context stream to a derived props stream) with an
//! optional render function, and stamps out [`ComponentInstance`]s. Each
//! instance owns the whole pipeline for one mounted component:
//!
//! ```text
//! receive emitter -> props/context streams -> transform -> derived stream
//!                                                              |
//!                                           state signal <- commit (skip equal)
//!                                                              |
//!                                                        render effect
//! ```
//!
//! Construction seeds the props and context streams with the initial snapshots
//! and synchronously drains the derived stream's first emission into the render
//! state, so the very first render has defined state without waiting on any
//! post-mount delivery. A transform that emits nothing synchronously is a
//! caller error and fails instantiation with [`Error::NoInitialEmission`].
//!
//! After `mounted()`, the instance holds exactly one live subscription on the
//! derived stream (skipping the already-consumed first emission). Owner updates
//! arrive through `receive()`, which pushes the new snapshots into the emitter;
//! synchronous emission bursts are coalesced so only the last value becomes
//! render state before any re-render. Values equal to the current state are
//! never committed, so the render effect does not re-run for no-op updates.
//!
//! # Example
//!
//! ```ignore
//! use stream_props::{Emitter, StreamComponent};
//!
//! #[derive(Clone, PartialEq)]
//! struct Props { label: String, count: i32, on_click: Emitter<()> }
//!
//! let button = StreamComponent::with_render(
//!     |props, _context| {
//!         let increment = Emitter::new();
//!         let count = increment.stream().scan(0, |n, _| n + 1).start_with(0);
//!         props.combine_latest(&count, {
//!             let increment = increment.clone();
//!             move |label: &String, count| Props {
//!                 label: label.clone(),
//!                 count: *count,
//!                 on_click: increment.clone(),
//!             }
//!         })
//!     },
//!     |props: &Props| format!("{} ({})", props.label, props.count),
//! );
//!
//! let instance = button.instantiate("Count".to_string())?;
//! assert_eq!(instance.render(), Some("Count (0)".to_string()));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{Signal, signal};
use tracing::trace;

use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::stream::Stream;
use crate::subscription::Subscription;

// =============================================================================
// Types
// =============================================================================

/// Render function from derived props to output.
pub type RenderFn<S, O> = Rc<dyn Fn(&S) -> O>;

/// A renderable component reference.
///
/// Passing a type instead of a closure to [`StreamComponent::with_renderable`]
/// wraps it into a render function that instantiates it with the derived props.
pub trait Renderable<S> {
    /// Rendered output type.
    type Output;

    /// Produce output for one property snapshot.
    fn render(props: &S) -> Self::Output;
}

/// Snapshot pair pushed by the owner on every update.
struct Received<P, C> {
    props: P,
    context: C,
}

// =============================================================================
// Component Factory
// =============================================================================

/// Factory for stream-driven component instances.
///
/// Type parameters: `P` owner props, `C` context, `S` derived render state,
/// `O` rendered output.
pub struct StreamComponent<P, C, S, O> {
    transform: Rc<dyn Fn(Stream<P>, Stream<C>) -> Stream<S>>,
    render: Option<RenderFn<S, O>>,
}

impl<P, C, S, O> Clone for StreamComponent<P, C, S, O> {
    fn clone(&self) -> Self {
        Self {
            transform: Rc::clone(&self.transform),
            render: self.render.clone(),
        }
    }
}

impl<P, C, S, O> StreamComponent<P, C, S, O>
where
    P: Clone + 'static,
    C: Clone + 'static,
    S: Clone + PartialEq + 'static,
    O: 'static,
{
    /// Create a factory with no render function.
    ///
    /// Instances render through their own children function (see
    /// [`StreamComponent::instantiate_with_children`]), or render nothing.
    pub fn new(transform: impl Fn(Stream<P>, Stream<C>) -> Stream<S> + 'static) -> Self {
        Self {
            transform: Rc::new(transform),
            render: None,
        }
    }

    /// Create a factory with an explicit render function.
    pub fn with_render(
        transform: impl Fn(Stream<P>, Stream<C>) -> Stream<S> + 'static,
        render: impl Fn(&S) -> O + 'static,
    ) -> Self {
        Self {
            transform: Rc::new(transform),
            render: Some(Rc::new(render)),
        }
    }

    /// Create a factory that renders through a component reference.
    pub fn with_renderable<W>(
        transform: impl Fn(Stream<P>, Stream<C>) -> Stream<S> + 'static,
    ) -> Self
    where
        W: Renderable<S, Output = O>,
    {
        Self::with_render(transform, |props| W::render(props))
    }

    /// Instantiate with initial props and default context.
    pub fn instantiate(&self, props: P) -> Result<ComponentInstance<P, C, S, O>>
    where
        C: Default,
    {
        self.build(props, C::default(), None)
    }

    /// Instantiate with initial props and an explicit context snapshot.
    pub fn instantiate_with_context(
        &self,
        props: P,
        context: C,
    ) -> Result<ComponentInstance<P, C, S, O>> {
        self.build(props, context, None)
    }

    /// Instantiate with a children-as-render-function fallback.
    ///
    /// Used when the factory has no render function of its own; a factory
    /// render function still takes precedence.
    pub fn instantiate_with_children(
        &self,
        props: P,
        children: impl Fn(&S) -> O + 'static,
    ) -> Result<ComponentInstance<P, C, S, O>>
    where
        C: Default,
    {
        self.build(props, C::default(), Some(Rc::new(children)))
    }

    fn build(
        &self,
        props: P,
        context: C,
        children: Option<RenderFn<S, O>>,
    ) -> Result<ComponentInstance<P, C, S, O>> {
        // Receives [props, context] pairs pushed by the owner.
        let receive: Emitter<Received<P, C>> = Emitter::new();

        let props_stream = receive
            .stream()
            .map(|received: &Received<P, C>| received.props.clone())
            .start_with(props.clone());
        let context_stream = receive
            .stream()
            .map(|received: &Received<P, C>| received.context.clone())
            .start_with(context.clone());

        // The transform runs exactly once per instance.
        let derived = (self.transform)(props_stream, context_stream);

        // Drain the first synchronous emission so render state exists before
        // the first render. In a synchronous burst the last emission wins.
        let first: Rc<RefCell<Option<S>>> = Rc::new(RefCell::new(None));
        let probe = derived.subscribe({
            let first = Rc::clone(&first);
            move |value| *first.borrow_mut() = Some(value.clone())
        });
        probe.dispose();
        let initial = first.borrow_mut().take().ok_or(Error::NoInitialEmission)?;

        trace!(target: "stream_props::component", "instance constructed");

        Ok(ComponentInstance {
            inner: Rc::new(InstanceInner {
                receive,
                latest: RefCell::new(Received { props, context }),
                derived,
                state: signal(initial),
                subscription: RefCell::new(None),
                mounted: Cell::new(false),
                delivering: Cell::new(false),
                pending: RefCell::new(None),
                render: self.render.clone(),
                children,
            }),
        })
    }
}

// =============================================================================
// Component Instance
// =============================================================================

struct InstanceInner<P, C, S, O>
where
    S: Clone + PartialEq + 'static,
{
    receive: Emitter<Received<P, C>>,
    latest: RefCell<Received<P, C>>,
    derived: Stream<S>,
    state: Signal<S>,
    subscription: RefCell<Option<Subscription>>,
    mounted: Cell<bool>,
    /// True while an owner push is being delivered; emissions are coalesced.
    delivering: Cell<bool>,
    pending: RefCell<Option<S>>,
    render: Option<RenderFn<S, O>>,
    children: Option<RenderFn<S, O>>,
}

impl<P, C, S, O> InstanceInner<P, C, S, O>
where
    S: Clone + PartialEq + 'static,
{
    /// Route one derived emission into render state.
    fn deliver(&self, value: &S) {
        if self.delivering.get() {
            // Mid-push burst: keep only the last value, commit after the
            // push settles so one update cycle renders at most once.
            *self.pending.borrow_mut() = Some(value.clone());
            return;
        }
        self.commit(value.clone());
    }

    /// Write render state, skipping values equal to the current state.
    fn commit(&self, value: S) {
        if self.state.get() != value {
            self.state.set(value);
        }
    }

    /// Commit whatever a coalesced burst left in the pending slot.
    fn settle(&self) {
        if let Some(value) = self.pending.borrow_mut().take() {
            self.commit(value);
        }
    }
}

/// One live component: owns its emitter, streams, render state, and
/// subscription exclusively. Clones share the same instance.
pub struct ComponentInstance<P, C, S, O>
where
    S: Clone + PartialEq + 'static,
{
    inner: Rc<InstanceInner<P, C, S, O>>,
}

impl<P, C, S, O> Clone for ComponentInstance<P, C, S, O>
where
    S: Clone + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P, C, S, O> ComponentInstance<P, C, S, O>
where
    P: Clone + 'static,
    C: Clone + 'static,
    S: Clone + PartialEq + 'static,
    O: 'static,
{
    /// Mark the instance mounted and subscribe to the derived stream.
    ///
    /// The subscription skips the first emission, which construction already
    /// consumed into the initial render state. A synchronous burst replayed
    /// while subscribing is coalesced like an owner push, so at most its last
    /// value can become render state. Idempotent: a second call is a no-op,
    /// so exactly one subscription is ever live.
    pub fn mounted(&self) {
        if self.inner.mounted.get() {
            return;
        }
        self.inner.mounted.set(true);

        let weak: Weak<InstanceInner<P, C, S, O>> = Rc::downgrade(&self.inner);
        self.inner.delivering.set(true);
        let subscription = self.inner.derived.skip(1).subscribe(move |value| {
            if let Some(inner) = weak.upgrade() {
                inner.deliver(value);
            }
        });
        self.inner.delivering.set(false);
        *self.inner.subscription.borrow_mut() = Some(subscription);
        self.inner.settle();

        trace!(target: "stream_props::component", "instance mounted");
    }

    /// Push new props and context snapshots from the owner.
    ///
    /// With synchronous operators the derived state is committed before this
    /// returns; a burst of synchronous emissions commits only its last value.
    pub fn receive(&self, props: P, context: C) {
        *self.inner.latest.borrow_mut() = Received {
            props: props.clone(),
            context: context.clone(),
        };

        self.inner.delivering.set(true);
        self.inner.receive.invoke(Received { props, context });
        self.inner.delivering.set(false);
        self.inner.settle();
    }

    /// Push new props, reusing the latest context snapshot.
    pub fn receive_props(&self, props: P) {
        let context = self.inner.latest.borrow().context.clone();
        self.receive(props, context);
    }

    /// Push a new context snapshot, reusing the latest props.
    pub fn receive_context(&self, context: C) {
        let props = self.inner.latest.borrow().props.clone();
        self.receive(props, context);
    }

    /// Render the current state.
    ///
    /// Resolution order: the factory render function, else the instance's
    /// children function, else nothing. Reads the state signal, so calling
    /// this inside an effect subscribes the effect to state changes.
    pub fn render(&self) -> Option<O> {
        let state = self.inner.state.get();
        if let Some(render) = &self.inner.render {
            return Some(render(&state));
        }
        if let Some(children) = &self.inner.children {
            return Some(children(&state));
        }
        None
    }

    /// Current render state snapshot.
    pub fn state(&self) -> S {
        self.inner.state.get()
    }

    /// Whether `mounted()` has run.
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Dispose the derived-stream subscription.
    ///
    /// Safe to call on an unmounted instance and safe to call twice; dropping
    /// the last clone of an instance tears the subscription down as well.
    pub fn unmount(&self) {
        if let Some(subscription) = self.inner.subscription.borrow_mut().take() {
            subscription.dispose();
            trace!(target: "stream_props::component", "instance unmounted");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct OwnerProps {
        pass: String,
    }

    #[derive(Clone, PartialEq, Debug)]
    struct ButtonProps {
        pass: String,
        count: i32,
        on_click: Emitter<()>,
    }

    /// The smart-button transform: seeds a counter at 0 and exposes the
    /// increment emitter in the derived props.
    fn smart_button(
        props: Stream<OwnerProps>,
        _context: Stream<()>,
    ) -> Stream<ButtonProps> {
        let increment: Emitter<()> = Emitter::new();
        let count = increment.stream().scan(0, |total, _| total + 1).start_with(0);
        props.combine_latest(&count, {
            let increment = increment.clone();
            move |owner, count| ButtonProps {
                pass: owner.pass.clone(),
                count: *count,
                on_click: increment.clone(),
            }
        })
    }

    fn through() -> OwnerProps {
        OwnerProps {
            pass: "through".to_string(),
        }
    }

    #[test]
    fn first_render_works_without_mounting() {
        let factory = StreamComponent::with_render(smart_button, |props: &ButtonProps| {
            props.clone()
        });
        let instance = factory.instantiate(through()).unwrap();

        // Single-pass render before any mount: state is already defined.
        let rendered = instance.render().unwrap();
        assert_eq!(rendered.pass, "through");
        assert_eq!(rendered.count, 0);
        assert!(!instance.is_mounted());
    }

    #[test]
    fn clicks_advance_render_state_after_mount() {
        let factory = StreamComponent::with_render(smart_button, |props: &ButtonProps| {
            props.clone()
        });
        let instance = factory.instantiate(through()).unwrap();
        instance.mounted();

        let button = instance.render().unwrap();
        button.on_click.invoke(());
        button.on_click.invoke(());
        button.on_click.invoke(());

        let rendered = instance.render().unwrap();
        assert_eq!(rendered.count, 3);
        assert_eq!(rendered.pass, "through");
    }

    #[test]
    fn receive_forwards_new_props_through_the_pipeline() {
        let factory = StreamComponent::with_render(smart_button, |props: &ButtonProps| {
            props.clone()
        });
        let instance = factory.instantiate(through()).unwrap();
        instance.mounted();

        instance.receive_props(OwnerProps {
            pass: "updated".to_string(),
        });

        let rendered = instance.render().unwrap();
        assert_eq!(rendered.pass, "updated");
        assert_eq!(rendered.count, 0);
    }

    #[test]
    fn context_updates_reach_derived_state() {
        let factory: StreamComponent<OwnerProps, String, String, String> =
            StreamComponent::with_render(
                |props, context| {
                    props.combine_latest(&context, |owner: &OwnerProps, ctx: &String| {
                        format!("{}:{}", owner.pass, ctx)
                    })
                },
                |state: &String| state.clone(),
            );

        let instance = factory
            .instantiate_with_context(through(), "redux".to_string())
            .unwrap();
        instance.mounted();
        assert_eq!(instance.render().unwrap(), "through:redux");

        instance.receive_context("store".to_string());
        assert_eq!(instance.render().unwrap(), "through:store");
    }

    #[test]
    fn children_function_is_used_when_no_render_function_given() {
        let factory: StreamComponent<OwnerProps, (), ButtonProps, String> =
            StreamComponent::new(smart_button);
        let instance = factory
            .instantiate_with_children(through(), |props: &ButtonProps| {
                format!("{}:{}", props.pass, props.count)
            })
            .unwrap();
        instance.mounted();

        assert_eq!(instance.render().unwrap(), "through:0");
        instance.state().on_click.invoke(());
        assert_eq!(instance.render().unwrap(), "through:1");
    }

    #[test]
    fn renders_nothing_without_render_function_or_children() {
        let factory: StreamComponent<OwnerProps, (), ButtonProps, String> =
            StreamComponent::new(smart_button);
        let instance = factory.instantiate(through()).unwrap();

        assert!(instance.render().is_none());
    }

    #[test]
    fn factory_render_function_takes_precedence_over_children() {
        let factory = StreamComponent::with_render(smart_button, |_: &ButtonProps| {
            "render".to_string()
        });
        let instance = factory
            .instantiate_with_children(through(), |_: &ButtonProps| "children".to_string())
            .unwrap();

        assert_eq!(instance.render().unwrap(), "render");
    }

    #[test]
    fn renderable_reference_wraps_into_render_function() {
        struct Label;
        impl Renderable<ButtonProps> for Label {
            type Output = String;
            fn render(props: &ButtonProps) -> String {
                format!("[{}]", props.pass)
            }
        }

        let factory: StreamComponent<OwnerProps, (), ButtonProps, String> =
            StreamComponent::with_renderable::<Label>(smart_button);
        let instance = factory.instantiate(through()).unwrap();

        assert_eq!(instance.render().unwrap(), "[through]");
    }

    #[test]
    fn transform_without_synchronous_emission_fails_construction() {
        let factory: StreamComponent<OwnerProps, (), OwnerProps, OwnerProps> =
            StreamComponent::with_render(
                // skip(1) swallows the seeded snapshot, so nothing is emitted
                // synchronously at subscribe time.
                |props, _context| props.skip(1),
                |props: &OwnerProps| props.clone(),
            );

        let result = factory.instantiate(through());
        assert_eq!(result.err(), Some(Error::NoInitialEmission));
    }

    #[test]
    fn synchronous_burst_commits_only_the_last_value() {
        // Each owner push fans out into two synchronous emissions.
        let factory: StreamComponent<i32, (), i32, i32> = StreamComponent::with_render(
            |props, _context| props.map(|n| n * 10).merge(&props.map(|n| n * 10 + 1)),
            |n: &i32| *n,
        );
        let instance = factory.instantiate(1).unwrap();
        instance.mounted();

        instance.receive_props(2);

        // Both emissions happened during one push; only the last became state.
        assert_eq!(instance.state(), 21);
    }

    #[test]
    fn mounted_and_unmount_are_idempotent() {
        let factory = StreamComponent::with_render(smart_button, |props: &ButtonProps| {
            props.clone()
        });
        let instance = factory.instantiate(through()).unwrap();

        instance.mounted();
        instance.mounted();
        instance.unmount();
        instance.unmount();

        // The emitter behind on_click is still invokable after teardown.
        let button = instance.render().unwrap();
        button.on_click.invoke(());
        assert_eq!(instance.render().unwrap().count, 0);
    }

    #[test]
    fn instances_are_independent() {
        let factory = StreamComponent::with_render(smart_button, |props: &ButtonProps| {
            props.clone()
        });
        let first = factory.instantiate(through()).unwrap();
        let second = factory.instantiate(through()).unwrap();
        first.mounted();
        second.mounted();

        first.render().unwrap().on_click.invoke(());

        assert_eq!(first.render().unwrap().count, 1);
        assert_eq!(second.render().unwrap().count, 0);
    }
}
