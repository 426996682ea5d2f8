//! Event tagging and the type-erased callback wrapper used by the
//! [`Dispatcher`](super::Dispatcher).

use std::any::Any;
use std::fmt;

use super::{ConsoleError, Result};

/// Types that can be sent through the [`Dispatcher`](super::Dispatcher).
///
/// `NAME` is the event's tag: callbacks are filed under it, so every event
/// type needs its own.
///
/// ```
/// use bevy_cvar_console::core::ConEvent;
///
/// struct PlayerJoined {
///     name: String,
/// }
///
/// impl ConEvent for PlayerJoined {
///     const NAME: &'static str = "player_joined";
/// }
/// ```
pub trait ConEvent: Send + Sync + 'static {
    /// Stable tag of this event type.
    const NAME: &'static str;
}

/// Identifies an event type by its tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKind {
    name: &'static str,
}

impl EventKind {
    /// The kind of `E`.
    #[inline]
    pub fn of<E: ConEvent>() -> Self {
        Self { name: E::NAME }
    }

    /// The tag of the event.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The two callable shapes a callback can have.
pub enum CallbackFn<E> {
    /// Called without the event.
    WithoutEvent(Box<dyn FnMut() + Send + Sync>),
    /// Called with a reference to the event.
    WithEvent(Box<dyn FnMut(&E) + Send + Sync>),
}

/// Conversion of closures into a [`CallbackFn`].
///
/// `Marker` keeps the two blanket implementations apart; it is inferred.
pub trait IntoCallbackFn<E, Marker> {
    /// Box the closure.
    fn into_callback_fn(self) -> CallbackFn<E>;
}

#[doc(hidden)]
pub struct NoEventMarker;

#[doc(hidden)]
pub struct EventMarker;

impl<E, F> IntoCallbackFn<E, NoEventMarker> for F
where
    F: FnMut() + Send + Sync + 'static,
{
    fn into_callback_fn(self) -> CallbackFn<E> {
        CallbackFn::WithoutEvent(Box::new(self))
    }
}

impl<E, F> IntoCallbackFn<E, EventMarker> for F
where
    F: FnMut(&E) + Send + Sync + 'static,
{
    fn into_callback_fn(self) -> CallbackFn<E> {
        CallbackFn::WithEvent(Box::new(self))
    }
}

/// Filter deciding whether a callback fires for a given event.
pub type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A callback for events of type `E`, optionally gated by a predicate.
pub struct Callback<E: ConEvent> {
    func: CallbackFn<E>,
    predicate: Option<Predicate<E>>,
}

impl<E: ConEvent> Callback<E> {
    /// Wrap a closure taking either no arguments or `&E`.
    pub fn new<M>(func: impl IntoCallbackFn<E, M>) -> Self {
        Self {
            func: func.into_callback_fn(),
            predicate: None,
        }
    }

    /// Only fire for events matching `predicate`.
    pub fn with_predicate(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Check if the callable receives the event.
    #[inline]
    pub fn takes_event(&self) -> bool {
        matches!(self.func, CallbackFn::WithEvent(_))
    }

    /// Check if a predicate is attached.
    #[inline]
    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Run the callback unless the predicate declines. Returns whether it ran.
    pub fn call(&mut self, event: &E) -> bool {
        if let Some(predicate) = &self.predicate
            && !predicate(event)
        {
            return false;
        }

        match &mut self.func {
            CallbackFn::WithoutEvent(func) => func(),
            CallbackFn::WithEvent(func) => func(event),
        }
        true
    }
}

trait ErasedCallback: Send + Sync {
    fn call_any(&mut self, event: &dyn Any) -> Option<bool>;
}

impl<E: ConEvent> ErasedCallback for Callback<E> {
    fn call_any(&mut self, event: &dyn Any) -> Option<bool> {
        event.downcast_ref::<E>().map(|event| self.call(event))
    }
}

/// A [`Callback`] with its event type erased, tagged with an [`EventKind`].
pub struct AnyCallback {
    kind: EventKind,
    inner: Box<dyn ErasedCallback>,
}

impl AnyCallback {
    /// Erase `callback`.
    pub fn new<E: ConEvent>(callback: Callback<E>) -> Self {
        Self {
            kind: EventKind::of::<E>(),
            inner: Box::new(callback),
        }
    }

    /// The event type this callback was built for.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Deliver `event`. Returns whether the callback ran.
    ///
    /// Fails with [`ConsoleError::InvalidArgument`] if `E` is not the event
    /// type the callback was built for, including a different type that
    /// reuses its tag.
    pub fn invoke<E: ConEvent>(&mut self, event: &E) -> Result<bool> {
        let given = EventKind::of::<E>();
        if given != self.kind {
            return Err(mismatch(self.kind, given));
        }
        self.inner
            .call_any(event)
            .ok_or_else(|| mismatch(self.kind, given))
    }
}

impl fmt::Debug for AnyCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyCallback").field("kind", &self.kind).finish_non_exhaustive()
    }
}

fn mismatch(expected: EventKind, given: EventKind) -> ConsoleError {
    ConsoleError::InvalidArgument(format!(
        "callback for {} invoked with {}",
        expected.name(),
        given.name()
    ))
}
