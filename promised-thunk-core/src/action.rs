//! Action types that flow through the dispatch pipeline
//!
//! Every value handed to a store is a [`Dispatchable`], a tagged union of the
//! three shapes the pipeline recognizes:
//!
//! - [`Thunk`]: a callable that receives `(dispatch, get_state)` and is
//!   invoked instead of being forwarded
//! - [`Deferred`]: a pending value whose outcome is not available yet
//! - a plain action `A`, destined for the reducer unchanged

use std::fmt::{self, Debug};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::context::{Dispatcher, StateReader};
use crate::deferred::Deferred;
use crate::outcome::DispatchOutput;

/// Marker trait for plain actions that can be reduced by the store
///
/// Plain actions should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: So they can be produced on other threads and sent back
///
/// Use `#[derive(Action)]` from `promised-thunk-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

type ThunkFn<S, A, R> = dyn Fn(&Dispatcher<S, A, R>, &StateReader<S>) -> DispatchOutput<R>;

/// A callable action, invoked with the store's dispatcher and state reader.
///
/// Cloning a thunk is cheap and preserves identity: both clones run the same
/// closure and compare equal under [`Thunk::ptr_eq`].
pub struct Thunk<S, A, R> {
    label: &'static str,
    run: Rc<ThunkFn<S, A, R>>,
}

impl<S, A, R> Thunk<S, A, R> {
    /// Wrap a closure as an unlabeled thunk.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Dispatcher<S, A, R>, &StateReader<S>) -> DispatchOutput<R> + 'static,
    {
        Self::named("Thunk", f)
    }

    /// Wrap a closure with a label shown in logs.
    pub fn named<F>(label: &'static str, f: F) -> Self
    where
        F: Fn(&Dispatcher<S, A, R>, &StateReader<S>) -> DispatchOutput<R> + 'static,
    {
        Self {
            label,
            run: Rc::new(f),
        }
    }

    /// The label given at construction (`"Thunk"` if none).
    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Invoke the thunk.
    ///
    /// Errors are returned exactly as the closure produced them.
    #[inline]
    pub fn run(&self, dispatch: &Dispatcher<S, A, R>, get_state: &StateReader<S>) -> DispatchOutput<R> {
        (self.run)(dispatch, get_state)
    }

    /// Whether both handles wrap the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.run, &other.run)
    }
}

impl<S, A, R> Clone for Thunk<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            run: Rc::clone(&self.run),
        }
    }
}

impl<S, A, R> Debug for Thunk<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Thunk").field(&self.label).finish()
    }
}

/// The shape of a [`Dispatchable`], decided purely from its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Callable action, invoked instead of forwarded
    Thunk,
    /// Pending value exposing a continuation
    Deferred,
    /// Anything else; reaches the reducer unchanged
    Plain,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Thunk => "thunk",
            ActionKind::Deferred => "deferred",
            ActionKind::Plain => "plain",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value submitted for dispatch.
///
/// # Type Parameters
/// * `S` - The store's state type
/// * `A` - The plain action type
/// * `R` - The value produced once an action has been handled
pub enum Dispatchable<S, A, R> {
    Thunk(Thunk<S, A, R>),
    Deferred(Deferred<R>),
    Plain(A),
}

impl<S, A, R> Dispatchable<S, A, R> {
    /// Build a thunk action from a closure.
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn(&Dispatcher<S, A, R>, &StateReader<S>) -> DispatchOutput<R> + 'static,
    {
        Dispatchable::Thunk(Thunk::new(f))
    }

    /// Build a labeled thunk action from a closure.
    pub fn named_thunk<F>(label: &'static str, f: F) -> Self
    where
        F: Fn(&Dispatcher<S, A, R>, &StateReader<S>) -> DispatchOutput<R> + 'static,
    {
        Dispatchable::Thunk(Thunk::named(label, f))
    }

    /// Wrap a pending value as an action.
    pub fn deferred(pending: Deferred<R>) -> Self {
        Dispatchable::Deferred(pending)
    }

    /// Classify this action. See [`classify`].
    #[inline]
    pub fn kind(&self) -> ActionKind {
        classify(self)
    }

    pub fn as_plain(&self) -> Option<&A> {
        match self {
            Dispatchable::Plain(action) => Some(action),
            _ => None,
        }
    }

    pub fn into_plain(self) -> Option<A> {
        match self {
            Dispatchable::Plain(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_thunk(&self) -> Option<&Thunk<S, A, R>> {
        match self {
            Dispatchable::Thunk(thunk) => Some(thunk),
            _ => None,
        }
    }

    pub fn as_deferred(&self) -> Option<&Deferred<R>> {
        match self {
            Dispatchable::Deferred(pending) => Some(pending),
            _ => None,
        }
    }
}

impl<S, A: Action, R> Dispatchable<S, A, R> {
    /// Name used in logs: the plain action's name, the thunk's label,
    /// or `"Deferred"`.
    pub fn name(&self) -> &'static str {
        match self {
            Dispatchable::Thunk(thunk) => thunk.label(),
            Dispatchable::Deferred(_) => "Deferred",
            Dispatchable::Plain(action) => action.name(),
        }
    }
}

impl<S, A, R> From<A> for Dispatchable<S, A, R> {
    fn from(action: A) -> Self {
        Dispatchable::Plain(action)
    }
}

impl<S, A: Clone, R> Clone for Dispatchable<S, A, R> {
    fn clone(&self) -> Self {
        match self {
            Dispatchable::Thunk(thunk) => Dispatchable::Thunk(thunk.clone()),
            Dispatchable::Deferred(pending) => Dispatchable::Deferred(pending.clone()),
            Dispatchable::Plain(action) => Dispatchable::Plain(action.clone()),
        }
    }
}

impl<S, A: Debug, R> Debug for Dispatchable<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatchable::Thunk(thunk) => thunk.fmt(f),
            Dispatchable::Deferred(pending) => pending.fmt(f),
            Dispatchable::Plain(action) => f.debug_tuple("Plain").field(action).finish(),
        }
    }
}

/// Decide which of the three shapes an action has.
///
/// Total and side-effect free: looks only at the variant, never at history.
pub fn classify<S, A, R>(action: &Dispatchable<S, A, R>) -> ActionKind {
    match action {
        Dispatchable::Thunk(_) => ActionKind::Thunk,
        Dispatchable::Deferred(_) => ActionKind::Deferred,
        Dispatchable::Plain(_) => ActionKind::Plain,
    }
}
