//! The `(dispatch, get_state)` pair a store hands to its middleware

use std::fmt;
use std::rc::Rc;

use crate::action::Dispatchable;
use crate::error::DispatchError;
use crate::outcome::DispatchOutput;

type DispatchFn<S, A, R> = dyn Fn(Dispatchable<S, A, R>) -> DispatchOutput<R>;

/// Entry point of a store's full pipeline.
///
/// Dispatching through it starts again at the outermost stage, so a thunk
/// may dispatch further actions, including other thunks.
pub struct Dispatcher<S, A, R> {
    inner: Rc<DispatchFn<S, A, R>>,
}

impl<S, A, R> Dispatcher<S, A, R> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Dispatchable<S, A, R>) -> DispatchOutput<R> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Dispatch an action from the top of the pipeline.
    pub fn dispatch(&self, action: impl Into<Dispatchable<S, A, R>>) -> DispatchOutput<R> {
        (self.inner)(action.into())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<S, A, R> Clone for Dispatcher<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A, R> fmt::Debug for Dispatcher<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

type ReadFn<S> = dyn Fn() -> Result<S, DispatchError>;

/// Read access to a store's current state.
///
/// Reading fails with [`DispatchError::StateBusy`] when the state is being
/// mutated further up the call stack.
pub struct StateReader<S> {
    inner: Rc<ReadFn<S>>,
}

impl<S> StateReader<S> {
    /// A reader that always succeeds.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> S + 'static,
    {
        Self::try_new(move || Ok(f()))
    }

    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn() -> Result<S, DispatchError> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Snapshot of the state at the time of the call.
    pub fn get(&self) -> Result<S, DispatchError> {
        (self.inner)()
    }
}

impl<S> Clone for StateReader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for StateReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateReader").finish_non_exhaustive()
    }
}

/// What a store exposes to its middleware: a dispatcher and a state reader.
///
/// Middleware read it once when they are applied and keep it for the life of
/// the store. Cloning is cheap.
pub struct DispatchContext<S, A, R> {
    dispatch: Dispatcher<S, A, R>,
    get_state: StateReader<S>,
}

impl<S, A, R> DispatchContext<S, A, R> {
    pub fn new(dispatch: Dispatcher<S, A, R>, get_state: StateReader<S>) -> Self {
        Self {
            dispatch,
            get_state,
        }
    }

    /// Build a context directly from closures.
    pub fn from_fns<D, G>(dispatch: D, get_state: G) -> Self
    where
        D: Fn(Dispatchable<S, A, R>) -> DispatchOutput<R> + 'static,
        G: Fn() -> S + 'static,
    {
        Self::new(Dispatcher::new(dispatch), StateReader::new(get_state))
    }

    #[inline]
    pub fn dispatch(&self, action: impl Into<Dispatchable<S, A, R>>) -> DispatchOutput<R> {
        self.dispatch.dispatch(action)
    }

    #[inline]
    pub fn get_state(&self) -> Result<S, DispatchError> {
        self.get_state.get()
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher<S, A, R> {
        &self.dispatch
    }

    #[inline]
    pub fn state_reader(&self) -> &StateReader<S> {
        &self.get_state
    }

    /// Whether both contexts dispatch into the same pipeline.
    pub fn same_pipeline(&self, other: &Self) -> bool {
        self.dispatch.ptr_eq(&other.dispatch)
    }
}

impl<S, A, R> Clone for DispatchContext<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            get_state: self.get_state.clone(),
        }
    }
}

impl<S, A, R> fmt::Debug for DispatchContext<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext").finish_non_exhaustive()
    }
}
