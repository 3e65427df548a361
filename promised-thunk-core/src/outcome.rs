//! What a dispatch produces
//!
//! Every stage of the pipeline, and every thunk, returns an [`Outcome`]:
//! either a value that is available now, or a [`Deferred`] handle to one
//! that will be available later.
//!
//! ```ignore
//! use promised_thunk::{Dispatchable, Outcome};
//!
//! let load = Dispatchable::thunk(|dispatch, _get_state| {
//!     let (resolver, pending) = deferred();
//!     spawn_fetch(resolver);
//!     Ok(Outcome::Pending(pending))
//! });
//!
//! match store.dispatch(load)? {
//!     Outcome::Ready(value) => println!("done: {value:?}"),
//!     Outcome::Pending(pending) => println!("still running: {pending:?}"),
//! }
//! ```

use std::fmt;

use crate::deferred::Deferred;
use crate::error::DispatchError;

/// Result of dispatching an action: the pipeline's value, or a handle to it.
pub enum Outcome<R> {
    /// The value is available now.
    Ready(R),
    /// The value will arrive later.
    Pending(Deferred<R>),
}

/// What every stage returns. Errors from thunks and stages pass through unchanged.
pub type DispatchOutput<R> = Result<Outcome<R>, DispatchError>;

impl<R> Outcome<R> {
    #[inline]
    pub fn ready(value: R) -> Self {
        Outcome::Ready(value)
    }

    #[inline]
    pub fn pending(pending: Deferred<R>) -> Self {
        Outcome::Pending(pending)
    }

    /// Whether this outcome is still waiting on a value.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    /// The pending handle, if this outcome is deferred.
    ///
    /// This is the test applied to a thunk's return value to decide whether
    /// an observer should hear about it.
    #[inline]
    pub fn as_deferred(&self) -> Option<&Deferred<R>> {
        match self {
            Outcome::Pending(pending) => Some(pending),
            Outcome::Ready(_) => None,
        }
    }

    #[inline]
    pub fn as_ready(&self) -> Option<&R> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Pending(_) => None,
        }
    }

    #[inline]
    pub fn into_ready(self) -> Option<R> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Pending(_) => None,
        }
    }

    #[inline]
    pub fn into_deferred(self) -> Option<Deferred<R>> {
        match self {
            Outcome::Pending(pending) => Some(pending),
            Outcome::Ready(_) => None,
        }
    }
}

impl<R: Clone> Outcome<R> {
    /// The value if it is available right now, settled handles included.
    pub fn peek(&self) -> Option<R> {
        match self {
            Outcome::Ready(value) => Some(value.clone()),
            Outcome::Pending(pending) => pending.peek(),
        }
    }
}

impl<R> From<Deferred<R>> for Outcome<R> {
    fn from(pending: Deferred<R>) -> Self {
        Outcome::Pending(pending)
    }
}

impl<R: Clone> Clone for Outcome<R> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Ready(value) => Outcome::Ready(value.clone()),
            Outcome::Pending(pending) => Outcome::Pending(pending.clone()),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Outcome::Pending(pending) => f.debug_tuple("Pending").field(pending).finish(),
        }
    }
}
