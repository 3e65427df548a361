//! Pending values
//!
//! A [`Deferred`] is a handle to a value that may not exist yet, the pipeline's
//! equivalent of a promise. It is produced together with a [`Resolver`] that
//! settles it later, possibly from another task or thread.
//!
//! The dispatch pipeline never waits on a `Deferred`. It only hands the handle
//! around: back to the caller, to the next stage, or to an observer. Whoever
//! holds a clone may await [`Deferred::settled`].
//!
//! # Example
//!
//! ```
//! use promised_thunk_core::deferred::deferred;
//!
//! let (resolver, pending) = deferred::<u32>();
//! assert!(!pending.is_settled());
//!
//! resolver.resolve(42);
//! assert_eq!(pending.peek(), Some(42));
//! ```

use std::fmt;

use tokio::sync::watch;

use crate::error::DeferredError;

/// Create a linked resolver/handle pair for a value that is not ready yet.
pub fn deferred<T>() -> (Resolver<T>, Deferred<T>) {
    let (tx, rx) = watch::channel(None);
    (Resolver { tx }, Deferred { rx })
}

/// Read side of a pending value.
///
/// Clones share the same underlying slot.
pub struct Deferred<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T> Deferred<T> {
    /// A handle that is already settled with `value`.
    pub fn resolved(value: T) -> Self {
        let (_tx, rx) = watch::channel(Some(value));
        Self { rx }
    }

    /// Whether a value has been supplied.
    pub fn is_settled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Whether the resolver was dropped without supplying a value.
    pub fn is_abandoned(&self) -> bool {
        !self.is_settled() && self.rx.has_changed().is_err()
    }

    /// Whether both handles refer to the same pending value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.rx.same_channel(&other.rx)
    }
}

impl<T: Clone> Deferred<T> {
    /// The settled value, if there is one. Never waits.
    pub fn peek(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the value is supplied.
    ///
    /// Returns [`DeferredError::Abandoned`] if the resolver is dropped first.
    pub async fn settled(&self) -> Result<T, DeferredError> {
        let mut rx = self.rx.clone();
        let slot = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| DeferredError::Abandoned)?;
        (*slot).clone().ok_or(DeferredError::Abandoned)
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Write side of a pending value.
///
/// Dropping it without calling [`Resolver::resolve`] abandons every handle.
pub struct Resolver<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Resolver<T> {
    /// Settle the value, waking anyone waiting on it.
    pub fn resolve(self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Whether any handle is still alive.
    pub fn is_observed(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("observed", &self.is_observed())
            .finish()
    }
}
