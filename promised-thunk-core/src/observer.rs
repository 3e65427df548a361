//! Observers notified about pending values

use crate::action::Dispatchable;
use crate::context::DispatchContext;
use crate::deferred::Deferred;
use crate::error::BoxError;

/// What an observer returns. Success carries nothing; the stage ignores it.
pub type ObserveResult = Result<(), BoxError>;

/// Notified when the pipeline sees a pending value.
///
/// Receives the pending handle, the action that produced (or is) it, and the
/// store's dispatch context. The handle is not settled yet; observers that
/// care about the eventual value should clone it and wait elsewhere.
///
/// Implemented for any closure with the matching signature.
pub trait Observer<S, A, R> {
    fn observe(
        &self,
        pending: &Deferred<R>,
        action: &Dispatchable<S, A, R>,
        ctx: &DispatchContext<S, A, R>,
    ) -> ObserveResult;
}

impl<S, A, R, F> Observer<S, A, R> for F
where
    F: Fn(&Deferred<R>, &Dispatchable<S, A, R>, &DispatchContext<S, A, R>) -> ObserveResult,
{
    fn observe(
        &self,
        pending: &Deferred<R>,
        action: &Dispatchable<S, A, R>,
        ctx: &DispatchContext<S, A, R>,
    ) -> ObserveResult {
        self(pending, action, ctx)
    }
}
