//! The thunk-and-promise interception stage
//!
//! [`ThunkStage`] sits in a store's middleware pipeline and decides, per
//! action, one of three things:
//!
//! | action              | behavior                                                                  |
//! |---------------------|---------------------------------------------------------------------------|
//! | thunk               | invoke it with `(dispatch, get_state)`, return its outcome, skip `next`   |
//! | deferred            | notify the observer with the action's handle, then forward to `next`      |
//! | plain               | forward to `next`                                                         |
//!
//! When an invoked thunk returns [`Outcome::Pending`], the observer is told
//! about that handle as well. The observer is called at most once per
//! dispatch and never changes which branch runs.
//!
//! # Example
//!
//! ```ignore
//! use promised_thunk::prelude::*;
//!
//! let stage = ThunkStage::with_observer(|pending, action, _store| {
//!     tracing::info!(action = %action.name(), settled = pending.is_settled(), "work started");
//!     Ok(())
//! });
//!
//! let store = Store::with_middleware(AppState::default(), reducer, vec![Box::new(stage)]);
//! let outcome = store.dispatch(Dispatchable::named_thunk("FetchUser", |dispatch, _| {
//!     let (resolver, pending) = deferred();
//!     spawn_fetch(resolver);
//!     Ok(Outcome::Pending(pending))
//! }))?;
//! assert!(outcome.is_pending());
//! ```

use std::fmt;
use std::rc::Rc;

use crate::action::{Action, Dispatchable, Thunk};
use crate::config::{ObserverFailure, StageConfig};
use crate::context::DispatchContext;
use crate::deferred::Deferred;
use crate::error::{BoxError, DispatchError};
use crate::observer::{ObserveResult, Observer};
use crate::outcome::DispatchOutput;
use crate::store::{Enhancer, Middleware, Next};

/// Middleware that invokes thunks and reports pending values to an observer.
///
/// Building the stage is the first of three applications:
/// [`bind`](ThunkStage::bind) attaches a store's context,
/// [`chain`](BoundStage::chain) attaches the rest of the pipeline, and the
/// returned [`Next`] is called per action.
pub struct ThunkStage<S, A, R> {
    observer: Option<Rc<dyn Observer<S, A, R>>>,
    config: StageConfig,
}

impl<S, A, R> ThunkStage<S, A, R>
where
    S: 'static,
    A: Action,
    R: 'static,
{
    /// A stage without an observer. Notifications are skipped.
    pub fn new() -> Self {
        Self {
            observer: None,
            config: StageConfig::default(),
        }
    }

    /// A stage that calls `observer` whenever it sees a pending value.
    pub fn with_observer<F>(observer: F) -> Self
    where
        F: Fn(&Deferred<R>, &Dispatchable<S, A, R>, &DispatchContext<S, A, R>) -> ObserveResult
            + 'static,
    {
        Self::observed_by(observer)
    }

    /// Like [`with_observer`](Self::with_observer), for types implementing [`Observer`].
    pub fn observed_by<O>(observer: O) -> Self
    where
        O: Observer<S, A, R> + 'static,
    {
        Self {
            observer: Some(Rc::new(observer)),
            config: StageConfig::default(),
        }
    }

    /// Invoke thunks and report the pending ones. See [`StageConfig::catch_promise`].
    pub fn catch_promise<F>(observer: F) -> Self
    where
        F: Fn(&Deferred<R>, &Dispatchable<S, A, R>, &DispatchContext<S, A, R>) -> ObserveResult
            + 'static,
    {
        Self::with_observer(observer).config(StageConfig::catch_promise())
    }

    /// Forward everything and report pending actions. See [`StageConfig::promise_observer`].
    pub fn promise_observer<F>(observer: F) -> Self
    where
        F: Fn(&Deferred<R>, &Dispatchable<S, A, R>, &DispatchContext<S, A, R>) -> ObserveResult
            + 'static,
    {
        Self::with_observer(observer).config(StageConfig::promise_observer())
    }

    /// Replace the configuration.
    pub fn config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn stage_config(&self) -> &StageConfig {
        &self.config
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Attach a store's dispatch context.
    pub fn bind(&self, ctx: &DispatchContext<S, A, R>) -> BoundStage<S, A, R> {
        BoundStage {
            ctx: ctx.clone(),
            observer: self.observer.clone(),
            config: self.config,
        }
    }
}

impl<S, A, R> Default for ThunkStage<S, A, R>
where
    S: 'static,
    A: Action,
    R: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A, R> Clone for ThunkStage<S, A, R> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
            config: self.config,
        }
    }
}

impl<S, A, R> fmt::Debug for ThunkStage<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThunkStage")
            .field("has_observer", &self.observer.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<S, A, R> Middleware<S, A, R> for ThunkStage<S, A, R>
where
    S: 'static,
    A: Action,
    R: 'static,
{
    fn apply(&self, ctx: &DispatchContext<S, A, R>) -> Enhancer<S, A, R> {
        let bound = self.bind(ctx);
        Box::new(move |next: Next<S, A, R>| bound.chain(next))
    }
}

/// A [`ThunkStage`] bound to one store's context.
pub struct BoundStage<S, A, R> {
    ctx: DispatchContext<S, A, R>,
    observer: Option<Rc<dyn Observer<S, A, R>>>,
    config: StageConfig,
}

impl<S, A, R> BoundStage<S, A, R>
where
    S: 'static,
    A: Action,
    R: 'static,
{
    /// Attach the rest of the pipeline, producing the per-action handler.
    pub fn chain(self, next: Next<S, A, R>) -> Next<S, A, R> {
        Rc::new(move |action: Dispatchable<S, A, R>| self.handle(&next, action))
    }

    pub fn context(&self) -> &DispatchContext<S, A, R> {
        &self.ctx
    }

    /// Handle one action.
    ///
    /// Exactly one branch runs: a thunk is invoked and `next` is skipped;
    /// anything else reaches `next` once.
    pub fn handle(&self, next: &Next<S, A, R>, action: Dispatchable<S, A, R>) -> DispatchOutput<R> {
        tracing::trace!(action = %action.name(), kind = %action.kind(), "Intercepting action");

        match action {
            Dispatchable::Thunk(thunk) if self.config.invokes_thunks() => self.invoke(thunk),
            Dispatchable::Deferred(pending) => self.forward_deferred(next, pending),
            action => next(action),
        }
    }

    fn invoke(&self, thunk: Thunk<S, A, R>) -> DispatchOutput<R> {
        let outcome = thunk.run(self.ctx.dispatcher(), self.ctx.state_reader())?;

        if self.config.notifies_thunk_results() {
            if let Some(pending) = outcome.as_deferred() {
                let action = Dispatchable::Thunk(thunk);
                if let Err(err) = self.notify(pending, &action) {
                    match self.config.observer_failure {
                        ObserverFailure::Propagate => return Err(DispatchError::Observer(err)),
                        ObserverFailure::Isolate => log_isolated(&action, &err),
                    }
                }
            }
        }

        Ok(outcome)
    }

    // The action itself is the pending value the observer hears about.
    fn forward_deferred(&self, next: &Next<S, A, R>, pending: Deferred<R>) -> DispatchOutput<R> {
        let action = Dispatchable::Deferred(pending.clone());

        if self.config.notifies_deferred_actions() {
            if let Err(err) = self.notify(&pending, &action) {
                log_isolated(&action, &err);
            }
        }

        next(action)
    }

    fn notify(&self, pending: &Deferred<R>, action: &Dispatchable<S, A, R>) -> ObserveResult {
        let Some(observer) = &self.observer else {
            return Ok(());
        };

        tracing::debug!(
            action = %action.name(),
            settled = pending.is_settled(),
            "Notifying observer of pending value"
        );
        observer.observe(pending, action, &self.ctx)
    }
}

impl<S, A, R> fmt::Debug for BoundStage<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStage")
            .field("has_observer", &self.observer.is_some())
            .field("config", &self.config)
            .finish()
    }
}

fn log_isolated<S, A: Action, R>(action: &Dispatchable<S, A, R>, err: &BoxError) {
    tracing::warn!(action = %action.name(), error = %err, "Observer failed; dispatch continues");
}
