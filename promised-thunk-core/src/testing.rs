//! Test utilities for promised-thunk pipelines
//!
//! This module provides helpers for testing middleware in isolation:
//!
//! - [`TestHarness`]: a fake store context, a recording `next` stage and a
//!   recording observer
//! - Assertion macros for verifying which actions reached a stage
//!
//! # Example
//!
//! ```ignore
//! use promised_thunk::testing::TestHarness;
//!
//! let mut harness = TestHarness::<AppState, MyAction, bool>::new(AppState::default(), true);
//! let handler = harness.bind(&ThunkStage::with_observer(harness.observer()));
//!
//! handler(MyAction::Increment.into())?;
//!
//! let forwarded = harness.drain_forwarded();
//! assert_dispatched!(forwarded, Dispatchable::Plain(MyAction::Increment));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::action::Dispatchable;
use crate::context::DispatchContext;
use crate::deferred::Deferred;
use crate::observer::ObserveResult;
use crate::outcome::Outcome;
use crate::stage::ThunkStage;
use crate::store::Next;
use crate::Action;

/// One observer call captured by [`TestHarness::observer`].
pub struct Observed<S, A, R> {
    pub pending: Deferred<R>,
    pub action: Dispatchable<S, A, R>,
    pub ctx: DispatchContext<S, A, R>,
}

impl<S, A: std::fmt::Debug, R> std::fmt::Debug for Observed<S, A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observed")
            .field("pending", &self.pending)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

/// Generic test harness for pipeline stages.
///
/// Provides:
/// - A [`DispatchContext`] whose dispatches are recorded instead of reduced
/// - A recording `next` stage
/// - A recording observer
///
/// Both the fake dispatcher and the fake `next` answer every action with
/// `Outcome::Ready(reply)`.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The plain action type (must implement [`Action`])
/// - `R`: The reply type
pub struct TestHarness<S, A, R> {
    state: Rc<RefCell<S>>,
    reply: R,
    forwarded_tx: mpsc::UnboundedSender<Dispatchable<S, A, R>>,
    forwarded_rx: mpsc::UnboundedReceiver<Dispatchable<S, A, R>>,
    dispatched_tx: mpsc::UnboundedSender<Dispatchable<S, A, R>>,
    dispatched_rx: mpsc::UnboundedReceiver<Dispatchable<S, A, R>>,
    observed_tx: mpsc::UnboundedSender<Observed<S, A, R>>,
    observed_rx: mpsc::UnboundedReceiver<Observed<S, A, R>>,
    ctx: DispatchContext<S, A, R>,
}

impl<S, A, R> TestHarness<S, A, R>
where
    S: Clone + 'static,
    A: Action,
    R: Clone + 'static,
{
    /// Create a new test harness with the given state and reply value.
    pub fn new(state: S, reply: R) -> Self {
        let state = Rc::new(RefCell::new(state));
        let (forwarded_tx, forwarded_rx) = mpsc::unbounded_channel();
        let (dispatched_tx, dispatched_rx) = mpsc::unbounded_channel();
        let (observed_tx, observed_rx) = mpsc::unbounded_channel();

        let ctx = {
            let tx = dispatched_tx.clone();
            let reply = reply.clone();
            let state = Rc::clone(&state);
            DispatchContext::from_fns(
                move |action| {
                    let _ = tx.send(action);
                    Ok(Outcome::Ready(reply.clone()))
                },
                move || state.borrow().clone(),
            )
        };

        Self {
            state,
            reply,
            forwarded_tx,
            forwarded_rx,
            dispatched_tx,
            dispatched_rx,
            observed_tx,
            observed_rx,
            ctx,
        }
    }

    /// The fake store context. Clones dispatch into the same recorder.
    pub fn context(&self) -> DispatchContext<S, A, R> {
        self.ctx.clone()
    }

    /// A `next` stage that records every action it receives.
    pub fn next(&self) -> Next<S, A, R> {
        let tx = self.forwarded_tx.clone();
        let reply = self.reply.clone();
        Rc::new(move |action: Dispatchable<S, A, R>| {
            let _ = tx.send(action);
            Ok(Outcome::Ready(reply.clone()))
        })
    }

    /// An observer that records every notification.
    pub fn observer(
        &self,
    ) -> impl Fn(&Deferred<R>, &Dispatchable<S, A, R>, &DispatchContext<S, A, R>) -> ObserveResult + 'static
    {
        let tx = self.observed_tx.clone();
        move |pending: &Deferred<R>, action: &Dispatchable<S, A, R>, ctx: &DispatchContext<S, A, R>| {
            let _ = tx.send(Observed {
                pending: pending.clone(),
                action: action.clone(),
                ctx: ctx.clone(),
            });
            Ok(())
        }
    }

    /// Bind `stage` to the fake context and recording `next`.
    pub fn bind(&self, stage: &ThunkStage<S, A, R>) -> Next<S, A, R> {
        stage.bind(&self.ctx).chain(self.next())
    }

    /// Replace the state seen through the context.
    pub fn set_state(&self, state: S) {
        *self.state.borrow_mut() = state;
    }

    /// Drain all actions that reached `next`.
    pub fn drain_forwarded(&mut self) -> Vec<Dispatchable<S, A, R>> {
        drain(&mut self.forwarded_rx)
    }

    /// Drain all actions dispatched through the context.
    pub fn drain_dispatched(&mut self) -> Vec<Dispatchable<S, A, R>> {
        drain(&mut self.dispatched_rx)
    }

    /// Drain all observer notifications.
    pub fn drain_observed(&mut self) -> Vec<Observed<S, A, R>> {
        drain(&mut self.observed_rx)
    }

    /// Re-dispatch an action into the recorder, as a thunk would.
    pub fn emit(&self, action: impl Into<Dispatchable<S, A, R>>) {
        let _ = self.dispatched_tx.send(action.into());
    }
}

fn drain<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}

/// Assert that a specific action was dispatched.
///
/// # Example
///
/// ```ignore
/// use promised_thunk::assert_dispatched;
///
/// let actions = harness.drain_forwarded();
/// assert_dispatched!(actions, Dispatchable::Plain(Action::Increment));
/// assert_dispatched!(actions, Dispatchable::Deferred(_));
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
#[macro_export]
macro_rules! find_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
///
/// # Example
///
/// ```ignore
/// use promised_thunk::count_dispatched;
///
/// let actions = harness.drain_dispatched();
/// assert_eq!(count_dispatched!(actions, Dispatchable::Plain(Action::Tick)), 3);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
