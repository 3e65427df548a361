//! Centralized state store with a composable middleware pipeline

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::action::{Action, Dispatchable};
use crate::context::{DispatchContext, Dispatcher, StateReader};
use crate::error::DispatchError;
use crate::outcome::{DispatchOutput, Outcome};

/// A reducer function that handles plain actions and mutates state
///
/// Its return value becomes the `Outcome::Ready` of the dispatch.
pub type Reducer<S, A, R> = fn(&mut S, A) -> R;

/// The remainder of the pipeline after a given stage.
pub type Next<S, A, R> = Rc<dyn Fn(Dispatchable<S, A, R>) -> DispatchOutput<R>>;

/// Wraps the remainder of the pipeline into a new stage.
pub type Enhancer<S, A, R> = Box<dyn FnOnce(Next<S, A, R>) -> Next<S, A, R>>;

/// A pipeline stage.
///
/// Applied in two steps, mirroring `store => next => action`:
/// [`apply`](Middleware::apply) binds the store's context, and the returned
/// [`Enhancer`] binds the continuation. The resulting [`Next`] is then called
/// once per action.
pub trait Middleware<S, A, R> {
    fn apply(&self, ctx: &DispatchContext<S, A, R>) -> Enhancer<S, A, R>;
}

/// A middleware that forwards everything untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<S: 'static, A: 'static, R: 'static> Middleware<S, A, R> for PassThrough {
    fn apply(&self, _ctx: &DispatchContext<S, A, R>) -> Enhancer<S, A, R> {
        Box::new(|next: Next<S, A, R>| next)
    }
}

/// Chain enhancers around `base`. The first enhancer becomes the outermost stage.
pub fn compose<S, A, R>(enhancers: Vec<Enhancer<S, A, R>>, base: Next<S, A, R>) -> Next<S, A, R> {
    enhancers
        .into_iter()
        .rev()
        .fold(base, |next, enhance| enhance(next))
}

/// Centralized state store with Redux-like reducer pattern
///
/// The store holds the application state, runs every dispatched action through
/// its middleware, and hands plain actions that reach the end of the pipeline
/// to the reducer.
///
/// Dispatch takes `&self`: thunks invoked by a middleware can dispatch again
/// through the store's context while the outer dispatch is still running.
///
/// # Type Parameters
/// * `S` - The application state type
/// * `A` - The plain action type (must implement `Action`)
/// * `R` - What the reducer returns for each plain action
///
/// # Example
/// ```ignore
/// #[derive(Clone, Default)]
/// struct AppState {
///     counter: i32,
/// }
///
/// #[derive(Action, Clone, Debug)]
/// enum MyAction {
///     Increment,
///     Decrement,
/// }
///
/// fn reducer(state: &mut AppState, action: MyAction) -> bool {
///     match action {
///         MyAction::Increment => state.counter += 1,
///         MyAction::Decrement => state.counter -= 1,
///     }
///     true
/// }
///
/// let store = Store::with_middleware(
///     AppState::default(),
///     reducer,
///     vec![Box::new(ThunkStage::new())],
/// );
/// store.dispatch(MyAction::Increment)?;
/// store.dispatch(Dispatchable::thunk(|dispatch, _| dispatch.dispatch(MyAction::Increment)))?;
/// assert_eq!(store.state().counter, 2);
/// ```
pub struct Store<S, A, R> {
    state: Rc<RefCell<S>>,
    chain: Rc<OnceCell<Next<S, A, R>>>,
    ctx: DispatchContext<S, A, R>,
}

impl<S, A, R> Store<S, A, R>
where
    S: Clone + 'static,
    A: Action,
    R: 'static,
{
    /// Create a store without middleware
    pub fn new(state: S, reducer: Reducer<S, A, R>) -> Self {
        Self::with_middleware(state, reducer, Vec::new())
    }

    /// Create a store whose actions pass through `middleware`, first entry outermost
    pub fn with_middleware(
        state: S,
        reducer: Reducer<S, A, R>,
        middleware: Vec<Box<dyn Middleware<S, A, R>>>,
    ) -> Self {
        let state = Rc::new(RefCell::new(state));
        let chain: Rc<OnceCell<Next<S, A, R>>> = Rc::new(OnceCell::new());

        let ctx = DispatchContext::new(
            pipeline_entry(Rc::downgrade(&chain)),
            snapshot_reader(Rc::clone(&state)),
        );

        let enhancers: Vec<_> = middleware.iter().map(|m| m.apply(&ctx)).collect();
        let base = reducer_stage(Rc::clone(&state), reducer);
        chain.get_or_init(|| compose(enhancers, base));

        tracing::debug!(middleware = middleware.len(), "Store created");

        Self { state, chain, ctx }
    }

    /// Dispatch an action through the middleware pipeline
    pub fn dispatch(&self, action: impl Into<Dispatchable<S, A, R>>) -> DispatchOutput<R> {
        self.ctx.dispatch(action)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Read the state without cloning it
    pub fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.state.borrow())
    }

    /// Mutate the state directly
    ///
    /// Use this sparingly - prefer dispatching actions for state changes.
    /// This is useful for initializing state or for cases where the
    /// action pattern doesn't fit well.
    pub fn with_state_mut<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        f(&mut self.state.borrow_mut())
    }

    /// The context handed to middleware, for dispatching from elsewhere
    pub fn context(&self) -> DispatchContext<S, A, R> {
        self.ctx.clone()
    }

    /// Whether the middleware pipeline has been built
    pub fn is_ready(&self) -> bool {
        self.chain.get().is_some()
    }
}

fn pipeline_entry<S, A, R>(chain: Weak<OnceCell<Next<S, A, R>>>) -> Dispatcher<S, A, R>
where
    S: 'static,
    A: 'static,
    R: 'static,
{
    Dispatcher::new(move |action| {
        let chain = chain.upgrade().ok_or(DispatchError::StoreDropped)?;
        let next = chain.get().cloned().ok_or(DispatchError::NotReady)?;
        next(action)
    })
}

fn snapshot_reader<S: Clone + 'static>(state: Rc<RefCell<S>>) -> StateReader<S> {
    StateReader::try_new(move || {
        let current = state.try_borrow().map_err(|_| DispatchError::StateBusy)?;
        Ok(current.clone())
    })
}

fn reducer_stage<S, A, R>(state: Rc<RefCell<S>>, reducer: Reducer<S, A, R>) -> Next<S, A, R>
where
    S: 'static,
    A: Action,
    R: 'static,
{
    Rc::new(move |action: Dispatchable<S, A, R>| match action {
        Dispatchable::Plain(action) => {
            tracing::trace!(action = %action.name(), "Reducing action");
            let mut state = state
                .try_borrow_mut()
                .map_err(|_| DispatchError::StateBusy)?;
            Ok(Outcome::Ready(reducer(&mut state, action)))
        }
        Dispatchable::Deferred(pending) => {
            tracing::debug!("Deferred action reached the reducer; returning it unreduced");
            Ok(Outcome::Pending(pending))
        }
        Dispatchable::Thunk(thunk) => Err(DispatchError::UnhandledThunk {
            label: thunk.label(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::Deferred;
    use std::cell::Cell;

    #[derive(Clone, Default)]
    struct TestState {
        counter: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Increment => "Increment",
                TestAction::Decrement => "Decrement",
                TestAction::NoOp => "NoOp",
            }
        }
    }

    fn test_reducer(state: &mut TestState, action: TestAction) -> bool {
        match action {
            TestAction::Increment => {
                state.counter += 1;
                true
            }
            TestAction::Decrement => {
                state.counter -= 1;
                true
            }
            TestAction::NoOp => false,
        }
    }

    type TestStore = Store<TestState, TestAction, bool>;
    type TestNext = Next<TestState, TestAction, bool>;
    type TestDispatchable = Dispatchable<TestState, TestAction, bool>;

    fn changed(output: DispatchOutput<bool>) -> bool {
        matches!(output, Ok(Outcome::Ready(true)))
    }

    #[test]
    fn test_store_dispatch() {
        let store = TestStore::new(TestState::default(), test_reducer);

        assert!(changed(store.dispatch(TestAction::Increment)));
        assert_eq!(store.state().counter, 1);

        assert!(changed(store.dispatch(TestAction::Increment)));
        assert_eq!(store.state().counter, 2);

        assert!(changed(store.dispatch(TestAction::Decrement)));
        assert_eq!(store.with_state(|s| s.counter), 1);
    }

    #[test]
    fn test_store_noop() {
        let store = TestStore::new(TestState::default(), test_reducer);

        assert!(matches!(store.dispatch(TestAction::NoOp), Ok(Outcome::Ready(false))));
        assert_eq!(store.state().counter, 0);
    }

    #[test]
    fn test_store_state_mut() {
        let store = TestStore::new(TestState::default(), test_reducer);

        store.with_state_mut(|s| s.counter = 100);
        assert_eq!(store.state().counter, 100);
    }

    #[test]
    fn test_thunk_without_stage_is_rejected() {
        let store = TestStore::new(TestState::default(), test_reducer);

        let thunk: TestDispatchable =
            Dispatchable::named_thunk("Load", |_, _| Ok(Outcome::Ready(true)));
        let result = store.dispatch(thunk);
        assert!(matches!(
            result,
            Err(DispatchError::UnhandledThunk { label: "Load" })
        ));
    }

    #[test]
    fn test_deferred_returned_unreduced() {
        let store = TestStore::new(TestState::default(), test_reducer);
        let pending = Deferred::resolved(true);

        let result = store.dispatch(Dispatchable::deferred(pending.clone()));
        match result {
            Ok(Outcome::Pending(returned)) => assert!(returned.ptr_eq(&pending)),
            other => panic!("expected pending outcome, got {other:?}"),
        }
        assert_eq!(store.state().counter, 0);
    }

    struct CountingMiddleware {
        seen: Rc<Cell<usize>>,
    }

    impl Middleware<TestState, TestAction, bool> for CountingMiddleware {
        fn apply(
            &self,
            _ctx: &DispatchContext<TestState, TestAction, bool>,
        ) -> Enhancer<TestState, TestAction, bool> {
            let seen = Rc::clone(&self.seen);
            Box::new(move |next: TestNext| {
                Rc::new(move |action: TestDispatchable| {
                    seen.set(seen.get() + 1);
                    next(action)
                })
            })
        }
    }

    #[test]
    fn test_store_with_middleware() {
        let seen = Rc::new(Cell::new(0));
        let store = TestStore::with_middleware(
            TestState::default(),
            test_reducer,
            vec![
                Box::new(CountingMiddleware {
                    seen: Rc::clone(&seen),
                }),
                Box::new(PassThrough),
            ],
        );

        store.dispatch(TestAction::Increment).unwrap();
        store.dispatch(TestAction::Increment).unwrap();

        assert!(store.is_ready());
        assert_eq!(seen.get(), 2);
        assert_eq!(store.state().counter, 2);
    }

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Middleware<TestState, TestAction, bool> for Recorder {
        fn apply(
            &self,
            _ctx: &DispatchContext<TestState, TestAction, bool>,
        ) -> Enhancer<TestState, TestAction, bool> {
            let tag = self.tag;
            let log = Rc::clone(&self.log);
            Box::new(move |next: TestNext| {
                Rc::new(move |action: TestDispatchable| {
                    log.borrow_mut().push(tag);
                    next(action)
                })
            })
        }
    }

    #[test]
    fn test_first_middleware_is_outermost() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = TestStore::with_middleware(
            TestState::default(),
            test_reducer,
            vec![
                Box::new(Recorder {
                    tag: "outer",
                    log: Rc::clone(&log),
                }),
                Box::new(Recorder {
                    tag: "inner",
                    log: Rc::clone(&log),
                }),
            ],
        );

        store.dispatch(TestAction::NoOp).unwrap();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    struct DispatchOnApply {
        result: Rc<RefCell<Option<DispatchOutput<bool>>>>,
    }

    impl Middleware<TestState, TestAction, bool> for DispatchOnApply {
        fn apply(
            &self,
            ctx: &DispatchContext<TestState, TestAction, bool>,
        ) -> Enhancer<TestState, TestAction, bool> {
            *self.result.borrow_mut() = Some(ctx.dispatch(TestAction::Increment));
            Box::new(|next: TestNext| next)
        }
    }

    #[test]
    fn test_dispatch_during_apply_is_not_ready() {
        let result = Rc::new(RefCell::new(None));
        let store = TestStore::with_middleware(
            TestState::default(),
            test_reducer,
            vec![Box::new(DispatchOnApply {
                result: Rc::clone(&result),
            })],
        );

        assert!(matches!(
            result.borrow_mut().take(),
            Some(Err(DispatchError::NotReady))
        ));
        assert_eq!(store.state().counter, 0);
    }

    #[test]
    fn test_context_outliving_store() {
        let store = TestStore::new(TestState::default(), test_reducer);
        let ctx = store.context();
        ctx.dispatch(TestAction::Increment).unwrap();
        assert_eq!(ctx.get_state().unwrap().counter, 1);

        drop(store);
        assert!(matches!(
            ctx.dispatch(TestAction::Increment),
            Err(DispatchError::StoreDropped)
        ));
        assert_eq!(ctx.get_state().unwrap().counter, 1);
    }

    #[test]
    fn test_reads_during_state_mutation_are_busy() {
        let store = TestStore::new(TestState::default(), test_reducer);
        let ctx = store.context();

        let (read, reduced) = store.with_state_mut(|s| {
            s.counter = 5;
            (ctx.get_state().map(|s| s.counter), ctx.dispatch(TestAction::Increment))
        });

        assert!(matches!(read, Err(DispatchError::StateBusy)));
        assert!(matches!(reduced, Err(DispatchError::StateBusy)));
        assert_eq!(store.state().counter, 5);
    }
}
