//! End-to-end tests: a store with a ThunkStage in its pipeline

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use promised_thunk::prelude::*;
use promised_thunk::{assert_dispatched, LoggingStage, TestHarness};
use tokio::sync::mpsc;

#[derive(Clone, Debug, Default, PartialEq)]
struct Counter {
    value: i64,
    history: Vec<&'static str>,
}

#[derive(Action, Clone, Debug, PartialEq)]
enum CounterAction {
    Add(i64),
    Reset,
}

fn reducer(state: &mut Counter, action: CounterAction) -> i64 {
    state.history.push(action.name());
    match action {
        CounterAction::Add(n) => state.value += n,
        CounterAction::Reset => state.value = 0,
    }
    state.value
}

type CounterDispatch = Dispatchable<Counter, CounterAction, i64>;
type Stage = ThunkStage<Counter, CounterAction, i64>;
type Calls = Rc<RefCell<Vec<(Deferred<i64>, CounterDispatch)>>>;

/// A store whose observer records every notification.
fn observed_store(config: StageConfig) -> (Store<Counter, CounterAction, i64>, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let stage = Stage::with_observer(move |pending, action, _store| {
        seen.borrow_mut().push((pending.clone(), action.clone()));
        Ok(())
    })
    .config(config);

    let store = Store::with_middleware(Counter::default(), reducer, vec![Box::new(stage)]);
    (store, calls)
}

fn ready(output: DispatchOutput<i64>) -> i64 {
    match output {
        Ok(Outcome::Ready(value)) => value,
        other => panic!("expected ready outcome, got {other:?}"),
    }
}

#[test]
fn test_plain_action_reaches_reducer() {
    let (store, calls) = observed_store(StageConfig::default());

    assert_eq!(ready(store.dispatch(CounterAction::Add(42))), 42);
    assert_eq!(store.state().value, 42);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_thunk_result_returned_without_reducing() {
    let (store, calls) = observed_store(StageConfig::default());

    let seven: CounterDispatch = Dispatchable::thunk(|_, _| Ok(Outcome::Ready(7)));
    assert_eq!(ready(store.dispatch(seven)), 7);

    assert_eq!(store.state(), Counter::default());
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_pending_thunk_result_reported_once() {
    let (store, calls) = observed_store(StageConfig::default());

    let (_resolver, pending) = deferred();
    let returned = pending.clone();
    let thunk = Thunk::named("Fetch", move |_, _| Ok(Outcome::Pending(returned.clone())));

    let outcome = store.dispatch(Dispatchable::Thunk(thunk.clone())).unwrap();
    assert!(outcome.as_deferred().is_some_and(|d| d.ptr_eq(&pending)));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.ptr_eq(&pending));
    assert!(calls[0].1.as_thunk().is_some_and(|t| t.ptr_eq(&thunk)));
    assert_eq!(store.state().history, Vec::<&str>::new());
}

#[test]
fn test_deferred_action_reported_and_forwarded() {
    let (store, calls) = observed_store(StageConfig::default());

    let (_resolver, pending) = deferred();
    let outcome = store.dispatch(Dispatchable::deferred(pending.clone())).unwrap();

    // The reducer cannot reduce a pending value, so it comes back unchanged.
    assert!(outcome.as_deferred().is_some_and(|d| d.ptr_eq(&pending)));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.ptr_eq(&pending));
    assert!(calls[0].1.as_deferred().is_some_and(|d| d.ptr_eq(&pending)));
}

#[test]
fn test_stage_without_observer() {
    let store = Store::with_middleware(Counter::default(), reducer, vec![Box::new(Stage::new())]);

    assert_eq!(ready(store.dispatch(CounterAction::Add(1))), 1);

    let (_resolver, pending) = deferred();
    let inner = pending.clone();
    let outcome = store
        .dispatch(Dispatchable::thunk(move |_, _| Ok(Outcome::Pending(inner.clone()))))
        .unwrap();
    assert!(outcome.is_pending());
    assert!(store.dispatch(Dispatchable::deferred(pending)).unwrap().is_pending());
}

#[test]
fn test_thunks_dispatch_reentrantly() {
    let (store, _calls) = observed_store(StageConfig::default());

    let add_twice: CounterDispatch =
        Dispatchable::named_thunk("AddTwice", |dispatch, get_state| {
            dispatch.dispatch(CounterAction::Add(2))?;
            let add_three: CounterDispatch =
                Dispatchable::thunk(|dispatch, _| dispatch.dispatch(CounterAction::Add(3)));
            dispatch.dispatch(add_three)?;
            Ok(Outcome::Ready(get_state.get()?.value))
        });

    assert_eq!(ready(store.dispatch(add_twice)), 5);
    assert_eq!(store.state().history, vec!["Add", "Add"]);
}

#[test]
fn test_thunk_reads_state_snapshot() {
    let (store, _calls) = observed_store(StageConfig::default());
    store.dispatch(CounterAction::Add(10)).unwrap();

    let double: CounterDispatch = CounterDispatch::thunk(|dispatch, get_state| {
        let before = get_state.get()?.value;
        dispatch.dispatch(CounterAction::Add(before))?;
        Ok(Outcome::Ready(before))
    });

    assert_eq!(ready(store.dispatch(double)), 10);
    assert_eq!(store.state().value, 20);
}

#[test]
fn test_thunk_reading_state_during_mutation_fails() {
    let (store, _calls) = observed_store(StageConfig::default());

    let peek: CounterDispatch =
        CounterDispatch::thunk(|_, get_state| Ok(Outcome::Ready(get_state.get()?.value)));
    let result = store.with_state_mut(|counter| {
        counter.value = 3;
        store.dispatch(peek)
    });

    assert!(matches!(result, Err(DispatchError::StateBusy)));
    assert_eq!(ready(store.dispatch(CounterAction::Add(1))), 4);
}

#[test]
fn test_thunk_failure_aborts_dispatch() {
    let (store, calls) = observed_store(StageConfig::default());

    let failing: CounterDispatch = Dispatchable::thunk(|dispatch, _| {
        dispatch.dispatch(CounterAction::Add(1))?;
        Err(DispatchError::thunk("quota exceeded"))
    });

    let err = store.dispatch(failing).unwrap_err();
    assert_eq!(err.to_string(), "thunk failed: quota exceeded");
    // What the thunk dispatched before failing stays applied.
    assert_eq!(store.state().value, 1);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_promise_observer_lets_thunks_through() {
    let (store, _calls) = observed_store(StageConfig::promise_observer());

    let thunk: CounterDispatch =
        Dispatchable::named_thunk("Orphan", |_, _| Ok(Outcome::Ready(0)));
    assert!(matches!(
        store.dispatch(thunk),
        Err(DispatchError::UnhandledThunk { label: "Orphan" })
    ));
}

#[test]
fn test_config_from_json() {
    let config = StageConfig::from_json(
        r#"{ "intercept": "INVOKE_THUNKS | NOTIFY_DEFERRED_ACTIONS", "observer_failure": "isolate" }"#,
    )
    .unwrap();
    let (store, calls) = observed_store(config);

    let (_resolver, pending) = deferred();
    let inner = pending.clone();
    store
        .dispatch(Dispatchable::thunk(move |_, _| Ok(Outcome::Pending(inner.clone()))))
        .unwrap();
    assert!(calls.borrow().is_empty());

    store.dispatch(Dispatchable::deferred(pending)).unwrap();
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_logging_stage_outermost() {
    let filter = LogFilter::all().with_kinds([ActionKind::Thunk, ActionKind::Plain]);
    let store = Store::with_middleware(
        Counter::default(),
        reducer,
        vec![Box::new(LoggingStage::new(filter)), Box::new(Stage::new())],
    );

    let thunk: CounterDispatch =
        Dispatchable::thunk(|dispatch, _| dispatch.dispatch(CounterAction::Reset));
    assert_eq!(ready(store.dispatch(CounterAction::Add(4))), 4);
    assert_eq!(ready(store.dispatch(thunk)), 0);
}

#[test]
fn test_harness_with_stage() {
    let mut harness = TestHarness::<Counter, CounterAction, i64>::new(Counter::default(), -1);
    let handler = harness.bind(&Stage::with_observer(harness.observer()));

    assert_eq!(ready(handler(CounterAction::Reset.into())), -1);
    handler(Dispatchable::thunk(|dispatch, _| dispatch.dispatch(CounterAction::Add(9)))).unwrap();

    let forwarded = harness.drain_forwarded();
    assert_dispatched!(forwarded, Dispatchable::Plain(CounterAction::Reset));

    let dispatched = harness.drain_dispatched();
    assert_dispatched!(dispatched, Dispatchable::Plain(CounterAction::Add(9)));
    assert!(harness.drain_observed().is_empty());
}

#[tokio::test]
async fn test_observer_waits_for_settlement() {
    let (settled_tx, mut settled_rx) = mpsc::unbounded_channel();
    let stage = Stage::with_observer(move |pending, action, _store| {
        let pending = pending.clone();
        let name = action.name();
        let tx = settled_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send((name, pending.settled().await));
        });
        Ok(())
    });
    let store = Store::with_middleware(Counter::default(), reducer, vec![Box::new(stage)]);

    let fetch: CounterDispatch = Dispatchable::named_thunk("FetchRemote", |_, _| {
        let (resolver, pending) = deferred();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            resolver.resolve(128);
        });
        Ok(Outcome::Pending(pending))
    });

    let outcome = store.dispatch(fetch).unwrap();
    assert!(outcome.is_pending());

    let (name, value) = settled_rx.recv().await.unwrap();
    assert_eq!(name, "FetchRemote");
    assert_eq!(value, Ok(128));
    assert_eq!(outcome.peek(), Some(128));
}

#[tokio::test]
async fn test_abandoned_work_reported_to_waiter() {
    let store = Store::with_middleware(Counter::default(), reducer, vec![Box::new(Stage::new())]);

    let outcome = store
        .dispatch(Dispatchable::thunk(|_, _| {
            let (resolver, pending) = deferred::<i64>();
            drop(resolver);
            Ok(Outcome::Pending(pending))
        }))
        .unwrap();

    let pending = outcome.into_deferred().unwrap();
    assert_eq!(pending.settled().await, Err(DeferredError::Abandoned));
}
