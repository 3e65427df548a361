//! Core types for promised-thunk
//!
//! This crate provides a Redux-style dispatch pipeline and the middleware
//! stage that gives it thunks and pending values.
//!
//! # Core Concepts
//!
//! - **Dispatchable**: What gets dispatched: a thunk, a pending value, or a plain action
//! - **Store**: Centralized state container with a middleware pipeline and reducer
//! - **ThunkStage**: Middleware that invokes thunks and reports pending values
//! - **Deferred**: Handle to a value that will arrive later
//! - **Observer**: Callback told about every pending value the stage sees
//!
//! # Basic Example
//!
//! ```ignore
//! use promised_thunk_core::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! enum MyAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     counter: i32,
//! }
//!
//! fn reducer(state: &mut AppState, action: MyAction) -> i32 {
//!     match action {
//!         MyAction::Increment => state.counter += 1,
//!         MyAction::Decrement => state.counter -= 1,
//!     }
//!     state.counter
//! }
//!
//! let store = Store::with_middleware(
//!     AppState::default(),
//!     reducer,
//!     vec![Box::new(ThunkStage::new())],
//! );
//! store.dispatch(MyAction::Increment)?;
//! ```
//!
//! # Thunks and Pending Values
//!
//! A thunk is dispatched like any action but is invoked by [`ThunkStage`]
//! with the store's dispatcher and state reader. It may dispatch more actions
//! and may return a [`Deferred`] handle for work that finishes later:
//!
//! ```ignore
//! let stage = ThunkStage::with_observer(|pending, action, _store| {
//!     tracing::info!(action = %action.name(), "started {pending:?}");
//!     Ok(())
//! });
//!
//! let fetch = Dispatchable::named_thunk("FetchCount", |dispatch, get_state| {
//!     let (resolver, pending) = deferred();
//!     let start = get_state.get()?.counter;
//!     tokio::spawn(async move {
//!         let value = load_count(start).await;
//!         resolver.resolve(value);
//!     });
//!     dispatch.dispatch(MyAction::Increment)?;
//!     Ok(Outcome::Pending(pending))
//! });
//! ```
//!
//! The stage never awaits a `Deferred`; callers and observers decide whether
//! to wait on [`Deferred::settled`].

pub mod action;
pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod logging;
pub mod observer;
pub mod outcome;
pub mod stage;
pub mod store;
pub mod testing;

// Action exports
pub use action::{classify, Action, ActionKind, Dispatchable, Thunk};

// Pending value exports
pub use deferred::{deferred, Deferred, Resolver};
pub use outcome::{DispatchOutput, Outcome};

// Context and observer exports
pub use context::{DispatchContext, Dispatcher, StateReader};
pub use observer::{ObserveResult, Observer};

// Stage exports
pub use config::{Intercept, ObserverFailure, StageConfig};
pub use stage::{BoundStage, ThunkStage};

// Store exports
pub use store::{compose, Enhancer, Middleware, Next, PassThrough, Reducer, Store};

// Logging exports
pub use logging::{glob_match, LogFilter, LoggingStage};

// Error exports
pub use error::{BoxError, ConfigError, DeferredError, DispatchError};

// Testing exports
pub use testing::{Observed, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionKind, Dispatchable, Thunk};
    pub use crate::config::{Intercept, ObserverFailure, StageConfig};
    pub use crate::context::{DispatchContext, Dispatcher, StateReader};
    pub use crate::deferred::{deferred, Deferred, Resolver};
    pub use crate::error::{DispatchError, DeferredError};
    pub use crate::logging::{LogFilter, LoggingStage};
    pub use crate::observer::{ObserveResult, Observer};
    pub use crate::outcome::{DispatchOutput, Outcome};
    pub use crate::stage::ThunkStage;
    pub use crate::store::{Middleware, PassThrough, Store};
}
