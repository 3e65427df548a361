//! promised-thunk: thunk and promise-aware middleware for Redux-style stores
//!
//! Dispatch plain actions, callables ("thunks") and pending values through
//! the same pipeline. A [`ThunkStage`] invokes thunks with the store's
//! dispatcher and state reader, and tells an optional observer about every
//! pending value it sees.
//!
//! # Example
//! ```ignore
//! use promised_thunk::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum MyAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! fn reducer(count: &mut i32, action: MyAction) -> i32 {
//!     match action {
//!         MyAction::Increment => *count += 1,
//!         MyAction::Decrement => *count -= 1,
//!     }
//!     *count
//! }
//!
//! let stage = ThunkStage::with_observer(|pending, action, _store| {
//!     tracing::info!(action = %action.name(), settled = pending.is_settled(), "pending");
//!     Ok(())
//! });
//! let store = Store::with_middleware(0, reducer, vec![Box::new(stage)]);
//!
//! store.dispatch(MyAction::Increment)?;
//! store.dispatch(Dispatchable::thunk(|dispatch, _| dispatch.dispatch(MyAction::Decrement)))?;
//! ```

// Re-export everything from core
pub use promised_thunk_core::*;

// Re-export derive macros
pub use promised_thunk_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Actions
    pub use promised_thunk_core::{Action, ActionKind, Dispatchable, Thunk};

    // Pending values
    pub use promised_thunk_core::{deferred, Deferred, DispatchOutput, Outcome, Resolver};

    // Stage
    pub use promised_thunk_core::{
        DispatchContext, Dispatcher, Intercept, ObserveResult, Observer, ObserverFailure,
        StageConfig, StateReader, ThunkStage,
    };

    // Store
    pub use promised_thunk_core::{LogFilter, LoggingStage, Middleware, PassThrough, Store};

    // Errors
    pub use promised_thunk_core::{DeferredError, DispatchError};

    // Derive macros
    pub use promised_thunk_macros::Action;
}
