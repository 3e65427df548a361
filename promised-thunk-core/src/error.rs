//! Error types

use thiserror::Error;

/// Boxed error produced by user code (thunks and observers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while dispatching an action.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A thunk reached the reducer because no stage invoked it.
    #[error("thunk `{label}` reached the reducer; add a ThunkStage to the store")]
    UnhandledThunk { label: &'static str },

    /// Dispatch was attempted while the store was still applying middleware.
    #[error("cannot dispatch while middleware is being applied")]
    NotReady,

    /// The store behind a dispatch context no longer exists.
    #[error("store has been dropped")]
    StoreDropped,

    /// State was already borrowed when the reducer needed it.
    #[error("state is already borrowed")]
    StateBusy,

    /// Raised by a thunk. The stage returns it as-is.
    #[error("thunk failed: {0}")]
    Thunk(#[source] BoxError),

    /// Raised by an observer configured with `ObserverFailure::Propagate`.
    #[error("observer failed: {0}")]
    Observer(#[source] BoxError),
}

impl DispatchError {
    /// Wrap any error raised inside a thunk.
    pub fn thunk(err: impl Into<BoxError>) -> Self {
        DispatchError::Thunk(err.into())
    }
}

/// A pending value could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeferredError {
    #[error("resolver dropped before the value was supplied")]
    Abandoned,
}

/// Invalid stage configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid stage config: {0}")]
    Json(#[from] serde_json::Error),
}
