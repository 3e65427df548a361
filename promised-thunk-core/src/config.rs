//! Stage configuration
//!
//! [`StageConfig`] decides which action shapes a [`ThunkStage`](crate::ThunkStage)
//! intercepts and what happens when its observer fails. It can be built in
//! code or loaded from JSON:
//!
//! ```
//! use promised_thunk_core::config::{Intercept, ObserverFailure, StageConfig};
//!
//! let config = StageConfig::from_json(
//!     r#"{ "intercept": "INVOKE_THUNKS | NOTIFY_THUNK_RESULTS", "observer_failure": "propagate" }"#,
//! )
//! .unwrap();
//! assert_eq!(config, StageConfig::catch_promise());
//! assert!(!config.intercept.contains(Intercept::NOTIFY_DEFERRED_ACTIONS));
//! assert_eq!(config.observer_failure, ObserverFailure::Propagate);
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

bitflags! {
    /// Which shapes a stage handles itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Intercept: u8 {
        /// Invoke thunks instead of forwarding them.
        const INVOKE_THUNKS = 1;
        /// Notify the observer when an invoked thunk returns a pending value.
        const NOTIFY_THUNK_RESULTS = 1 << 1;
        /// Notify the observer about pending actions before forwarding them.
        const NOTIFY_DEFERRED_ACTIONS = 1 << 2;
    }
}

impl Default for Intercept {
    fn default() -> Self {
        Intercept::all()
    }
}

/// What to do when an observer returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverFailure {
    /// Log the error and carry on with the decided outcome.
    #[default]
    Isolate,
    /// Return `DispatchError::Observer` from the thunk branch.
    ///
    /// Notifications about pending actions stay isolated so that the action
    /// is still forwarded.
    Propagate,
}

/// Configuration for a [`ThunkStage`](crate::ThunkStage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub intercept: Intercept,
    pub observer_failure: ObserverFailure,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            intercept: Intercept::all(),
            observer_failure: ObserverFailure::Isolate,
        }
    }
}

impl StageConfig {
    /// Invoke thunks and report the pending ones; observer errors propagate.
    pub fn catch_promise() -> Self {
        Self {
            intercept: Intercept::INVOKE_THUNKS | Intercept::NOTIFY_THUNK_RESULTS,
            observer_failure: ObserverFailure::Propagate,
        }
    }

    /// Forward everything, reporting pending actions on the way through.
    pub fn promise_observer() -> Self {
        Self {
            intercept: Intercept::NOTIFY_DEFERRED_ACTIONS,
            observer_failure: ObserverFailure::Isolate,
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_intercept(mut self, intercept: Intercept) -> Self {
        self.intercept = intercept;
        self
    }

    pub fn with_observer_failure(mut self, observer_failure: ObserverFailure) -> Self {
        self.observer_failure = observer_failure;
        self
    }

    #[inline]
    pub fn invokes_thunks(&self) -> bool {
        self.intercept.contains(Intercept::INVOKE_THUNKS)
    }

    #[inline]
    pub fn notifies_thunk_results(&self) -> bool {
        self.intercept.contains(Intercept::NOTIFY_THUNK_RESULTS)
    }

    #[inline]
    pub fn notifies_deferred_actions(&self) -> bool {
        self.intercept.contains(Intercept::NOTIFY_DEFERRED_ACTIONS)
    }
}
