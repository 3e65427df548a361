//! Action logging with name and kind filtering
//!
//! [`LoggingStage`] is a middleware that emits a `tracing` event before and
//! after every action it forwards. [`LogFilter`] narrows which actions are
//! logged, by [`ActionKind`] and by glob patterns matched against
//! [`Dispatchable::name`].
//!
//! # Example
//!
//! ```ignore
//! use promised_thunk::logging::{LogFilter, LoggingStage};
//!
//! // Outermost, so thunks and pending actions show up before the stage handles them
//! let store = Store::with_middleware(
//!     AppState::default(),
//!     reducer,
//!     vec![Box::new(LoggingStage::default()), Box::new(ThunkStage::new())],
//! );
//!
//! // Only thunks labeled Fetch*
//! let filter = LogFilter::new(Some("Fetch*"), None).with_kinds([ActionKind::Thunk]);
//! let logging = LoggingStage::new(filter);
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, Dispatchable};
use crate::context::DispatchContext;
use crate::store::{Enhancer, Middleware, Next};

/// Which actions a [`LoggingStage`] reports.
///
/// An action is logged when its kind is listed in `kinds` (or `kinds` is
/// empty), its name matches one of `include` (or `include` is empty), and
/// its name matches none of `exclude`.
///
/// Name patterns support `*` (any run of characters) and `?` (one character):
/// `Fetch*` matches every thunk labeled FetchUser, FetchPosts and so on, and
/// `Deferred` matches pending actions.
///
/// The default logs everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub kinds: Vec<ActionKind>,
}

impl LogFilter {
    /// Build a filter from comma-separated name patterns
    ///
    /// # Example
    /// ```
    /// use promised_thunk_core::logging::LogFilter;
    ///
    /// let filter = LogFilter::new(Some("Fetch*,Connect"), Some("FetchAvatar"));
    /// assert!(filter.matches_name("FetchUser"));
    /// assert!(filter.matches_name("Connect"));
    /// assert!(!filter.matches_name("FetchAvatar"));
    /// assert!(!filter.matches_name("Disconnect"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include: include.map(split_patterns).unwrap_or_default(),
            exclude: exclude.map(split_patterns).unwrap_or_default(),
            kinds: Vec::new(),
        }
    }

    /// A filter that logs every action
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict logging to the given action kinds.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ActionKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn matches_kind(&self, kind: ActionKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| glob_match(p, name));
        included && !self.exclude.iter().any(|p| glob_match(p, name))
    }

    /// Whether `action` passes both the kind and the name filters.
    pub fn should_log<S, A: Action, R>(&self, action: &Dispatchable<S, A, R>) -> bool {
        self.matches_kind(action.kind()) && self.matches_name(action.name())
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Middleware that logs actions as they pass through (for debugging)
///
/// Place it first to see thunks and pending actions before a
/// [`ThunkStage`](crate::ThunkStage) handles them, or after the stage to see
/// only what reaches the reducer.
#[derive(Debug, Clone, Default)]
pub struct LoggingStage {
    filter: LogFilter,
}

impl LoggingStage {
    pub fn new(filter: LogFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }
}

impl<S, A, R> Middleware<S, A, R> for LoggingStage
where
    S: 'static,
    A: Action,
    R: 'static,
{
    fn apply(&self, _ctx: &DispatchContext<S, A, R>) -> Enhancer<S, A, R> {
        let filter = self.filter.clone();
        Box::new(move |next: Next<S, A, R>| {
            Rc::new(move |action: Dispatchable<S, A, R>| {
                if !filter.should_log(&action) {
                    return next(action);
                }
                let name = action.name();

                tracing::debug!(action = %name, kind = %action.kind(), "Dispatching action");
                let output = next(action);
                match &output {
                    Ok(outcome) => tracing::debug!(
                        action = %name,
                        pending = outcome.is_pending(),
                        "Action processed"
                    ),
                    Err(err) => tracing::debug!(action = %name, error = %err, "Action failed"),
                }
                output
            })
        })
    }
}

/// Match `text` against a glob `pattern` (`*` and `?` wildcards).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let mut pattern_chars = pattern.chars();
    match pattern_chars.next() {
        None => text.is_empty(),
        Some('*') => {
            let rest = pattern.trim_start_matches('*');
            if rest.is_empty() {
                return true;
            }
            text.char_indices()
                .map(|(i, _)| &text[i..])
                .any(|tail| glob_match(rest, tail))
        }
        Some(wanted) => {
            let mut text_chars = text.chars();
            match text_chars.next() {
                Some(c) if wanted == '?' || wanted == c => {
                    glob_match(pattern_chars.as_str(), text_chars.as_str())
                }
                _ => false,
            }
        }
    }
}
