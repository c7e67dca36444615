//! Post-processing hooks layered on finalized results.
//!
//! The engine decides everything it can decide from the state alone. Hooks
//! add the verdicts of collaborators it does not know about, such as
//! character modifiers, as extra problems on the finalized result.
//!
//! # Architecture
//!
//! - Hooks are registered in a [`HookRegistry`] and sorted by priority
//! - Every hook whose `should_trigger()` holds returns its problems
//! - All returned problems are added in one pass, so hook order never changes
//!   which problems are reported, only which hook fails first

mod context;
mod modifier;
mod registry;

pub use context::HookContext;
pub use modifier::CharacterModifierHook;
pub use registry::HookRegistry;

use appearance_core::Problem;
use thiserror::Error;

/// Failure of a hook to reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

/// Defines the criticality level of a hook for error handling.
///
/// - Critical hooks must succeed or the request fails
/// - Important hooks log a warning and are skipped
/// - Optional hooks can fail silently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Hook failure fails the whole request.
    ///
    /// Use for hooks whose verdict may reject the action; skipping them would
    /// accept actions that should have been refused.
    Critical,

    /// Hook failure is logged and the hook is skipped. The default.
    Important,

    /// Hook failure is expected and only logged at debug level.
    Optional,
}

/// Check run against every finalized result.
///
/// Hooks are sorted by priority (lower values run first):
/// - Negative priorities: rule hooks whose verdicts reject actions
/// - Zero: default
/// - Positive priorities: advisory hooks
pub trait ResultHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging).
    fn name(&self) -> &'static str;

    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    fn should_trigger(&self, _ctx: &HookContext<'_>) -> bool {
        true
    }

    /// Returns the problems to add to the result; empty means no objection.
    ///
    /// # Errors
    ///
    /// Returns a [`HookError`] if the hook could not reach a verdict.
    fn check(&self, ctx: &HookContext<'_>) -> Result<Vec<Problem>, HookError>;
}
