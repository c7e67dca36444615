//! Hook registry for managing and running result hooks.

use std::sync::Arc;

use appearance_core::Problem;
use tracing::{debug, error, warn};

use super::{CharacterModifierHook, HookContext, HookCriticality, HookError, ResultHook};
use crate::error::{Result, RuntimeError};

/// Ordered set of [`ResultHook`]s.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn ResultHook>]>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn ResultHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// Default hooks include:
    /// - CharacterModifierHook: character modifier verdicts (critical)
    pub fn default_hooks() -> Self {
        Self::new(vec![Arc::new(CharacterModifierHook) as Arc<dyn ResultHook>])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Runs every triggered hook and collects their problems.
    ///
    /// # Error Handling
    ///
    /// - `Critical`: returns the error immediately
    /// - `Important`: logs a warning and skips the hook
    /// - `Optional`: logs at debug level and skips the hook
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Hook`] if a critical hook failed.
    pub fn run(&self, ctx: &HookContext<'_>) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();
        for hook in self.hooks.iter() {
            if !hook.should_trigger(ctx) {
                continue;
            }
            match hook.check(ctx) {
                Ok(found) => problems.extend(found),
                Err(e) => self.handle_hook_error(hook.as_ref(), e)?,
            }
        }
        Ok(problems)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }

    fn handle_hook_error(&self, hook: &dyn ResultHook, error: HookError) -> Result<()> {
        match hook.criticality() {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "critical",
                    error = %error,
                    "Critical hook failed, aborting request"
                );
                return Err(RuntimeError::Hook {
                    hook: hook.name(),
                    source: error,
                });
            }
            HookCriticality::Important => warn!(
                target: "runtime::hooks",
                hook = hook.name(),
                criticality = "important",
                error = %error,
                "Hook failed, continuing"
            ),
            HookCriticality::Optional => debug!(
                target: "runtime::hooks",
                hook = hook.name(),
                criticality = "optional",
                error = %error,
                "Optional hook failed"
            ),
        }
        Ok(())
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.hooks()).finish()
    }
}
