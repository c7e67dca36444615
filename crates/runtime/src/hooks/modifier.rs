//! Character modifier verdicts.

use appearance_core::Problem;

use super::{HookContext, HookCriticality, HookError, ResultHook};

/// Turns the [`ModifierOracle`](appearance_core::ModifierOracle) verdicts on
/// an action into `characterModifierActionError` problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterModifierHook;

impl ResultHook for CharacterModifierHook {
    fn name(&self) -> &'static str {
        "character_modifier"
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Critical
    }

    fn check(&self, ctx: &HookContext<'_>) -> Result<Vec<Problem>, HookError> {
        let errors = ctx
            .oracles
            .modifiers()
            .check_action(ctx.actor, ctx.action, ctx.state);
        Ok(errors.into_iter().map(Problem::from).collect())
    }
}
