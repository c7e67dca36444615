//! Action processing entry points.
//!
//! The [`AppearanceEngine`] is stateless: one call processes one action
//! against one immutable snapshot and returns one result. Actions that carry
//! a slowdown cannot be applied directly; they go through
//! [`start_attempt`](AppearanceEngine::start_attempt) and
//! [`finish_attempt`](AppearanceEngine::finish_attempt) instead.

mod attempt;

use tracing::debug;

use crate::action::AppearanceAction;
use crate::env::{OracleError, Oracles, ProcessingEnv};
use crate::handlers;
use crate::processing::{ActionContext, ProcessingContext, ProcessingResult};
use crate::state::GlobalState;

/// Processes appearance actions with a fixed set of oracles.
pub struct AppearanceEngine<'a> {
    env: ProcessingEnv<'a>,
}

impl<'a> AppearanceEngine<'a> {
    pub fn new(env: ProcessingEnv<'a>) -> Self {
        Self { env }
    }

    /// Runs the handler of `action` and returns its finalized result.
    ///
    /// The result is not gated on slowdown; see [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if the environment lacks an oracle.
    pub fn process(
        &self,
        action: &AppearanceAction,
        state: &GlobalState,
        context: &ActionContext,
    ) -> Result<ProcessingResult, OracleError> {
        let oracles = Oracles::resolve(&self.env)?;
        let ctx = ProcessingContext::new(oracles, state, context);
        // Spectators and departed characters cannot act
        if ctx.player().is_none() {
            return Ok(ctx.invalid(None));
        }

        let result = handlers::dispatch(action, ctx);
        debug!(
            target: "appearance::engine",
            action = %action.kind(),
            player = %context.player,
            execution = %context.execution,
            valid = result.is_valid(),
            problems = result.problems().len(),
            "processed action"
        );
        Ok(result)
    }

    /// Processes `action` for immediate commit.
    ///
    /// A valid result with a non-zero slowdown is turned into an
    /// `attemptRequired` rejection.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if the environment lacks an oracle.
    pub fn apply(
        &self,
        action: &AppearanceAction,
        state: &GlobalState,
        context: &ActionContext,
    ) -> Result<ProcessingResult, OracleError> {
        Ok(self.process(action, state, context)?.require_immediate())
    }
}

impl std::fmt::Debug for AppearanceEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppearanceEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AssetCatalog, Env, PcgRng, StaticSpace};
    use crate::processing::{InvalidActionReason, Problem};
    use crate::state::{CharacterId, ColorBundle, HexColor, ItemId, ItemPath};
    use crate::action::ActionTargetSelector;
    use crate::testing::{Harness, fixture_state, item};

    pub(super) fn recolor_shirt() -> AppearanceAction {
        AppearanceAction::Color {
            target: ActionTargetSelector::character(CharacterId::new("c1")),
            item: ItemPath::root(ItemId::new("i/c1-shirt")),
            color: ColorBundle::from([("base".to_owned(), HexColor::new("#ff0000"))]),
        }
    }

    /// Harness where c1 wears mittens, so using hands is slowed down.
    pub(super) fn mittened() -> Harness {
        let mut harness = Harness::new();
        harness
            .state
            .character_mut(&CharacterId::new("c1"))
            .unwrap()
            .items
            .push(item("i/mittens", "a/mittens"));
        harness
    }

    #[test]
    fn missing_oracle_is_an_error() {
        let assets = AssetCatalog::new();
        let env: ProcessingEnv<'_> =
            Env::<'_, AssetCatalog, StaticSpace, PcgRng>::new(Some(&assets), None, None)
                .as_processing_env();
        let engine = AppearanceEngine::new(env);

        let result = engine.process(
            &recolor_shirt(),
            &fixture_state(),
            &ActionContext::new(CharacterId::new("c1"), 0),
        );
        assert_eq!(result, Err(OracleError::SpaceNotAvailable));
    }

    #[test]
    fn unknown_player_is_rejected() {
        let harness = Harness::new();
        assert_eq!(
            harness.process("c7", &recolor_shirt()).problems(),
            [Problem::InvalidAction { reason: None }]
        );
    }

    #[test]
    fn apply_requires_attempt_for_slowed_actions() {
        let harness = Harness::new();
        assert!(harness.apply("c1", &recolor_shirt()).is_valid());

        let harness = mittened();
        assert!(harness.process("c1", &recolor_shirt()).is_valid());
        assert_eq!(
            harness.apply("c1", &recolor_shirt()).problems(),
            [Problem::AttemptRequired]
        );
    }

    #[test]
    fn attempt_reasons_are_distinct_from_restrictions() {
        let problem = Problem::invalid(InvalidActionReason::AttemptInProgress);
        assert!(problem.restriction().is_none());
    }
}
