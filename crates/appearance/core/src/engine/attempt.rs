//! Two-phase processing of slowed-down actions.

use tracing::trace;

use super::AppearanceEngine;
use crate::action::AppearanceAction;
use crate::env::OracleError;
use crate::processing::{
    ActionContext, InvalidActionReason, InvalidResult, Problem, ProcessingResult, Slowdown,
    ValidResult,
};
use crate::state::{ActionAttempt, GlobalState};

fn rejected(problem: Problem, slowdown: Slowdown) -> ProcessingResult {
    ProcessingResult::Invalid(InvalidResult::new(vec![problem], Vec::new(), slowdown, Vec::new()))
}

impl AppearanceEngine<'_> {
    /// Validates `action` and records it as the player's pending attempt.
    ///
    /// The returned state differs from `state` only by the recorded attempt,
    /// which may be finished once its slowdown has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if the environment lacks an oracle.
    pub fn start_attempt(
        &self,
        action: &AppearanceAction,
        state: &GlobalState,
        context: &ActionContext,
    ) -> Result<ProcessingResult, OracleError> {
        let valid = match self.process(action, state, context)? {
            ProcessingResult::Valid(valid) => valid,
            invalid @ ProcessingResult::Invalid(_) => return Ok(invalid),
        };
        let in_progress = state
            .character(&context.player)
            .is_some_and(|player| player.attempting_action.is_some());
        if in_progress {
            return Ok(rejected(
                Problem::invalid(InvalidActionReason::AttemptInProgress),
                valid.slowdown,
            ));
        }

        let attempt = ActionAttempt {
            action: action.clone(),
            start: context.now,
            finish_after: context.now.saturating_add(valid.slowdown.total_ms()),
        };
        trace!(
            target: "appearance::engine",
            player = %context.player,
            finish_after = attempt.finish_after,
            "attempt started"
        );

        let mut next = state.clone();
        match next.character_mut(&context.player) {
            Some(player) => player.attempting_action = Some(attempt),
            None => return Ok(rejected(Problem::InvalidAction { reason: None }, valid.slowdown)),
        }
        Ok(ProcessingResult::Valid(ValidResult {
            state: next,
            messages: Vec::new(),
            data: Vec::new(),
            slowdown: valid.slowdown,
            required_permissions: valid.required_permissions,
        }))
    }

    /// Completes the player's pending attempt of `action`.
    ///
    /// The action is processed again against the current state, with the
    /// attempt cleared, so anything that changed in the meantime counts.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] if the environment lacks an oracle.
    pub fn finish_attempt(
        &self,
        action: &AppearanceAction,
        state: &GlobalState,
        context: &ActionContext,
    ) -> Result<ProcessingResult, OracleError> {
        let Some(attempt) = state
            .character(&context.player)
            .and_then(|player| player.attempting_action.as_ref())
        else {
            return Ok(rejected(
                Problem::invalid(InvalidActionReason::NoAttempt),
                Slowdown::default(),
            ));
        };
        if attempt.action != *action {
            return Ok(rejected(
                Problem::invalid(InvalidActionReason::AttemptMismatch),
                Slowdown::default(),
            ));
        }
        if context.now < attempt.finish_after {
            return Ok(rejected(Problem::TooSoon, Slowdown::default()));
        }

        let mut cleared = state.clone();
        if let Some(player) = cleared.character_mut(&context.player) {
            player.attempting_action = None;
        }
        self.process(action, &cleared, context)
    }
}
