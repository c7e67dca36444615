//! Owns the authoritative state of one space and runs requests against it.
//!
//! Every request goes through the same pipeline:
//!
//! 1. decode and schema-check the payload (JSON entry points only)
//! 2. run the engine for the requested phase
//! 3. layer hook problems on the finalized result
//! 4. gate immediate applies on slowdown
//! 5. verify and commit accepted states
use appearance_core::{
    ActionContext, AppearanceAction, AppearanceEngine, CharacterId, GlobalState, ProcessingResult,
};
use tracing::{debug, error, info, info_span};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::hooks::{HookContext, HookRegistry};
use crate::oracle::OracleManager;

/// Decodes a wire action and rejects structurally malformed ones.
///
/// # Errors
///
/// Returns [`RuntimeError::ActionDecode`] for payloads that are not an
/// action and [`RuntimeError::MalformedAction`] for schema violations.
pub fn decode_action(payload: &str) -> Result<AppearanceAction> {
    let action: AppearanceAction =
        serde_json::from_str(payload).map_err(RuntimeError::ActionDecode)?;
    action.validate_schema()?;
    Ok(action)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    /// Client-side prediction; never commits.
    Verify,
    Apply,
    StartAttempt,
    FinishAttempt,
}

impl Phase {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Apply => "apply",
            Self::StartAttempt => "start_attempt",
            Self::FinishAttempt => "finish_attempt",
        }
    }
}

#[derive(Debug)]
pub struct ActionProcessor {
    oracles: OracleManager,
    hooks: HookRegistry,
    config: RuntimeConfig,
    state: GlobalState,
}

impl ActionProcessor {
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidState`] if `state` breaks a structural rule.
    pub fn new(
        oracles: OracleManager,
        hooks: HookRegistry,
        config: RuntimeConfig,
        state: GlobalState,
    ) -> Result<Self> {
        state.validate(oracles.assets())?;
        Ok(Self {
            oracles,
            hooks,
            config,
            state,
        })
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn into_state(self) -> GlobalState {
        self.state
    }

    /// Predicts the outcome of `action` without committing it.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn verify(
        &self,
        player: &CharacterId,
        action: &AppearanceAction,
        now: u64,
    ) -> Result<ProcessingResult> {
        let context = ActionContext::new(player.clone(), now).client_only();
        self.evaluate(Phase::Verify, action, &context)
    }

    /// Applies `action` immediately; slowed-down actions need an attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if an oracle is missing, a critical hook fails, or
    /// the accepted state does not survive export and import.
    pub fn apply(
        &mut self,
        player: &CharacterId,
        action: &AppearanceAction,
        now: u64,
    ) -> Result<ProcessingResult> {
        self.run(Phase::Apply, player, action, now)
    }

    /// [`apply`](Self::apply) for a wire payload.
    ///
    /// # Errors
    ///
    /// Also rejects malformed payloads, see [`decode_action`].
    pub fn apply_json(
        &mut self,
        player: &CharacterId,
        payload: &str,
        now: u64,
    ) -> Result<ProcessingResult> {
        let action = decode_action(payload)?;
        self.apply(player, &action, now)
    }

    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn start_attempt(
        &mut self,
        player: &CharacterId,
        action: &AppearanceAction,
        now: u64,
    ) -> Result<ProcessingResult> {
        self.run(Phase::StartAttempt, player, action, now)
    }

    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn finish_attempt(
        &mut self,
        player: &CharacterId,
        action: &AppearanceAction,
        now: u64,
    ) -> Result<ProcessingResult> {
        self.run(Phase::FinishAttempt, player, action, now)
    }

    fn run(
        &mut self,
        phase: Phase,
        player: &CharacterId,
        action: &AppearanceAction,
        now: u64,
    ) -> Result<ProcessingResult> {
        let span = info_span!(
            target: "runtime::processor",
            "process",
            phase = phase.as_str(),
            action = %action.kind(),
            player = %player,
        );
        let _guard = span.enter();

        let context = ActionContext::new(player.clone(), now);
        let result = self.evaluate(phase, action, &context)?;
        if let ProcessingResult::Valid(valid) = &result {
            if self.config.verify_round_trip {
                self.verify_round_trip(&valid.state)?;
            }
            self.state = valid.state.clone();
        }
        Ok(result)
    }

    fn evaluate(
        &self,
        phase: Phase,
        action: &AppearanceAction,
        context: &ActionContext,
    ) -> Result<ProcessingResult> {
        let engine = AppearanceEngine::new(self.oracles.as_processing_env());
        let result = match phase {
            Phase::Verify | Phase::Apply => engine.process(action, &self.state, context)?,
            Phase::StartAttempt => engine.start_attempt(action, &self.state, context)?,
            Phase::FinishAttempt => engine.finish_attempt(action, &self.state, context)?,
        };

        let problems = self.hooks.run(&HookContext {
            actor: &context.player,
            action,
            state: &self.state,
            result: &result,
            oracles: &self.oracles,
        })?;
        let mut result = result.add_additional_problems(problems);
        if phase == Phase::Apply {
            result = result.require_immediate();
        }

        match &result {
            ProcessingResult::Valid(valid) => info!(
                target: "runtime::processor",
                phase = phase.as_str(),
                messages = valid.messages.len(),
                slowdown_ms = valid.slowdown.total_ms(),
                "action accepted"
            ),
            ProcessingResult::Invalid(invalid) => debug!(
                target: "runtime::processor",
                phase = phase.as_str(),
                problems = ?invalid.problems,
                prompt = ?invalid.prompt,
                "action rejected"
            ),
        }
        Ok(result)
    }

    fn verify_round_trip(&self, state: &GlobalState) -> Result<()> {
        let bytes = state.export()?;
        let imported = GlobalState::import(&bytes, self.oracles.assets())?;
        if imported != *state {
            error!(
                target: "runtime::processor",
                bytes = bytes.len(),
                "accepted state changed across export and import"
            );
            return Err(RuntimeError::RoundTripMismatch);
        }
        Ok(())
    }
}
