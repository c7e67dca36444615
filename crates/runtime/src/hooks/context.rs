//! Execution context provided to hooks during evaluation.

use appearance_core::{AppearanceAction, CharacterId, GlobalState, ProcessingResult};

use crate::oracle::OracleManager;

/// Read-only view of one processed action.
pub struct HookContext<'a> {
    pub actor: &'a CharacterId,

    pub action: &'a AppearanceAction,

    /// State the action was processed against
    pub state: &'a GlobalState,

    /// Finalized engine result, before any hook ran
    pub result: &'a ProcessingResult,

    pub oracles: &'a OracleManager,
}
