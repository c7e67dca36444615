//! Deterministic appearance rules shared by clients and servers.
//!
//! `appearance-core` decides whether a character may change what it or
//! another character wears, how it is posed, and how room devices are used.
//! One [`AppearanceEngine`] call takes an action, an immutable
//! [`GlobalState`] snapshot and an [`ActionContext`], and returns either a
//! new snapshot with the messages describing the change, or the list of
//! [`Problem`]s that prevented it. The same call runs on a client to predict
//! the outcome and on the server to commit it.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod manipulator;
pub mod module;
pub mod processing;
pub mod restriction;
pub mod state;

mod handlers;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ActionKind, ActionSchemaError, ActionTargetSelector, AppearanceAction, LockAction,
    ModuleActionData, RandomizeKind,
};
pub use config::EngineConfig;
pub use engine::AppearanceEngine;
pub use env::{
    AssetCatalog, AssetDefinition, AssetOracle, Env, ModifierOracle, NoModifiers, OracleError,
    PcgRng, ProcessingEnv, RngOracle, SpaceFeatures, SpaceOracle, StaticSpace,
};
pub use error::{EngineError, ErrorSeverity};
pub use manipulator::GlobalStateManipulator;
pub use processing::{
    ActionContext, ActionMessage, ActionMessageId, ExecutionContext, InvalidActionReason,
    InvalidResult, Problem, ProcessingResult, Slowdown, SlowdownReason, ValidResult,
};
pub use restriction::{ItemInteractionType, PermissionKey, Restriction};
pub use state::{
    AccountId, AssetId, CharacterId, CharacterState, GlobalState, Item, ItemId, ItemPath,
    RoomState, StateCodecError, StateValidationError,
};
