//! Embedding layer for the appearance engine.
//!
//! A client or server embeds an [`ActionProcessor`] per space. The processor
//! owns the current [`GlobalState`](appearance_core::GlobalState), runs wire
//! actions through [`appearance_core::AppearanceEngine`], layers hook verdicts
//! on the results and commits the accepted ones.
//!
//! Modules are organized by responsibility:
//! - [`config`] loads the space configuration from RON
//! - [`oracle`] owns the collaborator implementations
//! - [`hooks`] provides post-processing checks on finalized results
//! - [`processor`] hosts the request pipeline
pub mod config;
pub mod error;
pub mod hooks;
pub mod oracle;
pub mod processor;

pub use config::{DevelopmentConfig, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use hooks::{
    CharacterModifierHook, HookContext, HookCriticality, HookError, HookRegistry, ResultHook,
};
pub use oracle::OracleManager;
pub use processor::{ActionProcessor, decode_action};
