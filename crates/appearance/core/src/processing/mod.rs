//! Transaction model of one action.
//!
//! A [`ProcessingContext`] is created per action, threaded through the
//! handler, and consumed by `finalize()` or `invalid()` into a
//! [`ProcessingResult`]. Nothing is committed before that: `Valid` is the only
//! outcome from which a caller may adopt the new state.
//!
//! # Module Structure
//!
//! - `context`: the accumulator and the acting-player context
//! - `problem`: rejection taxonomy
//! - `message`: chat messages and action data
//! - `result`: valid/invalid results and their post-processing
//! - `slowdown`: slowdown reasons and totals
//! - `target`: resolved action targets
//! - `module`: command channel for item-module logic
mod context;
mod message;
mod module;
mod problem;
mod result;
mod slowdown;
mod target;

pub use context::{ActionContext, ExecutionContext, ProcessingContext};
pub use message::{ActionData, ActionMessage, ActionMessageId, MessageItem};
pub use module::{ModuleActionContext, ModuleActionReport};
pub use problem::{
    CharacterModifierActionError, InvalidActionReason, ModuleActionError, ModuleFailureReason,
    ModuleRejectReason, Problem,
};
pub use result::{InvalidResult, ProcessingResult, ValidResult};
pub use slowdown::{Slowdown, SlowdownReason};
pub use target::ActionTarget;
