//! Unified error type surfaced by the runtime.
//!
//! Rejected actions are not errors: they come back as an invalid
//! [`ProcessingResult`](appearance_core::ProcessingResult). Everything here is
//! a request that could not be processed at all.
use std::path::PathBuf;

use appearance_core::{
    ActionSchemaError, EngineError, ErrorSeverity, OracleError, StateCodecError,
    StateValidationError,
};
use thiserror::Error;

use crate::hooks::HookError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("action payload is not valid JSON for any action")]
    ActionDecode(#[source] serde_json::Error),

    #[error("malformed action")]
    MalformedAction(#[from] ActionSchemaError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    StateCodec(#[from] StateCodecError),

    #[error("initial state is invalid")]
    InvalidState(#[from] StateValidationError),

    #[error("accepted state changed across export and import")]
    RoundTripMismatch,

    #[error("critical hook '{hook}' failed")]
    Hook {
        hook: &'static str,
        #[source]
        source: HookError,
    },

    #[error("failed to read config file {path:?}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid runtime config: {0}")]
    InvalidConfig(String),
}

impl RuntimeError {
    /// True for requests rejected before reaching the engine.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::ActionDecode(_) | Self::MalformedAction(_))
    }
}

impl EngineError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActionDecode(_) | Self::MalformedAction(_) | Self::InvalidConfig(_) => {
                ErrorSeverity::Validation
            }
            Self::Oracle(inner) => inner.severity(),
            Self::StateCodec(inner) => inner.severity(),
            Self::InvalidState(inner) => inner.severity(),
            Self::RoundTripMismatch | Self::Hook { .. } => ErrorSeverity::Internal,
            Self::ConfigIo { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActionDecode(_) => "RUNTIME_ACTION_DECODE",
            Self::MalformedAction(inner) => inner.error_code(),
            Self::Oracle(inner) => inner.error_code(),
            Self::StateCodec(inner) => inner.error_code(),
            Self::InvalidState(inner) => inner.error_code(),
            Self::RoundTripMismatch => "RUNTIME_ROUND_TRIP_MISMATCH",
            Self::Hook { .. } => "RUNTIME_HOOK_FAILED",
            Self::ConfigIo { .. } => "RUNTIME_CONFIG_IO",
            Self::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
        }
    }
}
