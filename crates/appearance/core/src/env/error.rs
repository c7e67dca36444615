//! Oracle access errors.

use crate::error::{EngineError, ErrorSeverity};
use crate::state::AssetId;

/// Errors raised while reading collaborator data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// AssetOracle is not available in the environment.
    #[error("AssetOracle not available")]
    AssetsNotAvailable,

    /// SpaceOracle is not available in the environment.
    #[error("SpaceOracle not available")]
    SpaceNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// Asset definition was not found by id.
    #[error("asset {0} not found")]
    AssetNotFound(AssetId),

    /// The asset exists but items of it are only created by the engine.
    #[error("asset {0} cannot be created from a template")]
    NotCreatable(AssetId),

    #[error("asset {asset} has no color group '{group}'")]
    UnknownColorGroup { asset: AssetId, group: String },

    #[error("asset {asset} has no typed module '{module}' with the requested variant")]
    UnknownModuleVariant { asset: AssetId, module: String },
}

impl EngineError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            // Missing oracles are fatal - engine cannot proceed
            Self::AssetsNotAvailable | Self::SpaceNotAvailable | Self::RngNotAvailable => {
                ErrorSeverity::Fatal
            }
            Self::AssetNotFound(_)
            | Self::NotCreatable(_)
            | Self::UnknownColorGroup { .. }
            | Self::UnknownModuleVariant { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AssetsNotAvailable => "ORACLE_ASSETS_NOT_AVAILABLE",
            Self::SpaceNotAvailable => "ORACLE_SPACE_NOT_AVAILABLE",
            Self::RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            Self::AssetNotFound(_) => "ORACLE_ASSET_NOT_FOUND",
            Self::NotCreatable(_) => "ORACLE_NOT_CREATABLE",
            Self::UnknownColorGroup { .. } => "ORACLE_UNKNOWN_COLOR_GROUP",
            Self::UnknownModuleVariant { .. } => "ORACLE_UNKNOWN_MODULE_VARIANT",
        }
    }
}
