//! Space configuration loaded from RON.
//!
//! ```ron
//! (
//!     admins: [1, 7],
//!     body_modification: true,
//!     style_messages: true,
//!     development: (no_restriction_cooldown: false),
//!     safemode_cooldown_ms: Some(60000),
//! )
//! ```
use std::path::Path;

use appearance_core::{AccountId, EngineConfig, SpaceFeatures, StaticSpace};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

/// Switches meant for development spaces only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    /// Safemode and timeout can be left right after entering them.
    pub no_restriction_cooldown: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub admins: Vec<AccountId>,
    pub body_modification: bool,
    pub admin_only_spawn: bool,
    /// Announce reorder, color and customize actions.
    pub style_messages: bool,
    pub development: DevelopmentConfig,
    pub safemode_cooldown_ms: Option<u64>,
    pub timeout_cooldown_ms: Option<u64>,
    /// Export and re-import every accepted state before handing it out.
    pub verify_round_trip: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            body_modification: true,
            admin_only_spawn: false,
            style_messages: false,
            development: DevelopmentConfig::default(),
            safemode_cooldown_ms: None,
            timeout_cooldown_ms: None,
            verify_round_trip: true,
        }
    }
}

impl RuntimeConfig {
    /// Parses a config from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidConfig`] if the text does not parse.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        ron::from_str(content)
            .map_err(|e| RuntimeError::InvalidConfig(format!("Failed to parse config RON: {}", e)))
    }

    /// Loads a config from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::ConfigIo`] if the file cannot be read and
    /// [`RuntimeError::InvalidConfig`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn features(&self) -> SpaceFeatures {
        let mut features = SpaceFeatures::empty();
        features.set(SpaceFeatures::BODY_MODIFICATION, self.body_modification);
        features.set(SpaceFeatures::ADMIN_ONLY_SPAWN, self.admin_only_spawn);
        features.set(SpaceFeatures::STYLE_MESSAGES, self.style_messages);
        features.set(
            SpaceFeatures::DEVELOPMENT_NO_COOLDOWN,
            self.development.no_restriction_cooldown,
        );
        features
    }

    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            safemode_cooldown_ms: self
                .safemode_cooldown_ms
                .unwrap_or(defaults.safemode_cooldown_ms),
            timeout_cooldown_ms: self
                .timeout_cooldown_ms
                .unwrap_or(defaults.timeout_cooldown_ms),
        }
    }

    /// Space policy described by this config.
    pub fn space(&self) -> StaticSpace {
        StaticSpace::new(self.features())
            .with_admins(self.admins.iter().copied())
            .with_config(self.engine_config())
    }
}
