//! Collaborator implementations owned by the runtime.
//!
//! Asset definitions and space policy are immutable once the runtime is up;
//! the dynamic state lives in the [`ActionProcessor`](crate::ActionProcessor).
use std::sync::Arc;

use appearance_core::{
    AssetCatalog, Env, ModifierOracle, NoModifiers, PcgRng, ProcessingEnv, StaticSpace,
};

use crate::config::RuntimeConfig;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) assets: Arc<AssetCatalog>,
    pub(crate) space: Arc<StaticSpace>,
    pub(crate) modifiers: Arc<dyn ModifierOracle>,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    pub fn new(assets: Arc<AssetCatalog>, space: Arc<StaticSpace>) -> Self {
        Self {
            assets,
            space,
            modifiers: Arc::new(NoModifiers),
            rng: PcgRng,
        }
    }

    /// Builds the space policy from `config`.
    pub fn from_config(assets: Arc<AssetCatalog>, config: &RuntimeConfig) -> Self {
        Self::new(assets, Arc::new(config.space()))
    }

    pub fn with_modifiers(mut self, modifiers: Arc<dyn ModifierOracle>) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Converts oracle manager into the environment the engine runs with
    pub fn as_processing_env(&self) -> ProcessingEnv<'_> {
        Env::with_all(self.assets.as_ref(), self.space.as_ref(), &self.rng).as_processing_env()
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    pub fn space(&self) -> &StaticSpace {
        &self.space
    }

    pub fn modifiers(&self) -> &dyn ModifierOracle {
        self.modifiers.as_ref()
    }
}

impl std::fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleManager")
            .field("assets", &self.assets.len())
            .field("space", &self.space)
            .finish_non_exhaustive()
    }
}
