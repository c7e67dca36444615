use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::config::EngineConfig;
use crate::state::AccountId;

bitflags! {
    /// Per-space feature switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpaceFeatures: u8 {
        /// Characters may change their bodyparts and body bones.
        const BODY_MODIFICATION       = 1 << 0;
        /// Only admins may create new items.
        const ADMIN_ONLY_SPAWN        = 1 << 1;
        /// Reorder, color and customize actions are announced in chat.
        const STYLE_MESSAGES          = 1 << 2;
        /// Restriction overrides can be left immediately.
        const DEVELOPMENT_NO_COOLDOWN = 1 << 3;
    }
}

/// Space-level policy: admins, features and cooldowns.
pub trait SpaceOracle: Send + Sync {
    fn is_admin(&self, account: AccountId) -> bool;

    fn features(&self) -> SpaceFeatures;

    fn safemode_cooldown_ms(&self) -> u64 {
        EngineConfig::DEFAULT_SAFEMODE_COOLDOWN_MS
    }

    fn timeout_cooldown_ms(&self) -> u64 {
        EngineConfig::DEFAULT_TIMEOUT_COOLDOWN_MS
    }

    fn has_feature(&self, feature: SpaceFeatures) -> bool {
        self.features().contains(feature)
    }
}

/// Fixed space policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticSpace {
    admins: BTreeSet<AccountId>,
    features: SpaceFeatures,
    config: EngineConfig,
}

impl StaticSpace {
    pub fn new(features: SpaceFeatures) -> Self {
        Self {
            admins: BTreeSet::new(),
            features,
            config: EngineConfig::default(),
        }
    }

    pub fn with_admin(mut self, account: AccountId) -> Self {
        self.admins.insert(account);
        self
    }

    pub fn with_admins(mut self, accounts: impl IntoIterator<Item = AccountId>) -> Self {
        self.admins.extend(accounts);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}

impl SpaceOracle for StaticSpace {
    fn is_admin(&self, account: AccountId) -> bool {
        self.admins.contains(&account)
    }

    fn features(&self) -> SpaceFeatures {
        self.features
    }

    fn safemode_cooldown_ms(&self) -> u64 {
        self.config.safemode_cooldown_ms
    }

    fn timeout_cooldown_ms(&self) -> u64 {
        self.config.timeout_cooldown_ms
    }
}
