//! Self-evaluating permissions.

use std::fmt;

use crate::state::{AssetId, AssetPreference, CharacterId, CharacterState, InteractionId, PermissionSetting};

/// Verdict of a permission for one actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum PermissionResult {
    Allow,
    Deny,
    /// The owner must approve the action explicitly.
    Prompt,
}

impl From<PermissionSetting> for PermissionResult {
    fn from(setting: PermissionSetting) -> Self {
        match setting {
            PermissionSetting::Allow => Self::Allow,
            PermissionSetting::Deny => Self::Deny,
            PermissionSetting::Prompt => Self::Prompt,
        }
    }
}

/// Which permission of its owner a [`Permission`] stands for.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "camelCase")
)]
pub enum PermissionKey {
    Interaction { interaction: InteractionId },
    AssetPreference { asset: AssetId },
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interaction { interaction } => write!(f, "interaction:{interaction}"),
            Self::AssetPreference { asset } => write!(f, "assetPreference:{asset}"),
        }
    }
}

/// A permission together with the character owning it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionRef {
    pub owner: CharacterId,
    pub key: PermissionKey,
}

impl PermissionRef {
    pub fn interaction(owner: CharacterId, interaction: InteractionId) -> Self {
        Self {
            owner,
            key: PermissionKey::Interaction { interaction },
        }
    }

    pub fn asset_preference(owner: CharacterId, asset: AssetId) -> Self {
        Self {
            owner,
            key: PermissionKey::AssetPreference { asset },
        }
    }
}

/// A capability a character grants, denies or asks about.
pub trait Permission {
    fn owner(&self) -> &CharacterId;

    fn key(&self) -> PermissionKey;

    fn evaluate(&self, actor: &CharacterId) -> PermissionResult;

    fn to_ref(&self) -> PermissionRef {
        PermissionRef {
            owner: self.owner().clone(),
            key: self.key(),
        }
    }
}

/// Interaction permission backed by the owner's interaction settings.
pub struct InteractionPermission<'a> {
    owner: &'a CharacterState,
    interaction: InteractionId,
}

impl<'a> InteractionPermission<'a> {
    pub fn new(owner: &'a CharacterState, interaction: InteractionId) -> Self {
        Self { owner, interaction }
    }
}

impl Permission for InteractionPermission<'_> {
    fn owner(&self) -> &CharacterId {
        &self.owner.id
    }

    fn key(&self) -> PermissionKey {
        PermissionKey::Interaction {
            interaction: self.interaction,
        }
    }

    fn evaluate(&self, actor: &CharacterId) -> PermissionResult {
        if *actor == self.owner.id {
            return PermissionResult::Allow;
        }
        self.owner
            .permissions
            .get(self.interaction)
            .setting_for(actor)
            .into()
    }
}

/// Whether others may put an asset on the owner.
pub struct AssetPreferencePermission<'a> {
    owner: &'a CharacterState,
    asset: AssetId,
}

impl<'a> AssetPreferencePermission<'a> {
    pub fn new(owner: &'a CharacterState, asset: AssetId) -> Self {
        Self { owner, asset }
    }
}

impl Permission for AssetPreferencePermission<'_> {
    fn owner(&self) -> &CharacterId {
        &self.owner.id
    }

    fn key(&self) -> PermissionKey {
        PermissionKey::AssetPreference {
            asset: self.asset.clone(),
        }
    }

    fn evaluate(&self, actor: &CharacterId) -> PermissionResult {
        if *actor == self.owner.id {
            return PermissionResult::Allow;
        }
        match self.owner.asset_preferences.get(&self.asset) {
            AssetPreference::Favorite | AssetPreference::Normal => PermissionResult::Allow,
            AssetPreference::Maybe => PermissionResult::Prompt,
            AssetPreference::Prevent => PermissionResult::Deny,
        }
    }
}
