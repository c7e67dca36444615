//! Per-character state: worn items, pose, position and policy settings.

use std::collections::BTreeMap;

use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{AccountId, AssetId, CharacterId, Item, RoomPosition};
use crate::action::AppearanceAction;

/// Where the arms are held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ArmsPosition {
    #[default]
    FrontOfBody,
    BehindBack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum Fingers {
    #[default]
    Spread,
    Fist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmPose {
    pub position: ArmsPosition,
    pub fingers: Fingers,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum LegsPose {
    #[default]
    Standing,
    Kneeling,
    Sitting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum View {
    #[default]
    Front,
    Back,
}

/// Skeleton state. Bones are rotations in degrees, keyed by bone name.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseState {
    pub bones: BTreeMap<String, i16>,
    pub arms: ArmPose,
    pub legs: LegsPose,
    pub view: View,
}

impl PoseState {
    /// Current rotation of `bone`; bones never written are at rest (0).
    pub fn bone(&self, bone: &str) -> i16 {
        self.bones.get(bone).copied().unwrap_or(0)
    }
}

/// Restriction override mode of a character.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum RestrictionOverrideMode {
    #[default]
    Normal,
    /// Character may act on themself freely and nobody may interact with them.
    Safemode,
    /// Nobody may interact with the character, and they may not interact with others.
    Timeout,
}

/// An active override. `mode` is never [`RestrictionOverrideMode::Normal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct RestrictionOverride {
    pub mode: RestrictionOverrideMode,
    /// Earliest time (ms) at which the override may be left.
    pub allow_leave_at: u64,
}

/// An action started as an attempt and waiting for its slowdown to elapse.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ActionAttempt {
    pub action: AppearanceAction,
    pub start: u64,
    pub finish_after: u64,
}

/// Interactions a character can grant or deny to others.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum InteractionId {
    /// Any interaction with the character or their items.
    Interact,
    /// Changing body proportions.
    ModifyBody,
    /// Changing the pose.
    Posing,
}

impl InteractionId {
    pub const fn default_setting(self) -> PermissionSetting {
        match self {
            Self::Interact | Self::Posing => PermissionSetting::Allow,
            Self::ModifyBody => PermissionSetting::Deny,
        }
    }
}

/// Stored answer of a permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum PermissionSetting {
    Allow,
    Deny,
    Prompt,
}

/// Default answer for everybody plus per-actor exceptions.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InteractionConfig {
    pub default: PermissionSetting,
    pub overrides: BTreeMap<CharacterId, PermissionSetting>,
}

impl InteractionConfig {
    pub fn new(default: PermissionSetting) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    pub fn setting_for(&self, actor: &CharacterId) -> PermissionSetting {
        self.overrides.get(actor).copied().unwrap_or(self.default)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct InteractionSettings {
    pub interact: InteractionConfig,
    pub modify_body: InteractionConfig,
    pub posing: InteractionConfig,
}

impl InteractionSettings {
    pub fn get(&self, id: InteractionId) -> &InteractionConfig {
        match id {
            InteractionId::Interact => &self.interact,
            InteractionId::ModifyBody => &self.modify_body,
            InteractionId::Posing => &self.posing,
        }
    }

    pub fn get_mut(&mut self, id: InteractionId) -> &mut InteractionConfig {
        match id {
            InteractionId::Interact => &mut self.interact,
            InteractionId::ModifyBody => &mut self.modify_body,
            InteractionId::Posing => &mut self.posing,
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            interact: InteractionConfig::new(InteractionId::Interact.default_setting()),
            modify_body: InteractionConfig::new(InteractionId::ModifyBody.default_setting()),
            posing: InteractionConfig::new(InteractionId::Posing.default_setting()),
        }
    }
}

/// How a character feels about wearing an asset when others put it on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum AssetPreference {
    Favorite,
    #[default]
    Normal,
    Maybe,
    Prevent,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetPreferences {
    pub assets: BTreeMap<AssetId, AssetPreference>,
}

impl AssetPreferences {
    pub fn get(&self, asset: &AssetId) -> AssetPreference {
        self.assets.get(asset).copied().unwrap_or_default()
    }
}

/// Full state of one character present in the space.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CharacterState {
    pub id: CharacterId,
    pub account: AccountId,
    /// Worn items; bodyparts first, in canonical order.
    pub items: Vec<Item>,
    pub pose: PoseState,
    pub position: RoomPosition,
    pub restriction_override: Option<RestrictionOverride>,
    pub attempting_action: Option<ActionAttempt>,
    pub permissions: InteractionSettings,
    pub asset_preferences: AssetPreferences,
}

impl CharacterState {
    pub fn new(id: CharacterId, account: AccountId) -> Self {
        Self {
            id,
            account,
            items: Vec::new(),
            pose: PoseState::default(),
            position: RoomPosition::default(),
            restriction_override: None,
            attempting_action: None,
            permissions: InteractionSettings::default(),
            asset_preferences: AssetPreferences::default(),
        }
    }

    pub fn override_mode(&self) -> RestrictionOverrideMode {
        self.restriction_override
            .map(|active| active.mode)
            .unwrap_or_default()
    }

    pub fn is_in_safemode(&self) -> bool {
        self.override_mode() == RestrictionOverrideMode::Safemode
    }

    pub fn is_in_timeout(&self) -> bool {
        self.override_mode() == RestrictionOverrideMode::Timeout
    }

    /// The wearable part linking this character to a room device, if any.
    pub fn room_device_part(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.device_link.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_overrides_take_precedence() {
        let mut settings = InteractionSettings::default();
        let friend = CharacterId::new("c2");
        settings
            .get_mut(InteractionId::ModifyBody)
            .overrides
            .insert(friend.clone(), PermissionSetting::Allow);

        let modify_body = settings.get(InteractionId::ModifyBody);
        assert_eq!(modify_body.setting_for(&friend), PermissionSetting::Allow);
        assert_eq!(
            modify_body.setting_for(&CharacterId::new("c3")),
            PermissionSetting::Deny
        );
        assert_eq!(
            settings
                .get(InteractionId::Interact)
                .setting_for(&CharacterId::new("c3")),
            PermissionSetting::Allow
        );
    }

    #[test]
    fn override_mode_defaults_to_normal() {
        let mut character = CharacterState::new(CharacterId::new("c1"), AccountId(1));
        assert_eq!(character.override_mode(), RestrictionOverrideMode::Normal);

        character.restriction_override = Some(RestrictionOverride {
            mode: RestrictionOverrideMode::Timeout,
            allow_leave_at: 10,
        });
        assert!(character.is_in_timeout());
        assert!(!character.is_in_safemode());
    }
}
