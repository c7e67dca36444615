//! Action catalog.
//!
//! [`AppearanceAction`] is the closed set of requests the engine accepts. It is
//! also the wire contract between client and server: the variant tag and field
//! names serialize to the literal camelCase strings both sides agree on.
//!
//! # Module Structure
//!
//! - `target`: target selectors (a character, or the room inventory)
//! - `schema`: structural checks run before an action reaches the engine

mod schema;
mod target;

pub use schema::ActionSchemaError;
pub use target::ActionTargetSelector;

use std::collections::BTreeMap;

use strum::{AsRefStr, Display, EnumIter};

use crate::env::ItemTemplate;
use crate::state::{
    ArmPose, CharacterId, ColorBundle, ItemContainerPath, ItemId, ItemPath, LegsPose,
    RestrictionOverrideMode, RoomBackground, RoomPosition, View,
};

// ============================================================================
// Module actions
// ============================================================================

/// Action on a lock slot module.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "action", rename_all = "camelCase")
)]
pub enum LockAction {
    Lock {
        #[cfg_attr(feature = "serde", serde(default))]
        password: Option<String>,
    },
    Unlock {
        #[cfg_attr(feature = "serde", serde(default))]
        password: Option<String>,
    },
}

/// Module-specific payload of a `moduleAction`.
///
/// Storage modules have no actions of their own; their contents are addressed
/// through container paths instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "moduleType", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum ModuleActionData {
    Typed { set_variant: String },
    LockSlot { lock_action: LockAction },
}

// ============================================================================
// Randomize
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum RandomizeKind {
    /// Replace worn non-bodypart items.
    Items,
    /// Replace bodyparts as well.
    Full,
}

// ============================================================================
// Action union
// ============================================================================

/// A request to change the global state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum AppearanceAction {
    /// Create a new item from a template and put it into a container.
    Create {
        target: ActionTargetSelector,
        item_id: ItemId,
        item_template: ItemTemplate,
        container: ItemContainerPath,
        #[cfg_attr(feature = "serde", serde(default))]
        insert_before: Option<ItemId>,
    },
    /// Destroy an item.
    Delete {
        target: ActionTargetSelector,
        item: ItemPath,
    },
    /// Move an item to another container, possibly of another target.
    Transfer {
        source: ActionTargetSelector,
        item: ItemPath,
        target: ActionTargetSelector,
        container: ItemContainerPath,
        #[cfg_attr(feature = "serde", serde(default))]
        insert_before: Option<ItemId>,
    },
    /// Reorder an item within its container.
    Move {
        target: ActionTargetSelector,
        item: ItemPath,
        shift: i32,
    },
    Color {
        target: ActionTargetSelector,
        item: ItemPath,
        color: ColorBundle,
    },
    /// Set or clear the custom name and description of an item.
    Customize {
        target: ActionTargetSelector,
        item: ItemPath,
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        description: Option<String>,
    },
    ModuleAction {
        target: ActionTargetSelector,
        item: ItemPath,
        module: String,
        action: ModuleActionData,
    },
    /// Change body bones.
    Body {
        target: CharacterId,
        bones: BTreeMap<String, i16>,
    },
    /// Change pose bones, arms, legs or view.
    Pose {
        target: CharacterId,
        #[cfg_attr(feature = "serde", serde(default))]
        bones: BTreeMap<String, i16>,
        #[cfg_attr(feature = "serde", serde(default))]
        arms: Option<ArmPose>,
        #[cfg_attr(feature = "serde", serde(default))]
        legs: Option<LegsPose>,
        #[cfg_attr(feature = "serde", serde(default))]
        view: Option<View>,
    },
    /// Enter or leave safemode/timeout. Always acts on the player.
    RestrictionOverrideChange { mode: RestrictionOverrideMode },
    /// Replace the player's appearance with a random one.
    Randomize { kind: RandomizeKind, seed: String },
    /// Deploy (`Some`) or store (`None`) a room device from the room inventory.
    RoomDeviceDeploy {
        item: ItemId,
        deployment: Option<RoomPosition>,
    },
    /// Put `character` into a slot of a deployed room device.
    RoomDeviceEnter {
        item: ItemId,
        slot: String,
        character: CharacterId,
        /// Id of the wearable part created on the character.
        item_id: ItemId,
    },
    /// Take whoever occupies `slot` out of a room device.
    RoomDeviceLeave { item: ItemId, slot: String },
    /// Cancel the action attempt of a character.
    ActionAttemptInterrupt { target: CharacterId },
    /// Place a character in the room.
    MoveCharacter {
        target: CharacterId,
        position: RoomPosition,
    },
    /// Change the room layout.
    RoomConfigure { background: RoomBackground },
}

/// Tag of an [`AppearanceAction`], for logging and dispatch bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ActionKind {
    Create,
    Delete,
    Transfer,
    Move,
    Color,
    Customize,
    ModuleAction,
    Body,
    Pose,
    RestrictionOverrideChange,
    Randomize,
    RoomDeviceDeploy,
    RoomDeviceEnter,
    RoomDeviceLeave,
    ActionAttemptInterrupt,
    MoveCharacter,
    RoomConfigure,
}

impl AppearanceAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create { .. } => ActionKind::Create,
            Self::Delete { .. } => ActionKind::Delete,
            Self::Transfer { .. } => ActionKind::Transfer,
            Self::Move { .. } => ActionKind::Move,
            Self::Color { .. } => ActionKind::Color,
            Self::Customize { .. } => ActionKind::Customize,
            Self::ModuleAction { .. } => ActionKind::ModuleAction,
            Self::Body { .. } => ActionKind::Body,
            Self::Pose { .. } => ActionKind::Pose,
            Self::RestrictionOverrideChange { .. } => ActionKind::RestrictionOverrideChange,
            Self::Randomize { .. } => ActionKind::Randomize,
            Self::RoomDeviceDeploy { .. } => ActionKind::RoomDeviceDeploy,
            Self::RoomDeviceEnter { .. } => ActionKind::RoomDeviceEnter,
            Self::RoomDeviceLeave { .. } => ActionKind::RoomDeviceLeave,
            Self::ActionAttemptInterrupt { .. } => ActionKind::ActionAttemptInterrupt,
            Self::MoveCharacter { .. } => ActionKind::MoveCharacter,
            Self::RoomConfigure { .. } => ActionKind::RoomConfigure,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::state::AssetId;

    #[test]
    fn wire_tags_are_camel_case() {
        let action = AppearanceAction::Create {
            target: ActionTargetSelector::character(CharacterId::new("c1")),
            item_id: ItemId::new("i/new"),
            item_template: ItemTemplate::new(AssetId::new("a/shirt")),
            container: ItemContainerPath::root(),
            insert_before: None,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "create");
        assert_eq!(json["target"]["type"], "character");
        assert_eq!(json["target"]["characterId"], "c1");
        assert_eq!(json["itemId"], "i/new");
        assert_eq!(json["itemTemplate"]["asset"], "a/shirt");
    }

    #[test]
    fn decodes_nested_module_action() {
        let json = r#"{
            "type": "moduleAction",
            "target": { "type": "roomInventory" },
            "item": { "container": [], "itemId": "i/chest" },
            "module": "lock",
            "action": { "moduleType": "lockSlot", "lockAction": { "action": "unlock", "password": "1234" } }
        }"#;
        let action: AppearanceAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind(), ActionKind::ModuleAction);
        assert!(matches!(
            action,
            AppearanceAction::ModuleAction {
                action: ModuleActionData::LockSlot {
                    lock_action: LockAction::Unlock { password: Some(_) }
                },
                ..
            }
        ));
    }

    #[test]
    fn kind_names_match_wire_tags() {
        use strum::IntoEnumIterator;
        for kind in ActionKind::iter() {
            let first = kind.as_ref().chars().next().unwrap();
            assert!(first.is_ascii_lowercase(), "{kind}");
        }
        assert_eq!(
            ActionKind::RestrictionOverrideChange.as_ref(),
            "restrictionOverrideChange"
        );
    }
}
