//! Global structural validation.
//!
//! Runs at the end of every processed action and on import. A state that
//! passes is safe to commit; anything else is rejected as a whole.

use std::collections::BTreeSet;

use super::{
    CharacterId, CharacterState, GlobalState, Item, ItemId, ModuleState, RestrictionOverrideMode,
    RoomState,
};
use crate::config::EngineConfig;
use crate::env::{AssetDefinition, AssetKind, AssetOracle, ModuleKind};
use crate::error::{EngineError, ErrorSeverity};
use crate::state::AssetId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateValidationError {
    #[error("item {item} uses unknown asset {asset}")]
    UnknownAsset { item: ItemId, asset: AssetId },

    #[error("item {item} has modules that do not match its asset")]
    ModuleMismatch { item: ItemId },

    #[error("item {item} has unknown variant in module '{module}'")]
    UnknownVariant { item: ItemId, module: String },

    #[error("item {item} has unknown color group '{group}'")]
    UnknownColorGroup { item: ItemId, group: String },

    #[error("item {item} has malformed color in group '{group}'")]
    MalformedColor { item: ItemId, group: String },

    #[error("item {item} carries bookkeeping that does not match its asset kind")]
    BookkeepingMismatch { item: ItemId },

    #[error("item id {0} appears more than once")]
    DuplicateItem(ItemId),

    #[error("item {0} is nested too deeply")]
    TooDeep(ItemId),

    #[error("module '{module}' of item {item} holds too many items")]
    ModuleOverfilled { item: ItemId, module: String },

    #[error("item {item} cannot be stored in module '{module}'")]
    ModuleContentNotAllowed { item: ItemId, module: String },

    #[error("bodypart item {0} is outside a character's root list")]
    MisplacedBodypart(ItemId),

    #[error("character {character} bodyparts are not first in canonical order")]
    BodypartOrder { character: CharacterId },

    #[error("character {character} lacks required bodypart '{bodypart}'")]
    MissingBodypart {
        character: CharacterId,
        bodypart: String,
    },

    #[error("character {character} wears more than one '{bodypart}'")]
    DuplicateBodypart {
        character: CharacterId,
        bodypart: String,
    },

    #[error("room device {0} is outside the room root list")]
    MisplacedRoomDevice(ItemId),

    #[error("wearable part {0} is outside a character's root list")]
    MisplacedWearablePart(ItemId),

    #[error("wearable part {item} of {character} has no matching device slot")]
    DanglingWearablePart { character: CharacterId, item: ItemId },

    #[error("device {device} slot '{slot}' lists {character} who does not wear its part")]
    DanglingOccupant {
        device: ItemId,
        slot: String,
        character: CharacterId,
    },

    #[error("character {0} occupies more than one room device slot")]
    MultipleDevices(CharacterId),

    #[error("stored room device {0} still has occupants")]
    StoredDeviceOccupied(ItemId),

    #[error("room device {0} is deployed outside the room")]
    DeploymentOutOfBounds(ItemId),

    #[error("character {0} stands outside the room")]
    PositionOutOfBounds(CharacterId),

    #[error("character {character} has invalid bone '{bone}'")]
    InvalidBone { character: CharacterId, bone: String },

    #[error("character {0} stores a normal restriction override")]
    StoredNormalOverride(CharacterId),

    #[error("character entry {0} holds a different character id")]
    CharacterKeyMismatch(CharacterId),

    #[error("room background must have positive dimensions")]
    InvalidBackground,
}

impl EngineError for StateValidationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAsset { .. } => "STATE_UNKNOWN_ASSET",
            Self::ModuleMismatch { .. } => "STATE_MODULE_MISMATCH",
            Self::UnknownVariant { .. } => "STATE_UNKNOWN_VARIANT",
            Self::UnknownColorGroup { .. } => "STATE_UNKNOWN_COLOR_GROUP",
            Self::MalformedColor { .. } => "STATE_MALFORMED_COLOR",
            Self::BookkeepingMismatch { .. } => "STATE_BOOKKEEPING_MISMATCH",
            Self::DuplicateItem(_) => "STATE_DUPLICATE_ITEM",
            Self::TooDeep(_) => "STATE_TOO_DEEP",
            Self::ModuleOverfilled { .. } => "STATE_MODULE_OVERFILLED",
            Self::ModuleContentNotAllowed { .. } => "STATE_MODULE_CONTENT_NOT_ALLOWED",
            Self::MisplacedBodypart(_) => "STATE_MISPLACED_BODYPART",
            Self::BodypartOrder { .. } => "STATE_BODYPART_ORDER",
            Self::MissingBodypart { .. } => "STATE_MISSING_BODYPART",
            Self::DuplicateBodypart { .. } => "STATE_DUPLICATE_BODYPART",
            Self::MisplacedRoomDevice(_) => "STATE_MISPLACED_ROOM_DEVICE",
            Self::MisplacedWearablePart(_) => "STATE_MISPLACED_WEARABLE_PART",
            Self::DanglingWearablePart { .. } => "STATE_DANGLING_WEARABLE_PART",
            Self::DanglingOccupant { .. } => "STATE_DANGLING_OCCUPANT",
            Self::MultipleDevices(_) => "STATE_MULTIPLE_DEVICES",
            Self::StoredDeviceOccupied(_) => "STATE_STORED_DEVICE_OCCUPIED",
            Self::DeploymentOutOfBounds(_) => "STATE_DEPLOYMENT_OUT_OF_BOUNDS",
            Self::PositionOutOfBounds(_) => "STATE_POSITION_OUT_OF_BOUNDS",
            Self::InvalidBone { .. } => "STATE_INVALID_BONE",
            Self::StoredNormalOverride(_) => "STATE_STORED_NORMAL_OVERRIDE",
            Self::CharacterKeyMismatch(_) => "STATE_CHARACTER_KEY_MISMATCH",
            Self::InvalidBackground => "STATE_INVALID_BACKGROUND",
        }
    }
}

type ValidationResult = Result<(), StateValidationError>;

/// Which root list an item tree hangs from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Root {
    Character,
    Room,
}

pub(super) fn validate_global_state(
    state: &GlobalState,
    assets: &dyn AssetOracle,
) -> ValidationResult {
    validate_room(&state.room, assets)?;
    for (id, character) in &state.characters {
        if *id != character.id {
            return Err(StateValidationError::CharacterKeyMismatch(id.clone()));
        }
        validate_character(character, &state.room, assets)?;
    }
    validate_device_occupancy(state)
}

fn validate_room(room: &RoomState, assets: &dyn AssetOracle) -> ValidationResult {
    if !room.background.is_well_formed() {
        return Err(StateValidationError::InvalidBackground);
    }
    validate_item_tree(&room.items, Root::Room, assets)?;
    for item in &room.items {
        let Some(device) = &item.device else {
            continue;
        };
        match device.deployment {
            Some(position) if !room.background.contains(position) => {
                return Err(StateValidationError::DeploymentOutOfBounds(item.id.clone()));
            }
            None if !device.slots.is_empty() => {
                return Err(StateValidationError::StoredDeviceOccupied(item.id.clone()));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_character(
    character: &CharacterState,
    room: &RoomState,
    assets: &dyn AssetOracle,
) -> ValidationResult {
    if character.restriction_override.map(|active| active.mode)
        == Some(RestrictionOverrideMode::Normal)
    {
        return Err(StateValidationError::StoredNormalOverride(
            character.id.clone(),
        ));
    }
    if !room.background.contains(character.position) {
        return Err(StateValidationError::PositionOutOfBounds(
            character.id.clone(),
        ));
    }
    for (bone, value) in &character.pose.bones {
        let known = assets.bone(bone).is_some();
        if !known || value.unsigned_abs() > EngineConfig::BONE_LIMIT.unsigned_abs() {
            return Err(StateValidationError::InvalidBone {
                character: character.id.clone(),
                bone: bone.clone(),
            });
        }
    }

    validate_item_tree(&character.items, Root::Character, assets)?;
    validate_bodyparts(character, assets)?;
    validate_wearable_parts(character, room)
}

fn validate_bodyparts(character: &CharacterState, assets: &dyn AssetOracle) -> ValidationResult {
    let order_error = || StateValidationError::BodypartOrder {
        character: character.id.clone(),
    };

    let mut seen_other = false;
    let mut last_index = 0;
    let mut worn: Vec<&str> = Vec::new();
    for item in &character.items {
        let bodypart = assets
            .asset(&item.asset)
            .and_then(AssetDefinition::bodypart);
        match bodypart {
            Some(bodypart) => {
                let index = assets.bodypart_index(bodypart).ok_or_else(order_error)?;
                if seen_other || index < last_index {
                    return Err(order_error());
                }
                last_index = index;
                worn.push(bodypart);
            }
            None => seen_other = true,
        }
    }

    for definition in assets.bodyparts() {
        let count = worn
            .iter()
            .filter(|name| **name == definition.name)
            .count();
        if definition.required && count == 0 {
            return Err(StateValidationError::MissingBodypart {
                character: character.id.clone(),
                bodypart: definition.name.clone(),
            });
        }
        if !definition.allow_multiple && count > 1 {
            return Err(StateValidationError::DuplicateBodypart {
                character: character.id.clone(),
                bodypart: definition.name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_wearable_parts(character: &CharacterState, room: &RoomState) -> ValidationResult {
    let mut linked = 0;
    for item in &character.items {
        let Some(link) = &item.device_link else {
            continue;
        };
        linked += 1;
        let occupant = room
            .items
            .iter()
            .find(|device| device.id == link.device)
            .and_then(|device| device.device.as_ref())
            .filter(|device| device.deployment.is_some())
            .and_then(|device| device.slots.get(&link.slot));
        if occupant != Some(&character.id) {
            return Err(StateValidationError::DanglingWearablePart {
                character: character.id.clone(),
                item: item.id.clone(),
            });
        }
    }
    if linked > 1 {
        return Err(StateValidationError::MultipleDevices(character.id.clone()));
    }
    Ok(())
}

/// Every occupant that is present must wear the matching part, and nobody may
/// occupy two slots.
fn validate_device_occupancy(state: &GlobalState) -> ValidationResult {
    let mut occupants = BTreeSet::new();
    for device_item in &state.room.items {
        let Some(device) = &device_item.device else {
            continue;
        };
        for (slot, occupant) in &device.slots {
            if !occupants.insert(occupant) {
                return Err(StateValidationError::MultipleDevices(occupant.clone()));
            }
            let Some(character) = state.characters.get(occupant) else {
                continue;
            };
            let wears_part = character.items.iter().any(|item| {
                item.device_link
                    .as_ref()
                    .is_some_and(|link| link.device == device_item.id && link.slot == *slot)
            });
            if !wears_part {
                return Err(StateValidationError::DanglingOccupant {
                    device: device_item.id.clone(),
                    slot: slot.clone(),
                    character: occupant.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Per-item checks over a whole tree, plus id uniqueness within it.
fn validate_item_tree(items: &[Item], root: Root, assets: &dyn AssetOracle) -> ValidationResult {
    let mut ids = BTreeSet::new();
    validate_items(items, root, 0, &mut ids, assets)
}

fn validate_items<'a>(
    items: &'a [Item],
    root: Root,
    depth: usize,
    ids: &mut BTreeSet<&'a ItemId>,
    assets: &dyn AssetOracle,
) -> ValidationResult {
    for item in items {
        if !ids.insert(&item.id) {
            return Err(StateValidationError::DuplicateItem(item.id.clone()));
        }
        if depth > EngineConfig::MAX_CONTAINER_DEPTH {
            return Err(StateValidationError::TooDeep(item.id.clone()));
        }
        let asset = assets
            .asset(&item.asset)
            .ok_or_else(|| StateValidationError::UnknownAsset {
                item: item.id.clone(),
                asset: item.asset.clone(),
            })?;

        validate_placement(item, asset, root, depth)?;
        validate_item(item, asset)?;

        for (name, module) in &item.modules {
            let Some(contents) = module.contents() else {
                continue;
            };
            validate_module_contents(item, asset, name, module, assets)?;
            validate_items(contents, root, depth + 1, ids, assets)?;
        }
    }
    Ok(())
}

fn validate_placement(
    item: &Item,
    asset: &AssetDefinition,
    root: Root,
    depth: usize,
) -> ValidationResult {
    let on_character_root = root == Root::Character && depth == 0;
    if asset.is_bodypart() && !on_character_root {
        return Err(StateValidationError::MisplacedBodypart(item.id.clone()));
    }
    if asset.is_wearable_part() && !on_character_root {
        return Err(StateValidationError::MisplacedWearablePart(item.id.clone()));
    }
    if asset.is_room_device() && !(root == Root::Room && depth == 0) {
        return Err(StateValidationError::MisplacedRoomDevice(item.id.clone()));
    }
    Ok(())
}

fn validate_item(item: &Item, asset: &AssetDefinition) -> ValidationResult {
    let bookkeeping_matches = match asset.kind {
        AssetKind::Personal { .. } => {
            item.device.is_none() && item.device_link.is_none() && item.lock.is_none()
        }
        AssetKind::Lock(_) => {
            item.device.is_none() && item.device_link.is_none() && item.lock.is_some()
        }
        AssetKind::RoomDevice { .. } => {
            item.device.is_some() && item.device_link.is_none() && item.lock.is_none()
        }
        AssetKind::RoomDeviceWearablePart => {
            item.device.is_none() && item.device_link.is_some() && item.lock.is_none()
        }
    };
    if !bookkeeping_matches {
        return Err(StateValidationError::BookkeepingMismatch {
            item: item.id.clone(),
        });
    }

    for (group, color) in &item.color {
        if !asset.color_groups.contains(group) {
            return Err(StateValidationError::UnknownColorGroup {
                item: item.id.clone(),
                group: group.clone(),
            });
        }
        if !color.is_well_formed() {
            return Err(StateValidationError::MalformedColor {
                item: item.id.clone(),
                group: group.clone(),
            });
        }
    }

    if item.modules.len() != asset.modules.len() {
        return Err(StateValidationError::ModuleMismatch {
            item: item.id.clone(),
        });
    }
    for (name, module) in &item.modules {
        let definition = asset
            .modules
            .get(name)
            .ok_or_else(|| StateValidationError::ModuleMismatch {
                item: item.id.clone(),
            })?;
        match (&definition.kind, module) {
            (ModuleKind::Typed { .. }, ModuleState::Typed { variant }) => {
                if definition.typed_variant(variant).is_none() {
                    return Err(StateValidationError::UnknownVariant {
                        item: item.id.clone(),
                        module: name.clone(),
                    });
                }
            }
            (ModuleKind::Storage { .. }, ModuleState::Storage { .. })
            | (ModuleKind::LockSlot { .. }, ModuleState::LockSlot { .. }) => {}
            _ => {
                return Err(StateValidationError::ModuleMismatch {
                    item: item.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_module_contents(
    item: &Item,
    asset: &AssetDefinition,
    name: &str,
    module: &ModuleState,
    assets: &dyn AssetOracle,
) -> ValidationResult {
    let overfilled = || StateValidationError::ModuleOverfilled {
        item: item.id.clone(),
        module: name.to_owned(),
    };
    let not_allowed = || StateValidationError::ModuleContentNotAllowed {
        item: item.id.clone(),
        module: name.to_owned(),
    };

    match (module, asset.modules.get(name).map(|definition| &definition.kind)) {
        (ModuleState::Storage { contents }, Some(ModuleKind::Storage { max_count })) => {
            if contents.len() > *max_count {
                return Err(overfilled());
            }
        }
        (ModuleState::LockSlot { contents }, Some(ModuleKind::LockSlot { .. })) => {
            if contents.len() > 1 {
                return Err(overfilled());
            }
            let all_locks = contents.iter().all(|content| {
                assets
                    .asset(&content.asset)
                    .is_some_and(|definition| definition.lock().is_some())
            });
            if !all_locks {
                return Err(not_allowed());
            }
        }
        _ => return Err(not_allowed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DeviceLink, RoomPosition};
    use crate::testing::{fixture_assets, fixture_state, item};

    #[test]
    fn fixture_state_is_valid() {
        let assets = fixture_assets();
        assert_eq!(fixture_state().validate(&assets), Ok(()));
    }

    #[test]
    fn bodyparts_must_lead_in_canonical_order() {
        let assets = fixture_assets();
        let mut state = fixture_state();
        let character = state.character_mut(&CharacterId::new("c1")).unwrap();
        character.items.swap(0, 1);

        assert!(matches!(
            state.validate(&assets),
            Err(StateValidationError::BodypartOrder { .. })
        ));
    }

    #[test]
    fn duplicate_single_bodypart_is_rejected() {
        let assets = fixture_assets();
        let mut state = fixture_state();
        let character = state.character_mut(&CharacterId::new("c1")).unwrap();
        character.items.insert(2, item("i/eyes-extra", "a/eyes-green"));

        assert!(matches!(
            state.validate(&assets),
            Err(StateValidationError::DuplicateBodypart { .. })
        ));
    }

    #[test]
    fn wearable_part_needs_matching_slot() {
        let assets = fixture_assets();
        let mut state = fixture_state();
        let character = state.character_mut(&CharacterId::new("c1")).unwrap();
        let mut part = item("i/part", "a/cage-occupant");
        part.device_link = Some(DeviceLink {
            device: ItemId::new("i/cage"),
            slot: "inside".into(),
        });
        character.items.push(part);

        assert!(matches!(
            state.validate(&assets),
            Err(StateValidationError::DanglingWearablePart { .. })
        ));
    }

    #[test]
    fn positions_stay_inside_the_room() {
        let assets = fixture_assets();
        let mut state = fixture_state();
        state.character_mut(&CharacterId::new("c2")).unwrap().position =
            RoomPosition::new(-1, 0);

        let error = state.validate(&assets).unwrap_err();
        assert_eq!(error.error_code(), "STATE_POSITION_OUT_OF_BOUNDS");
    }

    #[test]
    fn stored_normal_override_is_rejected() {
        let assets = fixture_assets();
        let mut state = fixture_state();
        state
            .character_mut(&CharacterId::new("c1"))
            .unwrap()
            .restriction_override = Some(crate::state::RestrictionOverride {
            mode: RestrictionOverrideMode::Normal,
            allow_leave_at: 0,
        });

        assert!(matches!(
            state.validate(&assets),
            Err(StateValidationError::StoredNormalOverride(_))
        ));
    }
}
