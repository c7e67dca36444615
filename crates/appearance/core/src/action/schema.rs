//! Structural validation of action payloads.
//!
//! These checks only look at the action itself, never at the state. An action
//! failing them is a malformed request and must be rejected before it reaches
//! the engine; it never produces a `Problem`.

use std::collections::BTreeMap;

use super::{AppearanceAction, ActionTargetSelector, LockAction, ModuleActionData};
use crate::config::EngineConfig;
use crate::error::{EngineError, ErrorSeverity};
use crate::state::{CharacterId, ColorBundle, ItemContainerPath, ItemId, ItemPath};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionSchemaError {
    #[error("malformed character id '{0}'")]
    CharacterId(String),

    #[error("malformed item id '{0}'")]
    ItemId(String),

    #[error("malformed asset id '{0}'")]
    AssetId(String),

    #[error("container path nests {depth} levels (max {max})")]
    ContainerTooDeep { depth: usize, max: usize },

    #[error("module name must be 1..={max} characters")]
    ModuleName { max: usize },

    #[error("malformed color '{color}' for group '{group}'")]
    Color { group: String, color: String },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("bone '{bone}' rotation {value} outside ±{limit}")]
    BoneOutOfRange { bone: String, value: i16, limit: i16 },

    #[error("room background must have positive dimensions")]
    Background,
}

impl EngineError for ActionSchemaError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CharacterId(_) => "SCHEMA_CHARACTER_ID",
            Self::ItemId(_) => "SCHEMA_ITEM_ID",
            Self::AssetId(_) => "SCHEMA_ASSET_ID",
            Self::ContainerTooDeep { .. } => "SCHEMA_CONTAINER_TOO_DEEP",
            Self::ModuleName { .. } => "SCHEMA_MODULE_NAME",
            Self::Color { .. } => "SCHEMA_COLOR",
            Self::TooLong { .. } => "SCHEMA_TOO_LONG",
            Self::Empty(_) => "SCHEMA_EMPTY",
            Self::BoneOutOfRange { .. } => "SCHEMA_BONE_OUT_OF_RANGE",
            Self::Background => "SCHEMA_BACKGROUND",
        }
    }
}

type SchemaResult = Result<(), ActionSchemaError>;

impl AppearanceAction {
    /// Checks identifiers, lengths, colors and ranges of every field.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_schema(&self) -> SchemaResult {
        match self {
            Self::Create {
                target,
                item_id,
                item_template,
                container,
                insert_before,
            } => {
                check_target(target)?;
                check_item_id(item_id)?;
                if !item_template.asset.is_well_formed() {
                    return Err(ActionSchemaError::AssetId(item_template.asset.0.clone()));
                }
                check_colors(&item_template.color)?;
                check_text(
                    "name",
                    item_template.name.as_deref(),
                    EngineConfig::MAX_ITEM_NAME_LENGTH,
                )?;
                check_text(
                    "description",
                    item_template.description.as_deref(),
                    EngineConfig::MAX_ITEM_DESCRIPTION_LENGTH,
                )?;
                for module in item_template.modules.keys() {
                    check_module_name(module)?;
                }
                check_container(container)?;
                insert_before.iter().try_for_each(check_item_id)
            }
            Self::Delete { target, item } => {
                check_target(target)?;
                check_item_path(item)
            }
            Self::Transfer {
                source,
                item,
                target,
                container,
                insert_before,
            } => {
                check_target(source)?;
                check_item_path(item)?;
                check_target(target)?;
                check_container(container)?;
                insert_before.iter().try_for_each(check_item_id)
            }
            Self::Move { target, item, .. } => {
                check_target(target)?;
                check_item_path(item)
            }
            Self::Color {
                target,
                item,
                color,
            } => {
                check_target(target)?;
                check_item_path(item)?;
                check_colors(color)
            }
            Self::Customize {
                target,
                item,
                name,
                description,
            } => {
                check_target(target)?;
                check_item_path(item)?;
                check_text("name", name.as_deref(), EngineConfig::MAX_ITEM_NAME_LENGTH)?;
                check_text(
                    "description",
                    description.as_deref(),
                    EngineConfig::MAX_ITEM_DESCRIPTION_LENGTH,
                )
            }
            Self::ModuleAction {
                target,
                item,
                module,
                action,
            } => {
                check_target(target)?;
                check_item_path(item)?;
                check_module_name(module)?;
                match action {
                    ModuleActionData::Typed { set_variant } => {
                        check_non_empty("variant", set_variant)
                    }
                    ModuleActionData::LockSlot { lock_action } => match lock_action {
                        LockAction::Lock { password } | LockAction::Unlock { password } => {
                            check_password(password.as_deref())
                        }
                    },
                }
            }
            Self::Body { target, bones } => {
                check_character_id(target)?;
                check_bones(bones)
            }
            Self::Pose { target, bones, .. } => {
                check_character_id(target)?;
                check_bones(bones)
            }
            Self::RestrictionOverrideChange { .. } => Ok(()),
            Self::Randomize { seed, .. } => {
                check_non_empty("seed", seed)?;
                check_text(
                    "seed",
                    Some(seed),
                    EngineConfig::MAX_RANDOMIZE_SEED_LENGTH,
                )
            }
            Self::RoomDeviceDeploy { item, .. } => check_item_id(item),
            Self::RoomDeviceEnter {
                item,
                slot,
                character,
                item_id,
            } => {
                check_item_id(item)?;
                check_non_empty("slot", slot)?;
                check_character_id(character)?;
                check_item_id(item_id)
            }
            Self::RoomDeviceLeave { item, slot } => {
                check_item_id(item)?;
                check_non_empty("slot", slot)
            }
            Self::ActionAttemptInterrupt { target } => check_character_id(target),
            Self::MoveCharacter { target, .. } => check_character_id(target),
            Self::RoomConfigure { background } => {
                if background.is_well_formed() {
                    Ok(())
                } else {
                    Err(ActionSchemaError::Background)
                }
            }
        }
    }
}

fn check_character_id(id: &CharacterId) -> SchemaResult {
    if id.is_well_formed() {
        Ok(())
    } else {
        Err(ActionSchemaError::CharacterId(id.0.clone()))
    }
}

fn check_item_id(id: &ItemId) -> SchemaResult {
    if id.is_well_formed() {
        Ok(())
    } else {
        Err(ActionSchemaError::ItemId(id.0.clone()))
    }
}

fn check_target(target: &ActionTargetSelector) -> SchemaResult {
    target.character_id().map_or(Ok(()), check_character_id)
}

fn check_module_name(module: &str) -> SchemaResult {
    let max = EngineConfig::MAX_MODULE_NAME_LENGTH;
    if module.is_empty() || module.chars().count() > max {
        return Err(ActionSchemaError::ModuleName { max });
    }
    Ok(())
}

fn check_container(container: &ItemContainerPath) -> SchemaResult {
    let max = EngineConfig::MAX_CONTAINER_DEPTH;
    if container.depth() > max {
        return Err(ActionSchemaError::ContainerTooDeep {
            depth: container.depth(),
            max,
        });
    }
    for step in container.steps() {
        check_item_id(&step.item)?;
        check_module_name(&step.module)?;
    }
    Ok(())
}

fn check_item_path(path: &ItemPath) -> SchemaResult {
    check_container(&path.container)?;
    check_item_id(&path.item_id)
}

fn check_colors(colors: &ColorBundle) -> SchemaResult {
    match colors.iter().find(|(_, color)| !color.is_well_formed()) {
        Some((group, color)) => Err(ActionSchemaError::Color {
            group: group.clone(),
            color: color.0.clone(),
        }),
        None => Ok(()),
    }
}

fn check_text(field: &'static str, value: Option<&str>, max: usize) -> SchemaResult {
    match value {
        Some(text) if text.chars().count() > max => Err(ActionSchemaError::TooLong { field, max }),
        _ => Ok(()),
    }
}

fn check_non_empty(field: &'static str, value: &str) -> SchemaResult {
    if value.is_empty() {
        Err(ActionSchemaError::Empty(field))
    } else {
        Ok(())
    }
}

fn check_password(password: Option<&str>) -> SchemaResult {
    if let Some(password) = password {
        check_non_empty("password", password)?;
        check_text(
            "password",
            Some(password),
            EngineConfig::MAX_LOCK_PASSWORD_LENGTH,
        )?;
    }
    Ok(())
}

fn check_bones(bones: &BTreeMap<String, i16>) -> SchemaResult {
    let limit = EngineConfig::BONE_LIMIT;
    for (bone, value) in bones {
        check_non_empty("bone name", bone)?;
        if !(-limit..=limit).contains(value) {
            return Err(ActionSchemaError::BoneOutOfRange {
                bone: bone.clone(),
                value: *value,
                limit,
            });
        }
    }
    Ok(())
}
