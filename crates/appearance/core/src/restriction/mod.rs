//! Restriction and permission checks.
//!
//! The checker is a pure function of the actor, the target and the asset
//! definitions: the same inputs produce the same [`CheckOutcome`] on client
//! and server. It never rejects anything itself; the processing context turns
//! the outcome into problems, required permissions and slowdowns.
//!
//! # Module Structure
//!
//! - `permission`: self-evaluating permissions (interaction, asset preference)
//! - `checker`: item-use, interaction and bodypart rules
mod checker;
mod permission;

pub use checker::{CheckOutcome, ItemOwner, RequiredPermission, RestrictionChecker};
pub use permission::{
    AssetPreferencePermission, InteractionPermission, Permission, PermissionKey, PermissionRef,
    PermissionResult,
};

use strum::{AsRefStr, Display, EnumIter};

use crate::state::{AssetId, CharacterId, ItemId};

/// Intent of an item interaction; selects which rules apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ItemInteractionType {
    /// Looking into an item, e.g. reaching a container through it.
    AccessOnly,
    /// Color, name and description.
    Styling,
    /// Changing module state.
    Modify,
    /// Putting the item on or taking it off.
    AddRemove,
    /// Changing the position within a container.
    Reorder,
    DeviceEnterLeave,
    /// Changing an expression module (eyes, mouth).
    ExpressionChange,
}

impl ItemInteractionType {
    pub const fn needs_hands(self) -> bool {
        !matches!(self, Self::AccessOnly)
    }

    /// Interactions that count as modifying a bodypart.
    pub const fn modifies_body(self) -> bool {
        matches!(self, Self::Modify | Self::AddRemove | Self::Reorder)
    }

    /// Interactions that take an item out of, put it into or shuffle it
    /// within its container, or change its module state.
    pub const fn changes_placement(self) -> bool {
        matches!(self, Self::Modify | Self::AddRemove | Self::Reorder)
    }
}

/// A specific reason an interaction is disallowed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum Restriction {
    /// A permission of `permission.owner` denied or awaits their approval.
    MissingPermission {
        permission: PermissionRef,
        prompt: bool,
    },
    BlockedHands,
    BlockedAddRemove {
        asset: AssetId,
        self_block: bool,
    },
    BlockedModule {
        asset: AssetId,
        module: String,
        self_block: bool,
    },
    Covered {
        item: ItemId,
        by: ItemId,
    },
    /// The space does not allow body modification.
    ModifyBodyRoom,
    /// Bodyparts can only be modified on oneself.
    ModifyBodyOthers,
    /// `character` is in safemode, so no cross-character interaction.
    SafemodeInteractOther {
        character: CharacterId,
    },
    TimeoutInteractOther {
        character: CharacterId,
    },
    ModifyRoomNotAdmin,
    DeviceSlotOccupied {
        slot: String,
    },
    ItemNotTransferable {
        item: ItemId,
    },
    SpawnNotAllowed,
    /// The character is inside a room device.
    InRoomDevice {
        character: CharacterId,
    },
}

impl Restriction {
    /// Owner of the permission if this is a prompt-able restriction.
    pub fn prompt_target(&self) -> Option<&CharacterId> {
        match self {
            Self::MissingPermission {
                permission,
                prompt: true,
            } => Some(&permission.owner),
            _ => None,
        }
    }
}
