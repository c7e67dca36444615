use std::fmt;

use crate::state::CharacterId;

/// What an item action operates on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum ActionTargetSelector {
    /// Items worn by a character.
    Character { character_id: CharacterId },
    /// Items lying in the room.
    RoomInventory,
}

impl ActionTargetSelector {
    pub fn character(id: CharacterId) -> Self {
        Self::Character { character_id: id }
    }

    pub fn character_id(&self) -> Option<&CharacterId> {
        match self {
            Self::Character { character_id } => Some(character_id),
            Self::RoomInventory => None,
        }
    }
}

impl fmt::Display for ActionTargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character { character_id } => write!(f, "character:{character_id}"),
            Self::RoomInventory => f.write_str("roomInventory"),
        }
    }
}
