use std::sync::Arc;

use crate::action::ActionTargetSelector;
use crate::restriction::ItemOwner;
use crate::state::{
    CharacterState, Item, ItemContainerPath, ItemPath, RoomState, find_item, resolve_container,
};

/// A resolved target over the working state of the current transaction.
///
/// Holding the `Arc`s keeps the view stable while the manipulator produces
/// further states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionTarget {
    Character(Arc<CharacterState>),
    RoomInventory(Arc<RoomState>),
}

impl ActionTarget {
    pub fn selector(&self) -> ActionTargetSelector {
        match self {
            Self::Character(character) => ActionTargetSelector::character(character.id.clone()),
            Self::RoomInventory(_) => ActionTargetSelector::RoomInventory,
        }
    }

    pub fn character(&self) -> Option<&CharacterState> {
        match self {
            Self::Character(character) => Some(character),
            Self::RoomInventory(_) => None,
        }
    }

    /// Root item list.
    pub fn items(&self) -> &[Item] {
        match self {
            Self::Character(character) => &character.items,
            Self::RoomInventory(room) => &room.items,
        }
    }

    pub fn get_item(&self, path: &ItemPath) -> Option<&Item> {
        find_item(self.items(), path)
    }

    pub fn container_items(&self, container: &ItemContainerPath) -> Option<&[Item]> {
        resolve_container(self.items(), container)
    }

    pub(crate) fn owner<'s>(&'s self, authority: Option<&'s CharacterState>) -> ItemOwner<'s> {
        match self {
            Self::Character(character) => ItemOwner::Character(character),
            Self::RoomInventory(room) => ItemOwner::Room { room, authority },
        }
    }
}
