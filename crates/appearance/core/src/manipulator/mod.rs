//! Copy-on-write state manipulator.
//!
//! Handlers never touch a [`GlobalState`] directly. They ask the manipulator to
//! edit one container, one item, one character or the room, and the
//! manipulator produces the next working state. Only the `Arc`s on the path to
//! the edit are cloned, so the starting snapshot is never mutated.
//!
//! Every edit either succeeds completely or reports failure (`false` or an
//! empty result) and leaves the working state untouched. Preconditions are
//! checked against the current working state before any `Arc` is made unique.

use crate::action::ActionTargetSelector;
use crate::env::AssetOracle;
use crate::state::{
    CharacterId, CharacterState, GlobalState, Item, ItemContainerPath, ItemId, ItemPath,
    RoomState, find_item, resolve_container, resolve_container_mut,
};

#[derive(Clone, Debug)]
pub struct GlobalStateManipulator {
    state: GlobalState,
}

impl GlobalStateManipulator {
    pub fn new(state: GlobalState) -> Self {
        Self { state }
    }

    /// Current working state.
    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn into_state(self) -> GlobalState {
        self.state
    }

    fn root_items(&self, target: &ActionTargetSelector) -> Option<&[Item]> {
        match target {
            ActionTargetSelector::Character { character_id } => {
                self.state.character(character_id).map(|c| c.items.as_slice())
            }
            ActionTargetSelector::RoomInventory => Some(&self.state.room.items),
        }
    }

    fn root_items_mut(&mut self, target: &ActionTargetSelector) -> Option<&mut Vec<Item>> {
        match target {
            ActionTargetSelector::Character { character_id } => self
                .state
                .character_mut(character_id)
                .map(|character| &mut character.items),
            ActionTargetSelector::RoomInventory => Some(&mut self.state.room_mut().items),
        }
    }

    /// Items of a container in the working state.
    pub fn container_items(
        &self,
        target: &ActionTargetSelector,
        container: &ItemContainerPath,
    ) -> Option<&[Item]> {
        resolve_container(self.root_items(target)?, container)
    }

    pub fn item(&self, target: &ActionTargetSelector, path: &ItemPath) -> Option<&Item> {
        find_item(self.root_items(target)?, path)
    }

    fn container_mut(
        &mut self,
        target: &ActionTargetSelector,
        container: &ItemContainerPath,
    ) -> Option<&mut Vec<Item>> {
        resolve_container_mut(self.root_items_mut(target)?, container)
    }

    /// Inserts `item` into a container, before `insert_before` or at the end.
    ///
    /// Fails if the container or the `insert_before` item does not exist.
    pub fn add_item(
        &mut self,
        target: &ActionTargetSelector,
        container: &ItemContainerPath,
        item: Item,
        insert_before: Option<&ItemId>,
    ) -> bool {
        let Some(items) = self.container_items(target, container) else {
            return false;
        };
        let index = match insert_before {
            Some(before) => match items.iter().position(|existing| existing.id == *before) {
                Some(index) => index,
                None => return false,
            },
            None => items.len(),
        };

        match self.container_mut(target, container) {
            Some(items) => {
                items.insert(index, item);
                true
            }
            None => false,
        }
    }

    /// Removes every item of a container matching `predicate`, returning them.
    pub fn remove_matching_items(
        &mut self,
        target: &ActionTargetSelector,
        container: &ItemContainerPath,
        predicate: impl Fn(&Item) -> bool,
    ) -> Vec<Item> {
        let matches = self
            .container_items(target, container)
            .is_some_and(|items| items.iter().any(&predicate));
        if !matches {
            return Vec::new();
        }

        let Some(items) = self.container_mut(target, container) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(items)
            .into_iter()
            .partition(|item| predicate(item));
        *items = kept;
        removed
    }

    /// Replaces an item with the output of `produce`; `None` aborts the edit.
    pub fn modify_item(
        &mut self,
        target: &ActionTargetSelector,
        path: &ItemPath,
        produce: impl FnOnce(&Item) -> Option<Item>,
    ) -> bool {
        let Some(replacement) = self.item(target, path).and_then(produce) else {
            return false;
        };
        let Some(slot) = self
            .container_mut(target, &path.container)
            .and_then(|items| items.iter_mut().find(|item| item.id == path.item_id))
        else {
            return false;
        };
        *slot = replacement;
        true
    }

    /// Moves an item by `shift` positions within its container.
    ///
    /// Fails if the destination index is outside the container.
    pub fn move_item(&mut self, target: &ActionTargetSelector, path: &ItemPath, shift: i32) -> bool {
        let Some(destination) = self.shifted_index(target, path, shift) else {
            return false;
        };
        let Some(items) = self.container_mut(target, &path.container) else {
            return false;
        };
        let Some(current) = items.iter().position(|item| item.id == path.item_id) else {
            return false;
        };
        let item = items.remove(current);
        items.insert(destination, item);
        true
    }

    /// Index the item at `path` would land on after moving by `shift`.
    pub fn shifted_index(
        &self,
        target: &ActionTargetSelector,
        path: &ItemPath,
        shift: i32,
    ) -> Option<usize> {
        let items = self.container_items(target, &path.container)?;
        let current = items.iter().position(|item| item.id == path.item_id)?;
        let destination = i64::try_from(current).ok()? + i64::from(shift);
        let destination = usize::try_from(destination).ok()?;
        (destination < items.len()).then_some(destination)
    }

    /// Replaces a character with the output of `produce`; `None` aborts the edit.
    pub fn produce_character_state(
        &mut self,
        id: &CharacterId,
        produce: impl FnOnce(&CharacterState) -> Option<CharacterState>,
    ) -> bool {
        let Some(next) = self.state.character(id).and_then(produce) else {
            return false;
        };
        match self.state.character_mut(id) {
            Some(character) => {
                *character = next;
                true
            }
            None => false,
        }
    }

    /// Replaces the room with the output of `produce`; `None` aborts the edit.
    pub fn produce_room_state(&mut self, produce: impl FnOnce(&RoomState) -> Option<RoomState>) -> bool {
        let Some(next) = produce(&self.state.room) else {
            return false;
        };
        *self.state.room_mut() = next;
        true
    }

    /// Stable-sorts a character's root list so bodyparts lead in canonical order.
    ///
    /// Non-bodypart items keep their relative order after the bodyparts.
    pub fn sort_character_bodyparts(&mut self, id: &CharacterId, assets: &dyn AssetOracle) -> bool {
        self.produce_character_state(id, |character| {
            let mut next = character.clone();
            next.items.sort_by_key(|item| {
                assets
                    .asset(&item.asset)
                    .and_then(|asset| asset.bodypart())
                    .and_then(|bodypart| assets.bodypart_index(bodypart))
                    .unwrap_or(usize::MAX)
            });
            Some(next)
        })
    }
}
