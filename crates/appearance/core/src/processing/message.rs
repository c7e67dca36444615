//! Structured chat messages and action data emitted by accepted actions.
//!
//! Messages are not localized here; a renderer elsewhere turns the id and the
//! referenced entities into text.

use strum::{AsRefStr, Display};

use crate::action::ActionTargetSelector;
use crate::state::{AssetId, CharacterId, ItemContainerPath, ItemId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ActionMessageId {
    ItemAdd,
    ItemRemove,
    /// A single-instance bodypart was swapped for another.
    ItemReplace,
    ItemMove,
    ItemColor,
    ItemCustomize,
    ItemTransfer,
    ItemReorder,
    LockLock,
    LockUnlock,
    ModuleChange,
    RoomDeviceDeploy,
    RoomDeviceStore,
    RoomDeviceSlotEnter,
    RoomDeviceSlotLeave,
    /// Occupancy of an absent character was cleared.
    RoomDeviceSlotClear,
    SafemodeEnter,
    SafemodeLeave,
    TimeoutEnter,
    TimeoutLeave,
    AttemptInterrupt,
    RoomConfigure,
    Randomize,
}

/// Item a message refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageItem {
    pub id: ItemId,
    pub asset: AssetId,
}

impl From<&crate::state::Item> for MessageItem {
    fn from(item: &crate::state::Item) -> Self {
        Self {
            id: item.id.clone(),
            asset: item.asset.clone(),
        }
    }
}

/// A pending chat/log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ActionMessage {
    pub id: ActionMessageId,
    /// Acting character.
    pub character: CharacterId,
    pub target: Option<ActionTargetSelector>,
    pub item: Option<MessageItem>,
    pub item_previous: Option<MessageItem>,
    pub item_container: Option<ItemContainerPath>,
    pub module: Option<String>,
    pub slot: Option<String>,
}

impl ActionMessage {
    pub fn new(id: ActionMessageId, character: CharacterId) -> Self {
        Self {
            id,
            character,
            target: None,
            item: None,
            item_previous: None,
            item_container: None,
            module: None,
            slot: None,
        }
    }

    pub fn with_target(mut self, target: ActionTargetSelector) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_item(mut self, item: impl Into<MessageItem>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_item_previous(mut self, item: impl Into<MessageItem>) -> Self {
        self.item_previous = Some(item.into());
        self
    }

    pub fn with_container(mut self, container: ItemContainerPath) -> Self {
        self.item_container = (!container.is_root()).then_some(container);
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }
}

/// Machine-readable side data of an accepted action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum ActionData {
    LockStateChanged {
        target: ActionTargetSelector,
        item: ItemId,
        module: String,
        locked: bool,
    },
}
