//! Item instances and their module state.

use std::collections::BTreeMap;

use super::{AssetId, CharacterId, ItemContainerPath, ItemId, ItemPath, RoomPosition};

/// Color in `#RRGGBB` or `#RRGGBBAA` notation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct HexColor(pub String);

impl HexColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn is_well_formed(&self) -> bool {
        self.0.strip_prefix('#').is_some_and(|hex| {
            matches!(hex.len(), 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
        })
    }
}

/// Color group name -> color.
pub type ColorBundle = BTreeMap<String, HexColor>;

/// Runtime state of one item module.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum ModuleState {
    /// One variant out of a fixed list is selected.
    Typed { variant: String },
    /// Holds arbitrary items, addressed through container paths.
    Storage { contents: Vec<Item> },
    /// Holds at most one lock item.
    LockSlot { contents: Vec<Item> },
}

impl ModuleState {
    pub fn contents(&self) -> Option<&[Item]> {
        match self {
            Self::Storage { contents } | Self::LockSlot { contents } => Some(contents),
            Self::Typed { .. } => None,
        }
    }

    pub fn contents_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            Self::Storage { contents } | Self::LockSlot { contents } => Some(contents),
            Self::Typed { .. } => None,
        }
    }
}

/// Device-side bookkeeping of a room device item.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomDeviceState {
    /// `None` while the device is stored in the room inventory.
    pub deployment: Option<RoomPosition>,
    /// Slot name -> occupying character.
    pub slots: BTreeMap<String, CharacterId>,
}

/// Character-side link of a room device wearable part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceLink {
    pub device: ItemId,
    pub slot: String,
}

/// Who locked a lock, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockedBy {
    pub character: CharacterId,
    pub at: u64,
    pub password: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockState {
    pub locked: Option<LockedBy>,
}

/// A single item instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Item {
    pub id: ItemId,
    pub asset: AssetId,
    pub color: ColorBundle,
    pub name: Option<String>,
    pub description: Option<String>,
    pub modules: BTreeMap<String, ModuleState>,
    /// Present on room device items only.
    pub device: Option<RoomDeviceState>,
    /// Present on room device wearable parts only.
    pub device_link: Option<DeviceLink>,
    /// Present on lock items only.
    pub lock: Option<LockState>,
}

impl Item {
    pub fn new(id: ItemId, asset: AssetId) -> Self {
        Self {
            id,
            asset,
            color: ColorBundle::new(),
            name: None,
            description: None,
            modules: BTreeMap::new(),
            device: None,
            device_link: None,
            lock: None,
        }
    }

    pub fn is_deployed(&self) -> bool {
        self.device
            .as_ref()
            .is_some_and(|device| device.deployment.is_some())
    }

    pub fn is_locked(&self) -> bool {
        self.lock.as_ref().is_some_and(|lock| lock.locked.is_some())
    }

    pub fn module_items(&self, module: &str) -> Option<&[Item]> {
        self.modules.get(module)?.contents()
    }

    pub fn module_items_mut(&mut self, module: &str) -> Option<&mut Vec<Item>> {
        self.modules.get_mut(module)?.contents_mut()
    }

    /// Returns the lock item held by a lock slot module.
    pub fn slot_lock(&self, module: &str) -> Option<&Item> {
        match self.modules.get(module)? {
            ModuleState::LockSlot { contents } => contents.first(),
            _ => None,
        }
    }
}

/// Resolves a container path starting from a root item list.
pub fn resolve_container<'a>(items: &'a [Item], path: &ItemContainerPath) -> Option<&'a [Item]> {
    let mut current = items;
    for step in path.steps() {
        let item = current.iter().find(|item| item.id == step.item)?;
        current = item.module_items(&step.module)?;
    }
    Some(current)
}

/// Mutable counterpart of [`resolve_container`].
pub fn resolve_container_mut<'a>(
    items: &'a mut Vec<Item>,
    path: &ItemContainerPath,
) -> Option<&'a mut Vec<Item>> {
    let mut current = items;
    for step in path.steps() {
        let next = current;
        let item = next.iter_mut().find(|item| item.id == step.item)?;
        current = item.module_items_mut(&step.module)?;
    }
    Some(current)
}

/// Finds the item addressed by `path` in a root item list.
pub fn find_item<'a>(items: &'a [Item], path: &ItemPath) -> Option<&'a Item> {
    resolve_container(items, &path.container)?
        .iter()
        .find(|item| item.id == path.item_id)
}

/// Returns the chain of container items a path walks through, outermost first.
pub fn container_chain<'a>(items: &'a [Item], path: &ItemContainerPath) -> Option<Vec<&'a Item>> {
    let mut chain = Vec::with_capacity(path.depth());
    let mut current = items;
    for step in path.steps() {
        let item = current.iter().find(|item| item.id == step.item)?;
        chain.push(item);
        current = item.module_items(&step.module)?;
    }
    Some(chain)
}

/// Visits every item in a list, depth first, including nested module contents.
pub fn for_each_item<'a>(items: &'a [Item], visit: &mut impl FnMut(&'a Item, usize)) {
    fn walk<'a>(items: &'a [Item], depth: usize, visit: &mut impl FnMut(&'a Item, usize)) {
        for item in items {
            visit(item, depth);
            for module in item.modules.values() {
                if let Some(contents) = module.contents() {
                    walk(contents, depth + 1, visit);
                }
            }
        }
    }
    walk(items, 0, visit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag_with(contents: Vec<Item>) -> Item {
        let mut bag = Item::new(ItemId::new("i/bag"), AssetId::new("a/bag"));
        bag.modules
            .insert("storage".into(), ModuleState::Storage { contents });
        bag
    }

    #[test]
    fn resolves_nested_containers() {
        let inner = Item::new(ItemId::new("i/coin"), AssetId::new("a/coin"));
        let items = vec![bag_with(vec![inner.clone()])];
        let path = ItemPath::new(
            ItemContainerPath::root().join(ItemId::new("i/bag"), "storage"),
            ItemId::new("i/coin"),
        );

        assert_eq!(find_item(&items, &path), Some(&inner));
        assert!(
            resolve_container(
                &items,
                &ItemContainerPath::root().join(ItemId::new("i/bag"), "missing")
            )
            .is_none()
        );
    }

    #[test]
    fn mutable_resolution_reaches_nested_list() {
        let mut items = vec![bag_with(Vec::new())];
        let path = ItemContainerPath::root().join(ItemId::new("i/bag"), "storage");
        resolve_container_mut(&mut items, &path)
            .expect("storage exists")
            .push(Item::new(ItemId::new("i/coin"), AssetId::new("a/coin")));

        assert_eq!(items[0].module_items("storage").map(<[Item]>::len), Some(1));
    }

    #[test]
    fn hex_colors_accept_rgb_and_rgba() {
        assert!(HexColor::new("#A1b2C3").is_well_formed());
        assert!(HexColor::new("#a1b2c3ff").is_well_formed());
        assert!(!HexColor::new("a1b2c3").is_well_formed());
        assert!(!HexColor::new("#a1b2c").is_well_formed());
        assert!(!HexColor::new("#gggggg").is_well_formed());
    }
}
