//! Asset definitions and the template -> item factory.

use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;

use super::OracleError;
use crate::state::{
    AssetId, ColorBundle, DeviceLink, Item, ItemId, LockState, ModuleState, RoomDeviceState,
};

bitflags! {
    /// Static flags of an asset (or of a module variant contributing to it).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AssetFlags: u8 {
        /// Nobody may add or remove the item once worn.
        const BLOCK_ADD_REMOVE      = 1 << 0;
        /// The wearer may not add or remove the item on themself.
        const BLOCK_SELF_ADD_REMOVE = 1 << 1;
        /// Using the item does not require hands.
        const HANDS_FREE            = 1 << 2;
        /// The item may not be handed to another container.
        const NON_TRANSFERABLE      = 1 << 3;
    }
}

bitflags! {
    /// Effects a worn item has on its wearer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectFlags: u8 {
        /// Wearer cannot use their hands.
        const BLOCK_HANDS = 1 << 0;
        /// Wearer can use their hands, slowly.
        const LIMIT_HANDS = 1 << 1;
    }
}

/// Properties contributed by an asset, a module variant or a locked lock slot.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct PropertySet {
    pub flags: AssetFlags,
    pub effects: EffectFlags,
    /// Attributes this item has, matched against `covers` of items above it.
    pub attributes: BTreeSet<String>,
    /// Attributes of items below this one that become inaccessible.
    pub covers: BTreeSet<String>,
    /// Modules of this item nobody may change.
    pub blocked_modules: BTreeSet<String>,
    /// Modules of this item the wearer may not change.
    pub self_blocked_modules: BTreeSet<String>,
}

impl PropertySet {
    pub fn merge(&mut self, other: &PropertySet) {
        self.flags |= other.flags;
        self.effects |= other.effects;
        self.attributes.extend(other.attributes.iter().cloned());
        self.covers.extend(other.covers.iter().cloned());
        self.blocked_modules
            .extend(other.blocked_modules.iter().cloned());
        self.self_blocked_modules
            .extend(other.self_blocked_modules.iter().cloned());
    }

    pub fn covers_any(&self, attributes: &BTreeSet<String>) -> bool {
        !self.covers.is_disjoint(attributes)
    }
}

/// One selectable variant of a typed module.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypedVariant {
    pub id: String,
    pub properties: PropertySet,
}

impl TypedVariant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: PropertySet::default(),
        }
    }

    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum ModuleKind {
    Typed {
        variants: Vec<TypedVariant>,
        default: String,
    },
    Storage {
        max_count: usize,
    },
    LockSlot {
        /// Applied to the item while its lock is locked.
        locked_properties: PropertySet,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleDefinition {
    pub kind: ModuleKind,
    /// Changing the module is an expression change rather than a modification.
    pub expression: bool,
}

impl ModuleDefinition {
    pub fn typed(default: &str, variants: impl IntoIterator<Item = TypedVariant>) -> Self {
        Self {
            kind: ModuleKind::Typed {
                variants: variants.into_iter().collect(),
                default: default.to_owned(),
            },
            expression: false,
        }
    }

    pub fn storage(max_count: usize) -> Self {
        Self {
            kind: ModuleKind::Storage { max_count },
            expression: false,
        }
    }

    pub fn lock_slot(locked_properties: PropertySet) -> Self {
        Self {
            kind: ModuleKind::LockSlot { locked_properties },
            expression: false,
        }
    }

    pub fn as_expression(mut self) -> Self {
        self.expression = true;
        self
    }

    pub fn typed_variant(&self, id: &str) -> Option<&TypedVariant> {
        match &self.kind {
            ModuleKind::Typed { variants, .. } => variants.iter().find(|variant| variant.id == id),
            _ => None,
        }
    }
}

/// Password requirements of a lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PasswordRule {
    pub min_length: usize,
    pub max_length: usize,
    pub numeric_only: bool,
}

impl PasswordRule {
    pub fn accepts(&self, password: &str) -> bool {
        let length = password.chars().count();
        (self.min_length..=self.max_length).contains(&length)
            && (!self.numeric_only || password.bytes().all(|b| b.is_ascii_digit()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LockDefinition {
    /// The character who locked it cannot unlock it on themself.
    pub block_self: bool,
    /// `Some` if locking requires a password.
    pub password: Option<PasswordRule>,
}

/// A slot of a room device; entering it puts `wearable` on the character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceSlot {
    pub wearable: AssetId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum AssetKind {
    /// Worn by characters. `bodypart` is set for bodypart assets.
    Personal { bodypart: Option<String> },
    /// A lock, stored in lock slot modules.
    Lock(LockDefinition),
    /// Lives in the room inventory and can be deployed.
    RoomDevice { slots: BTreeMap<String, DeviceSlot> },
    /// Worn while occupying a room device slot. Never created from a template.
    RoomDeviceWearablePart,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct AssetDefinition {
    pub id: AssetId,
    pub name: String,
    pub kind: AssetKind,
    pub properties: PropertySet,
    pub modules: BTreeMap<String, ModuleDefinition>,
    /// Color groups that can be set on items of this asset.
    pub color_groups: BTreeSet<String>,
}

impl AssetDefinition {
    pub fn new(id: AssetId, name: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            properties: PropertySet::default(),
            modules: BTreeMap::new(),
            color_groups: BTreeSet::new(),
        }
    }

    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_module(mut self, name: impl Into<String>, module: ModuleDefinition) -> Self {
        self.modules.insert(name.into(), module);
        self
    }

    pub fn with_color_group(mut self, group: impl Into<String>) -> Self {
        self.color_groups.insert(group.into());
        self
    }

    pub fn bodypart(&self) -> Option<&str> {
        match &self.kind {
            AssetKind::Personal { bodypart } => bodypart.as_deref(),
            _ => None,
        }
    }

    pub fn is_bodypart(&self) -> bool {
        self.bodypart().is_some()
    }

    pub fn is_room_device(&self) -> bool {
        matches!(self.kind, AssetKind::RoomDevice { .. })
    }

    pub fn is_wearable_part(&self) -> bool {
        matches!(self.kind, AssetKind::RoomDeviceWearablePart)
    }

    pub fn lock(&self) -> Option<&LockDefinition> {
        match &self.kind {
            AssetKind::Lock(lock) => Some(lock),
            _ => None,
        }
    }

    pub fn device_slot(&self, slot: &str) -> Option<&DeviceSlot> {
        match &self.kind {
            AssetKind::RoomDevice { slots } => slots.get(slot),
            _ => None,
        }
    }

    /// Properties of `item` (an instance of this asset) with module contributions applied.
    pub fn effective_properties(&self, item: &Item) -> PropertySet {
        let mut properties = self.properties.clone();
        for (name, definition) in &self.modules {
            match (&definition.kind, item.modules.get(name)) {
                (ModuleKind::Typed { .. }, Some(ModuleState::Typed { variant })) => {
                    if let Some(variant) = definition.typed_variant(variant) {
                        properties.merge(&variant.properties);
                    }
                }
                (ModuleKind::LockSlot { locked_properties }, Some(ModuleState::LockSlot { contents }))
                    if contents.first().is_some_and(Item::is_locked) =>
                {
                    properties.merge(locked_properties);
                }
                _ => {}
            }
        }
        properties
    }
}

/// A bodypart category, in canonical order within [`AssetOracle::bodyparts`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct BodypartDefinition {
    pub name: String,
    /// Every character must wear one.
    pub required: bool,
    /// More than one may be worn at once.
    pub allow_multiple: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum BoneKind {
    /// Changed by the `pose` action.
    Pose,
    /// Changed by the `body` action.
    Body,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneDefinition {
    pub name: String,
    pub kind: BoneKind,
}

/// Asset definitions and bodypart rules.
///
/// The engine never owns asset data; it reads it through this oracle.
pub trait AssetOracle: Send + Sync {
    fn asset(&self, id: &AssetId) -> Option<&AssetDefinition>;

    /// Bodypart categories in canonical order.
    fn bodyparts(&self) -> &[BodypartDefinition];

    fn bones(&self) -> &[BoneDefinition];

    /// Assets `randomize` may pick from.
    fn random_pool(&self) -> &[AssetId];

    fn bodypart(&self, name: &str) -> Option<&BodypartDefinition> {
        self.bodyparts().iter().find(|bodypart| bodypart.name == name)
    }

    /// Canonical position of a bodypart category.
    fn bodypart_index(&self, name: &str) -> Option<usize> {
        self.bodyparts()
            .iter()
            .position(|bodypart| bodypart.name == name)
    }

    fn bone(&self, name: &str) -> Option<&BoneDefinition> {
        self.bones().iter().find(|bone| bone.name == name)
    }
}

/// Requested module setup of a created item.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum ModuleTemplate {
    Typed { variant: String },
}

/// Description of an item to create.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ItemTemplate {
    pub asset: AssetId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: ColorBundle,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modules: BTreeMap<String, ModuleTemplate>,
}

impl ItemTemplate {
    pub fn new(asset: AssetId) -> Self {
        Self {
            asset,
            color: ColorBundle::new(),
            name: None,
            description: None,
            modules: BTreeMap::new(),
        }
    }
}

/// Builds a fresh item from a template.
///
/// Typed modules start at the template's variant (or the asset default),
/// storage and lock slots start empty, and device/lock bookkeeping is
/// attached according to the asset kind.
///
/// # Errors
///
/// Returns an [`OracleError`] if the asset is unknown, cannot be created from
/// a template, or the template names unknown modules, variants or color groups.
pub fn create_item_from_template(
    id: ItemId,
    template: &ItemTemplate,
    assets: &dyn AssetOracle,
) -> Result<Item, OracleError> {
    let asset = assets
        .asset(&template.asset)
        .ok_or_else(|| OracleError::AssetNotFound(template.asset.clone()))?;
    if asset.is_wearable_part() {
        return Err(OracleError::NotCreatable(asset.id.clone()));
    }

    if let Some(group) = template
        .color
        .keys()
        .find(|group| !asset.color_groups.contains(*group))
    {
        return Err(OracleError::UnknownColorGroup {
            asset: asset.id.clone(),
            group: group.clone(),
        });
    }
    for (name, module) in &template.modules {
        let ModuleTemplate::Typed { variant } = module;
        let known = asset
            .modules
            .get(name)
            .and_then(|definition| definition.typed_variant(variant))
            .is_some();
        if !known {
            return Err(OracleError::UnknownModuleVariant {
                asset: asset.id.clone(),
                module: name.clone(),
            });
        }
    }

    Ok(instantiate(id, asset, template))
}

/// Builds the wearable part a room device slot puts on its occupant.
///
/// # Errors
///
/// Returns an [`OracleError`] if the asset is unknown or not a wearable part.
pub fn create_wearable_part(
    id: ItemId,
    asset: &AssetId,
    link: DeviceLink,
    assets: &dyn AssetOracle,
) -> Result<Item, OracleError> {
    let asset = assets
        .asset(asset)
        .ok_or_else(|| OracleError::AssetNotFound(asset.clone()))?;
    if !asset.is_wearable_part() {
        return Err(OracleError::NotCreatable(asset.id.clone()));
    }
    let mut item = instantiate(id, asset, &ItemTemplate::new(asset.id.clone()));
    item.device_link = Some(link);
    Ok(item)
}

fn instantiate(id: ItemId, asset: &AssetDefinition, template: &ItemTemplate) -> Item {
    let mut item = Item::new(id, asset.id.clone());
    item.color = template.color.clone();
    item.name = template.name.clone();
    item.description = template.description.clone();
    item.modules = asset
        .modules
        .iter()
        .map(|(name, definition)| {
            let state = match &definition.kind {
                ModuleKind::Typed { default, .. } => ModuleState::Typed {
                    variant: match template.modules.get(name) {
                        Some(ModuleTemplate::Typed { variant }) => variant.clone(),
                        None => default.clone(),
                    },
                },
                ModuleKind::Storage { .. } => ModuleState::Storage {
                    contents: Vec::new(),
                },
                ModuleKind::LockSlot { .. } => ModuleState::LockSlot {
                    contents: Vec::new(),
                },
            };
            (name.clone(), state)
        })
        .collect();

    match asset.kind {
        AssetKind::RoomDevice { .. } => item.device = Some(RoomDeviceState::default()),
        AssetKind::Lock(_) => item.lock = Some(LockState::default()),
        AssetKind::Personal { .. } | AssetKind::RoomDeviceWearablePart => {}
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture_assets;

    #[test]
    fn template_fills_module_defaults() {
        let assets = fixture_assets();
        let mut template = ItemTemplate::new(AssetId::new("a/gag"));
        template
            .modules
            .insert("tightness".into(), ModuleTemplate::Typed { variant: "tight".into() });

        let item = create_item_from_template(ItemId::new("i/gag"), &template, &assets).unwrap();
        assert_eq!(
            item.modules.get("tightness"),
            Some(&ModuleState::Typed { variant: "tight".into() })
        );
        assert_eq!(
            item.modules.get("lock"),
            Some(&ModuleState::LockSlot { contents: Vec::new() })
        );
    }

    #[test]
    fn template_rejects_unknown_pieces() {
        let assets = fixture_assets();

        let missing = ItemTemplate::new(AssetId::new("a/nope"));
        assert!(matches!(
            create_item_from_template(ItemId::new("i/x"), &missing, &assets),
            Err(OracleError::AssetNotFound(_))
        ));

        let mut bad_color = ItemTemplate::new(AssetId::new("a/shirt"));
        bad_color
            .color
            .insert("sleeves".into(), crate::state::HexColor::new("#ffffff"));
        assert!(matches!(
            create_item_from_template(ItemId::new("i/x"), &bad_color, &assets),
            Err(OracleError::UnknownColorGroup { .. })
        ));

        let part = ItemTemplate::new(AssetId::new("a/cage-occupant"));
        assert!(matches!(
            create_item_from_template(ItemId::new("i/x"), &part, &assets),
            Err(OracleError::NotCreatable(_))
        ));
    }

    #[test]
    fn wearable_parts_carry_their_link() {
        let assets = fixture_assets();
        let link = DeviceLink {
            device: ItemId::new("i/cage"),
            slot: "inside".into(),
        };
        let part = create_wearable_part(
            ItemId::new("i/part"),
            &AssetId::new("a/cage-occupant"),
            link.clone(),
            &assets,
        )
        .unwrap();
        assert_eq!(part.device_link, Some(link.clone()));

        assert!(matches!(
            create_wearable_part(ItemId::new("i/x"), &AssetId::new("a/shirt"), link, &assets),
            Err(OracleError::NotCreatable(_))
        ));
    }

    #[test]
    fn locked_slot_and_variant_contribute_properties() {
        let assets = fixture_assets();
        let gag = assets.asset(&AssetId::new("a/gag")).unwrap();
        let mut item =
            create_item_from_template(ItemId::new("i/gag"), &ItemTemplate::new(gag.id.clone()), &assets)
                .unwrap();
        assert!(!gag.effective_properties(&item).flags.contains(AssetFlags::BLOCK_SELF_ADD_REMOVE));

        let mut lock = create_item_from_template(
            ItemId::new("i/lock"),
            &ItemTemplate::new(AssetId::new("a/padlock")),
            &assets,
        )
        .unwrap();
        lock.lock = Some(LockState {
            locked: Some(crate::state::LockedBy {
                character: crate::state::CharacterId::new("c1"),
                at: 0,
                password: None,
            }),
        });
        item.module_items_mut("lock").unwrap().push(lock);

        let properties = gag.effective_properties(&item);
        assert!(properties.flags.contains(AssetFlags::BLOCK_ADD_REMOVE));
        assert!(properties.blocked_modules.contains("tightness"));
    }

    #[test]
    fn password_rules() {
        let rule = PasswordRule {
            min_length: 3,
            max_length: 4,
            numeric_only: true,
        };
        assert!(rule.accepts("123"));
        assert!(!rule.accepts("12"));
        assert!(!rule.accepts("12a4"));
    }
}
