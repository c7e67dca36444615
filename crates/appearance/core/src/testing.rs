//! Shared fixtures for unit tests.
//!
//! The fixture space has two characters, `c1` (account 1, admin) and `c2`
//! (account 2), and a room holding one stored cage.

use std::collections::BTreeSet;

use crate::action::AppearanceAction;
use crate::engine::AppearanceEngine;
use crate::env::{
    AssetCatalog, AssetDefinition, AssetFlags, AssetKind, BoneKind, DeviceSlot, EffectFlags,
    ItemTemplate, LockDefinition, ModuleDefinition, PasswordRule, PcgRng, ProcessingEnv,
    PropertySet, SpaceFeatures, StaticSpace, TypedVariant, create_item_from_template,
};
use crate::processing::{ActionContext, ProcessingResult};
use crate::state::{
    AccountId, AssetId, CharacterId, CharacterState, GlobalState, Item, ItemId, RoomBackground,
    RoomState,
};

fn attributes(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn personal(id: &str, name: &str) -> AssetDefinition {
    AssetDefinition::new(AssetId::new(id), name, AssetKind::Personal { bodypart: None })
}

fn bodypart(id: &str, name: &str, category: &str) -> AssetDefinition {
    AssetDefinition::new(
        AssetId::new(id),
        name,
        AssetKind::Personal {
            bodypart: Some(category.to_owned()),
        },
    )
}

pub(crate) fn fixture_assets() -> AssetCatalog {
    let gag_lock = PropertySet {
        flags: AssetFlags::BLOCK_ADD_REMOVE,
        blocked_modules: attributes(&["tightness"]),
        ..PropertySet::default()
    };
    let cage_slots = [(
        "inside".to_owned(),
        DeviceSlot {
            wearable: AssetId::new("a/cage-occupant"),
        },
    )];

    AssetCatalog::new()
        .with_bodypart("body", true, false)
        .with_bodypart("eyes", true, false)
        .with_bodypart("hair", false, true)
        .with_bone("arm_l", BoneKind::Pose)
        .with_bone("arm_r", BoneKind::Pose)
        .with_bone("leg_l", BoneKind::Pose)
        .with_bone("breasts", BoneKind::Body)
        .with_random_asset(bodypart("a/body-base", "Body", "body"))
        .with_random_asset(
            bodypart("a/eyes-blue", "Blue eyes", "eyes")
                .with_color_group("iris")
                .with_module(
                    "expression",
                    ModuleDefinition::typed(
                        "open",
                        [TypedVariant::new("open"), TypedVariant::new("closed")],
                    )
                    .as_expression(),
                ),
        )
        .with_random_asset(bodypart("a/eyes-green", "Green eyes", "eyes").with_color_group("iris"))
        .with_random_asset(bodypart("a/hair-long", "Long hair", "hair").with_color_group("hair"))
        .with_random_asset(
            personal("a/shirt", "Shirt")
                .with_color_group("base")
                .with_properties(PropertySet {
                    attributes: attributes(&["Clothing_upper"]),
                    ..PropertySet::default()
                }),
        )
        .with_random_asset(personal("a/jacket", "Jacket").with_properties(PropertySet {
            covers: attributes(&["Clothing_upper"]),
            ..PropertySet::default()
        }))
        .with_asset(personal("a/handcuffs", "Handcuffs").with_properties(PropertySet {
            effects: EffectFlags::BLOCK_HANDS,
            ..PropertySet::default()
        }))
        .with_asset(personal("a/mittens", "Mittens").with_properties(PropertySet {
            effects: EffectFlags::LIMIT_HANDS,
            ..PropertySet::default()
        }))
        .with_asset(
            personal("a/gag", "Gag")
                .with_module(
                    "tightness",
                    ModuleDefinition::typed(
                        "loose",
                        [TypedVariant::new("loose"), TypedVariant::new("tight")],
                    ),
                )
                .with_module("lock", ModuleDefinition::lock_slot(gag_lock)),
        )
        .with_asset(AssetDefinition::new(
            AssetId::new("a/padlock"),
            "Padlock",
            AssetKind::Lock(LockDefinition::default()),
        ))
        .with_asset(AssetDefinition::new(
            AssetId::new("a/combination-lock"),
            "Combination lock",
            AssetKind::Lock(LockDefinition {
                block_self: true,
                password: Some(PasswordRule {
                    min_length: 3,
                    max_length: 6,
                    numeric_only: true,
                }),
            }),
        ))
        .with_asset(personal("a/backpack", "Backpack").with_module("storage", ModuleDefinition::storage(2)))
        .with_asset(
            AssetDefinition::new(
                AssetId::new("a/cage"),
                "Cage",
                AssetKind::RoomDevice {
                    slots: cage_slots.into_iter().collect(),
                },
            )
            .with_color_group("bars")
            .with_module("inside", ModuleDefinition::storage(3)),
        )
        .with_asset(AssetDefinition::new(
            AssetId::new("a/cage-occupant"),
            "Inside the cage",
            AssetKind::RoomDeviceWearablePart,
        ))
        .with_asset(personal("a/ring", "Ring").with_properties(PropertySet {
            flags: AssetFlags::NON_TRANSFERABLE,
            ..PropertySet::default()
        }))
}

pub(crate) fn fixture_space() -> StaticSpace {
    StaticSpace::new(SpaceFeatures::BODY_MODIFICATION).with_admin(AccountId(1))
}

pub(crate) fn fixture_oracles() -> (AssetCatalog, StaticSpace, PcgRng) {
    (fixture_assets(), fixture_space(), PcgRng)
}

/// Builds an item of `asset` the way a template would, or a bare item for
/// assets that cannot come from templates.
pub(crate) fn item(id: &str, asset: &str) -> Item {
    let assets = fixture_assets();
    let id = ItemId::new(id);
    let asset = AssetId::new(asset);
    create_item_from_template(id.clone(), &ItemTemplate::new(asset.clone()), &assets)
        .unwrap_or_else(|_| Item::new(id, asset))
}

fn character(id: &str, account: u64, eyes: &str, extra: Vec<Item>) -> CharacterState {
    let mut character = CharacterState::new(CharacterId::new(id), AccountId(account));
    character.items = vec![
        item(&format!("i/{id}-body"), "a/body-base"),
        item(&format!("i/{id}-eyes"), eyes),
    ];
    character.items.extend(extra);
    character
}

pub(crate) fn fixture_state() -> GlobalState {
    let mut room = RoomState::new(RoomBackground::default());
    room.items.push(item("i/cage", "a/cage"));

    GlobalState::new(room)
        .with_character(character("c1", 1, "a/eyes-blue", vec![item("i/c1-shirt", "a/shirt")]))
        .with_character(character("c2", 2, "a/eyes-green", Vec::new()))
}

/// Owns the oracles and a working state, and runs actions against them.
pub(crate) struct Harness {
    pub assets: AssetCatalog,
    pub space: StaticSpace,
    pub rng: PcgRng,
    pub state: GlobalState,
}

impl Harness {
    pub fn new() -> Self {
        let (assets, space, rng) = fixture_oracles();
        Self {
            assets,
            space,
            rng,
            state: fixture_state(),
        }
    }

    pub fn engine(&self) -> AppearanceEngine<'_> {
        AppearanceEngine::new(ProcessingEnv::with_all(&self.assets, &self.space, &self.rng))
    }

    fn context(player: &str, now: u64) -> ActionContext {
        ActionContext::new(CharacterId::new(player), now)
    }

    pub fn process(&self, player: &str, action: &AppearanceAction) -> ProcessingResult {
        self.process_at(player, action, 0)
    }

    pub fn process_at(&self, player: &str, action: &AppearanceAction, now: u64) -> ProcessingResult {
        self.engine()
            .process(action, &self.state, &Self::context(player, now))
            .expect("fixture oracles are complete")
    }

    pub fn apply(&self, player: &str, action: &AppearanceAction) -> ProcessingResult {
        self.engine()
            .apply(action, &self.state, &Self::context(player, 0))
            .expect("fixture oracles are complete")
    }

    pub fn start_attempt(&self, player: &str, action: &AppearanceAction, now: u64) -> ProcessingResult {
        self.engine()
            .start_attempt(action, &self.state, &Self::context(player, now))
            .expect("fixture oracles are complete")
    }

    pub fn finish_attempt(&self, player: &str, action: &AppearanceAction, now: u64) -> ProcessingResult {
        self.engine()
            .finish_attempt(action, &self.state, &Self::context(player, now))
            .expect("fixture oracles are complete")
    }
}
