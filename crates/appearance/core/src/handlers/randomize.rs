//! Deterministic random outfits.
//!
//! Every draw is `rng.index(compute_seed(seed, player, draw), len)`, so a
//! client predicting the action and the server committing it pick the same
//! assets and the same item ids.

use crate::action::RandomizeKind;
use crate::config::EngineConfig;
use crate::env::{AssetDefinition, ItemTemplate, SpaceFeatures, compute_seed, create_item_from_template};
use crate::processing::{ActionMessage, ActionMessageId, ProcessingContext, ProcessingResult};
use crate::restriction::{ItemInteractionType, ItemOwner, Restriction, RestrictionChecker};
use crate::state::{AssetId, CharacterState, Item, ItemId, ItemPath};

/// Bodypart draws are numbered from here so they never share a seed with item draws.
const BODYPART_DRAW_BASE: u32 = 1_000;

pub(super) fn randomize(
    mut ctx: ProcessingContext<'_>,
    kind: RandomizeKind,
    seed: &str,
) -> ProcessingResult {
    let Some(player) = ctx.player() else {
        return ctx.invalid(None);
    };
    let full = kind == RandomizeKind::Full;
    if full && !ctx.space().has_feature(SpaceFeatures::BODY_MODIFICATION) {
        ctx.add_restriction(Restriction::ModifyBodyRoom);
    }

    let assets = ctx.assets();
    let rng = ctx.rng();
    let checker = RestrictionChecker::new(assets, ctx.space(), &player);
    let draw_seed = |draw: u32| compute_seed(seed, player.id.as_str(), draw);

    let mut bodyparts = Vec::new();
    let mut kept = Vec::new();
    for item in &player.items {
        let Some(asset) = assets.asset(&item.asset) else {
            kept.push(item.clone());
            continue;
        };
        if asset.is_bodypart() {
            bodyparts.push(item.clone());
        } else if asset.is_wearable_part() || !is_removable(&checker, &player, item) {
            kept.push(item.clone());
        }
    }

    let pool: Vec<&AssetDefinition> = assets
        .random_pool()
        .iter()
        .filter_map(|id| assets.asset(id))
        .collect();
    let taken_ids = |items: &[Item], id: &ItemId| items.iter().any(|item| item.id == *id);

    if full {
        for (index, bodypart) in (0u32..).zip(assets.bodyparts()) {
            let candidates: Vec<&AssetId> = pool
                .iter()
                .filter(|asset| asset.bodypart() == Some(bodypart.name.as_str()))
                .map(|asset| &asset.id)
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let value = draw_seed(BODYPART_DRAW_BASE + index);
            let asset = candidates[rng.index(value, candidates.len())];
            let id = random_item_id(value);
            if taken_ids(&kept, &id) {
                continue;
            }
            let Ok(item) = create_item_from_template(id, &ItemTemplate::new(asset.clone()), assets)
            else {
                return ctx.invalid(None);
            };
            bodyparts.retain(|worn| {
                assets
                    .asset(&worn.asset)
                    .and_then(AssetDefinition::bodypart)
                    != Some(bodypart.name.as_str())
            });
            bodyparts.push(item);
        }
    }

    let wearables: Vec<&AssetId> = pool
        .iter()
        .filter(|asset| !asset.is_bodypart() && !asset.is_room_device() && !asset.is_wearable_part())
        .map(|asset| &asset.id)
        .collect();
    let mut chosen: Vec<&AssetId> = Vec::new();
    let mut added = Vec::new();
    if !wearables.is_empty() {
        for draw in 0..EngineConfig::MAX_RANDOMIZED_ITEMS {
            let value = draw_seed(draw);
            let asset = wearables[rng.index(value, wearables.len())];
            let id = random_item_id(value);
            if chosen.contains(&asset) || taken_ids(&kept, &id) {
                continue;
            }
            chosen.push(asset);
            let Ok(item) = create_item_from_template(id, &ItemTemplate::new(asset.clone()), assets)
            else {
                return ctx.invalid(None);
            };
            added.push(item);
        }
    }

    let mut items = bodyparts;
    items.extend(kept);
    items.extend(added);

    let edited = ctx.manipulator().produce_character_state(&player.id, |character| {
        let mut next = character.clone();
        next.items = items;
        Some(next)
    }) && ctx.manipulator().sort_character_bodyparts(&player.id, assets);
    if !edited {
        return ctx.invalid(None);
    }

    ctx.queue_message(ActionMessage::new(ActionMessageId::Randomize, player.id.clone()));
    ctx.finalize()
}

fn is_removable(checker: &RestrictionChecker<'_>, player: &CharacterState, item: &Item) -> bool {
    checker
        .check_item_use(
            ItemOwner::Character(player),
            &ItemPath::root(item.id.clone()),
            None,
            ItemInteractionType::AddRemove,
        )
        .is_some_and(|outcome| outcome.is_allowed())
}

fn random_item_id(seed: u64) -> ItemId {
    ItemId::new(format!("i/rnd-{seed:016x}"))
}
