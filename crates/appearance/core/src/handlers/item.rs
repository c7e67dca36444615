//! Item lifecycle and placement: create, delete, transfer, move.

use crate::action::ActionTargetSelector;
use crate::env::{AssetFlags, ItemTemplate, SpaceFeatures, create_item_from_template};
use crate::processing::{
    ActionMessage, ActionMessageId, ActionTarget, InvalidActionReason, ProcessingContext,
    ProcessingResult,
};
use crate::restriction::{ItemInteractionType, Restriction};
use crate::state::{Item, ItemContainerPath, ItemId, ItemPath};

pub(super) fn create(
    mut ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    item_id: &ItemId,
    template: &ItemTemplate,
    container: &ItemContainerPath,
    insert_before: Option<&ItemId>,
) -> ProcessingResult {
    let Some(resolved) = ctx.get_target(target) else {
        return ctx.invalid(None);
    };
    let assets = ctx.assets();
    let Ok(item) = create_item_from_template(item_id.clone(), template, assets) else {
        return ctx.invalid(None);
    };
    let Some(asset) = assets.asset(&item.asset) else {
        return ctx.invalid(None);
    };

    if ctx.space().has_feature(SpaceFeatures::ADMIN_ONLY_SPAWN) {
        let is_admin = ctx
            .player()
            .is_some_and(|player| ctx.space().is_admin(player.account));
        if !is_admin {
            ctx.add_restriction(Restriction::SpawnNotAllowed);
        }
    }
    if !ctx.check_can_use_item_direct(&resolved, container, &item, ItemInteractionType::AddRemove) {
        return ctx.invalid(None);
    }

    // A single-instance bodypart replaces the one already worn
    let replaced = match (resolved.character(), asset.bodypart()) {
        (Some(character), Some(bodypart)) if container.is_root() => {
            let single = assets
                .bodypart(bodypart)
                .is_some_and(|definition| !definition.allow_multiple);
            character
                .items
                .iter()
                .filter(|_| single)
                .find(|worn| {
                    assets
                        .asset(&worn.asset)
                        .and_then(|worn_asset| worn_asset.bodypart())
                        == Some(bodypart)
                })
                .cloned()
        }
        _ => None,
    };
    if let Some(previous) = &replaced {
        ctx.check_can_use_item(
            &resolved,
            &ItemPath::root(previous.id.clone()),
            ItemInteractionType::AddRemove,
        );
    }

    let before = insert_before.or(replaced.as_ref().map(|previous| &previous.id));
    if !ctx
        .manipulator()
        .add_item(target, container, item.clone(), before)
    {
        return ctx.invalid(None);
    }
    if let Some(previous) = &replaced {
        let removed = ctx
            .manipulator()
            .remove_matching_items(target, container, |worn| worn.id == previous.id);
        if removed.len() != 1 {
            return ctx.invalid(None);
        }
    }
    if let (Some(character), true) = (resolved.character(), asset.is_bodypart()) {
        ctx.manipulator()
            .sort_character_bodyparts(&character.id, assets);
    }

    let message = match &replaced {
        Some(previous) => ActionMessage::new(ActionMessageId::ItemReplace, ctx.player_id().clone())
            .with_item_previous(previous),
        None => ActionMessage::new(ActionMessageId::ItemAdd, ctx.player_id().clone()),
    };
    ctx.queue_message(
        message
            .with_target(target.clone())
            .with_item(&item)
            .with_container(container.clone()),
    );
    ctx.finalize()
}

pub(super) fn delete(
    mut ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
) -> ProcessingResult {
    let Some(resolved) = ctx.get_target(target) else {
        return ctx.invalid(None);
    };
    let Some(item) = resolved.get_item(path).cloned() else {
        return ctx.invalid(None);
    };
    let Some(asset) = ctx.assets().asset(&item.asset) else {
        return ctx.invalid(None);
    };
    if asset.is_wearable_part() {
        return ctx.invalid(Some(InvalidActionReason::NoDeleteRoomDeviceWearable));
    }
    if item.is_deployed() {
        return ctx.invalid(Some(InvalidActionReason::NoDeleteDeployedRoomDevice));
    }

    ctx.check_can_use_item(&resolved, path, ItemInteractionType::AddRemove);

    let removed = ctx
        .manipulator()
        .remove_matching_items(target, &path.container, |candidate| candidate.id == path.item_id);
    if removed.len() != 1 {
        return ctx.invalid(None);
    }

    ctx.queue_message(
        ActionMessage::new(ActionMessageId::ItemRemove, ctx.player_id().clone())
            .with_target(target.clone())
            .with_item(&item)
            .with_container(path.container.clone()),
    );
    ctx.finalize()
}

pub(super) fn transfer(
    mut ctx: ProcessingContext<'_>,
    source: &ActionTargetSelector,
    path: &ItemPath,
    target: &ActionTargetSelector,
    container: &ItemContainerPath,
    insert_before: Option<&ItemId>,
) -> ProcessingResult {
    let (Some(source_target), Some(destination)) = (ctx.get_target(source), ctx.get_target(target))
    else {
        return ctx.invalid(None);
    };
    let Some(item) = source_target.get_item(path).cloned() else {
        return ctx.invalid(None);
    };

    if source == target && path.container == *container {
        return transfer_within(ctx, &source_target, path, item, insert_before);
    }

    let transferable = ctx.assets().asset(&item.asset).is_some_and(|asset| {
        !asset
            .effective_properties(&item)
            .flags
            .contains(AssetFlags::NON_TRANSFERABLE)
    });
    if !transferable {
        ctx.add_restriction(Restriction::ItemNotTransferable {
            item: item.id.clone(),
        });
    }
    ctx.check_can_use_item(&source_target, path, ItemInteractionType::AddRemove);
    if !ctx.check_can_use_item_direct(&destination, container, &item, ItemInteractionType::AddRemove)
    {
        return ctx.invalid(None);
    }

    let removed = ctx
        .manipulator()
        .remove_matching_items(source, &path.container, |candidate| candidate.id == item.id);
    if removed.len() != 1 {
        return ctx.invalid(None);
    }
    if !ctx
        .manipulator()
        .add_item(target, container, item.clone(), insert_before)
    {
        return ctx.invalid(None);
    }
    if let Some(character) = destination.character() {
        let assets = ctx.assets();
        ctx.manipulator()
            .sort_character_bodyparts(&character.id, assets);
    }

    ctx.queue_message(
        ActionMessage::new(ActionMessageId::ItemTransfer, ctx.player_id().clone())
            .with_target(target.clone())
            .with_item(&item)
            .with_container(container.clone()),
    );
    ctx.finalize()
}

/// A transfer that stays in its container degenerates to a reorder.
fn transfer_within(
    mut ctx: ProcessingContext<'_>,
    resolved: &ActionTarget,
    path: &ItemPath,
    item: Item,
    insert_before: Option<&ItemId>,
) -> ProcessingResult {
    ctx.check_can_use_item(resolved, path, ItemInteractionType::Reorder);
    if insert_before == Some(&item.id) {
        return ctx.finalize();
    }

    let selector = resolved.selector();
    let removed = ctx
        .manipulator()
        .remove_matching_items(&selector, &path.container, |candidate| candidate.id == item.id);
    if removed.len() != 1 {
        return ctx.invalid(None);
    }
    if !ctx
        .manipulator()
        .add_item(&selector, &path.container, item.clone(), insert_before)
    {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(ActionMessageId::ItemReorder, ctx.player_id().clone())
        .with_target(selector)
        .with_item(&item)
        .with_container(path.container.clone());
    queue_style_message(&mut ctx, message);
    ctx.finalize()
}

/// `move`: shift an item within its container.
pub(super) fn reorder(
    mut ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
    shift: i32,
) -> ProcessingResult {
    let Some(resolved) = ctx.get_target(target) else {
        return ctx.invalid(None);
    };
    let Some(item) = resolved.get_item(path).cloned() else {
        return ctx.invalid(None);
    };
    ctx.check_can_use_item(&resolved, path, ItemInteractionType::Reorder);

    let Some(destination) = ctx.manipulator().shifted_index(target, path, shift) else {
        return ctx.invalid(None);
    };
    // At the root the item passes its neighbours, so the one it lands next to must be movable too
    if path.container.is_root() {
        let neighbour = resolved
            .items()
            .get(destination)
            .filter(|neighbour| neighbour.id != item.id)
            .map(|neighbour| ItemPath::root(neighbour.id.clone()));
        if let Some(neighbour) = neighbour {
            ctx.check_can_use_item(&resolved, &neighbour, ItemInteractionType::Reorder);
        }
    }

    if !ctx.manipulator().move_item(target, path, shift) {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(ActionMessageId::ItemMove, ctx.player_id().clone())
        .with_target(target.clone())
        .with_item(&item)
        .with_container(path.container.clone());
    queue_style_message(&mut ctx, message);
    ctx.finalize()
}

/// Styling and reorder messages are announced only where the space asks for them.
pub(super) fn queue_style_message(ctx: &mut ProcessingContext<'_>, message: ActionMessage) {
    if ctx.space().has_feature(SpaceFeatures::STYLE_MESSAGES) {
        ctx.queue_message(message);
    }
}
