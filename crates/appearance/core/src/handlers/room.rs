//! Room devices and room layout.
//!
//! Devices live at the root of the room inventory. Occupancy is recorded on
//! both sides: the device lists the occupant per slot and the occupant wears
//! a wearable part linking back to the slot. State validation rejects any
//! result where the two sides disagree.

use crate::action::ActionTargetSelector;
use crate::env::create_wearable_part;
use crate::processing::{
    ActionMessage, ActionMessageId, ActionTarget, ProcessingContext, ProcessingResult,
    SlowdownReason,
};
use crate::restriction::{ItemInteractionType, Restriction};
use crate::state::{
    CharacterId, DeviceLink, Item, ItemContainerPath, ItemId, ItemPath, RoomBackground,
    RoomPosition,
};

/// Looks up a room device at the root of the room inventory.
fn find_device(ctx: &ProcessingContext<'_>, id: &ItemId) -> Option<(ActionTarget, Item)> {
    let room = ctx.get_target(&ActionTargetSelector::RoomInventory)?;
    let device = room.get_item(&ItemPath::root(id.clone()))?.clone();
    let is_device = ctx
        .assets()
        .asset(&device.asset)
        .is_some_and(|asset| asset.is_room_device());
    (is_device && device.device.is_some()).then_some((room, device))
}

pub(super) fn device_deploy(
    mut ctx: ProcessingContext<'_>,
    item: &ItemId,
    deployment: Option<RoomPosition>,
) -> ProcessingResult {
    let Some((room, device)) = find_device(&ctx, item) else {
        return ctx.invalid(None);
    };
    let path = ItemPath::root(item.clone());

    ctx.check_player_is_space_admin();
    if deployment.is_none() {
        for slot in device.device.iter().flat_map(|state| state.slots.keys()) {
            ctx.add_restriction(Restriction::DeviceSlotOccupied { slot: slot.clone() });
        }
    }
    ctx.check_can_use_item(&room, &path, ItemInteractionType::Modify);

    let edited = ctx
        .manipulator()
        .modify_item(&ActionTargetSelector::RoomInventory, &path, |current| {
            let mut next = current.clone();
            next.device.as_mut()?.deployment = deployment;
            Some(next)
        });
    if !edited {
        return ctx.invalid(None);
    }

    let id = match deployment {
        Some(_) => ActionMessageId::RoomDeviceDeploy,
        None => ActionMessageId::RoomDeviceStore,
    };
    let message = ActionMessage::new(id, ctx.player_id().clone())
        .with_target(ActionTargetSelector::RoomInventory)
        .with_item(&device);
    ctx.queue_message(message);
    ctx.finalize()
}

pub(super) fn device_enter(
    mut ctx: ProcessingContext<'_>,
    item: &ItemId,
    slot: &str,
    character: &CharacterId,
    part_id: &ItemId,
) -> ProcessingResult {
    let Some((room, device)) = find_device(&ctx, item) else {
        return ctx.invalid(None);
    };
    let Some(wearable) = ctx
        .assets()
        .asset(&device.asset)
        .and_then(|asset| asset.device_slot(slot))
        .map(|definition| definition.wearable.clone())
    else {
        return ctx.invalid(None);
    };
    if !device.is_deployed() {
        return ctx.invalid(None);
    }
    let Some(occupant) = ctx.state().characters.get(character).cloned() else {
        return ctx.invalid(None);
    };
    let path = ItemPath::root(item.clone());

    let occupied = device
        .device
        .as_ref()
        .is_some_and(|state| state.slots.contains_key(slot));
    if occupied {
        ctx.add_restriction(Restriction::DeviceSlotOccupied { slot: slot.to_owned() });
    }
    if occupant.room_device_part().is_some() {
        ctx.add_restriction(Restriction::InRoomDevice {
            character: occupant.id.clone(),
        });
    }
    ctx.check_can_use_item(&room, &path, ItemInteractionType::DeviceEnterLeave);

    let link = DeviceLink {
        device: item.clone(),
        slot: slot.to_owned(),
    };
    let Ok(part) = create_wearable_part(part_id.clone(), &wearable, link, ctx.assets()) else {
        return ctx.invalid(None);
    };
    let wearer = ActionTarget::Character(occupant.clone());
    ctx.check_can_use_item_direct(
        &wearer,
        &ItemContainerPath::root(),
        &part,
        ItemInteractionType::AddRemove,
    );
    ctx.add_slowdown(SlowdownReason::RoomDevice);

    let target = ActionTargetSelector::character(occupant.id.clone());
    let manipulator = ctx.manipulator();
    let edited = manipulator.modify_item(&ActionTargetSelector::RoomInventory, &path, |current| {
        let mut next = current.clone();
        next.device
            .as_mut()?
            .slots
            .insert(slot.to_owned(), occupant.id.clone());
        Some(next)
    }) && manipulator.add_item(&target, &ItemContainerPath::root(), part, None);
    if !edited {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(ActionMessageId::RoomDeviceSlotEnter, ctx.player_id().clone())
        .with_target(target)
        .with_item(&device)
        .with_slot(slot);
    ctx.queue_message(message);
    ctx.finalize()
}

/// Frees a slot. An occupant who is still present loses their wearable part;
/// for an absent one only the device side is cleared.
pub(super) fn device_leave(
    mut ctx: ProcessingContext<'_>,
    item: &ItemId,
    slot: &str,
) -> ProcessingResult {
    let Some((room, device)) = find_device(&ctx, item) else {
        return ctx.invalid(None);
    };
    let Some(occupant) = device
        .device
        .as_ref()
        .and_then(|state| state.slots.get(slot))
        .cloned()
    else {
        return ctx.invalid(None);
    };
    let path = ItemPath::root(item.clone());
    ctx.check_can_use_item(&room, &path, ItemInteractionType::DeviceEnterLeave);

    let edited = ctx
        .manipulator()
        .modify_item(&ActionTargetSelector::RoomInventory, &path, |current| {
            let mut next = current.clone();
            next.device.as_mut()?.slots.remove(slot);
            Some(next)
        });
    if !edited {
        return ctx.invalid(None);
    }

    let is_part = |candidate: &Item| {
        candidate
            .device_link
            .as_ref()
            .is_some_and(|link| link.device == *item && link.slot == slot)
    };
    let part = ctx
        .state()
        .characters
        .get(&occupant)
        .and_then(|character| character.items.iter().find(|worn| is_part(worn)))
        .cloned();
    let target = ActionTargetSelector::character(occupant.clone());

    let message_id = match (part, ctx.get_target(&target)) {
        (Some(part), Some(wearer)) => {
            ctx.check_can_use_item(
                &wearer,
                &ItemPath::root(part.id.clone()),
                ItemInteractionType::AddRemove,
            );
            ctx.add_slowdown(SlowdownReason::RoomDevice);
            let removed = ctx
                .manipulator()
                .remove_matching_items(&target, &ItemContainerPath::root(), is_part);
            if removed.is_empty() {
                return ctx.invalid(None);
            }
            ActionMessageId::RoomDeviceSlotLeave
        }
        _ => ActionMessageId::RoomDeviceSlotClear,
    };

    let message = ActionMessage::new(message_id, ctx.player_id().clone())
        .with_target(target)
        .with_item(&device)
        .with_slot(slot);
    ctx.queue_message(message);
    ctx.finalize()
}

pub(super) fn configure(mut ctx: ProcessingContext<'_>, background: RoomBackground) -> ProcessingResult {
    ctx.check_player_is_space_admin();

    let edited = ctx.manipulator().produce_room_state(|room| {
        let mut next = room.clone();
        next.background = background;
        Some(next)
    });
    if !edited {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(ActionMessageId::RoomConfigure, ctx.player_id().clone())
        .with_target(ActionTargetSelector::RoomInventory);
    ctx.queue_message(message);
    ctx.finalize()
}

#[cfg(test)]
mod tests {
    use crate::action::AppearanceAction;
    use crate::processing::{ActionMessageId, InvalidActionReason, Problem, SlowdownReason};
    use crate::restriction::Restriction;
    use crate::action::ActionTargetSelector;
    use crate::env::ItemTemplate;
    use crate::restriction::PermissionRef;
    use crate::state::{
        AssetId, CharacterId, InteractionId, ItemContainerPath, ItemId, PermissionSetting,
        RoomBackground, RoomDeviceState, RoomPosition, StateValidationError,
    };
    use crate::testing::Harness;

    fn cage() -> ItemId {
        ItemId::new("i/cage")
    }

    fn deploy(at: Option<RoomPosition>) -> AppearanceAction {
        AppearanceAction::RoomDeviceDeploy {
            item: cage(),
            deployment: at,
        }
    }

    fn enter(character: &str) -> AppearanceAction {
        AppearanceAction::RoomDeviceEnter {
            item: cage(),
            slot: "inside".into(),
            character: CharacterId::new(character),
            item_id: ItemId::new("i/cage-part"),
        }
    }

    fn leave() -> AppearanceAction {
        AppearanceAction::RoomDeviceLeave {
            item: cage(),
            slot: "inside".into(),
        }
    }

    /// Harness whose cage is deployed at (50, 50).
    fn deployed() -> Harness {
        let mut harness = Harness::new();
        harness.state.room_mut().items[0].device = Some(RoomDeviceState {
            deployment: Some(RoomPosition::new(50, 50)),
            slots: Default::default(),
        });
        harness
    }

    #[test]
    fn deploying_is_admin_only() {
        let harness = Harness::new();
        let at = Some(RoomPosition::new(10, 20));

        assert_eq!(
            harness.process("c2", &deploy(at)).problems(),
            [Problem::from(Restriction::ModifyRoomNotAdmin)]
        );

        let result = harness.process("c1", &deploy(at));
        let valid = result.valid().unwrap();
        assert_eq!(valid.messages[0].id, ActionMessageId::RoomDeviceDeploy);
        assert_eq!(valid.state.room.items[0].device.as_ref().unwrap().deployment, at);
    }

    #[test]
    fn deploying_outside_the_room_fails_validation() {
        let harness = Harness::new();
        assert_eq!(
            harness
                .process("c1", &deploy(Some(RoomPosition::new(5_000, 0))))
                .problems(),
            [Problem::ValidationError {
                error: StateValidationError::DeploymentOutOfBounds(cage()),
            }]
        );
    }

    #[test]
    fn entering_links_both_sides() {
        let harness = deployed();

        let result = harness.process("c1", &enter("c2"));
        assert!(result.slowdown().reasons.contains(&SlowdownReason::RoomDevice));
        let valid = result.valid().unwrap();
        assert_eq!(valid.messages[0].id, ActionMessageId::RoomDeviceSlotEnter);
        assert_eq!(valid.messages[0].slot.as_deref(), Some("inside"));

        let c2 = valid.state.character(&CharacterId::new("c2")).unwrap();
        let part = c2.room_device_part().unwrap();
        assert_eq!(part.id, ItemId::new("i/cage-part"));
        assert_eq!(
            valid.state.room.items[0].device.as_ref().unwrap().slots.get("inside"),
            Some(&CharacterId::new("c2"))
        );
    }

    #[test]
    fn entering_needs_free_slot_and_deployed_device() {
        let stored = Harness::new();
        assert_eq!(
            stored.process("c1", &enter("c2")).problems(),
            [Problem::InvalidAction { reason: None }]
        );

        let mut harness = deployed();
        let entered = harness.process("c1", &enter("c2"));
        harness.state = entered.valid().unwrap().state.clone();

        let again = harness.process("c2", &enter("c1"));
        assert!(
            again
                .problems()
                .contains(&Problem::from(Restriction::DeviceSlotOccupied { slot: "inside".into() }))
        );
    }

    #[test]
    fn leaving_removes_the_part() {
        let mut harness = deployed();
        let entered = harness.process("c1", &enter("c2"));
        harness.state = entered.valid().unwrap().state.clone();

        let result = harness.process("c1", &leave());
        let valid = result.valid().unwrap();
        assert_eq!(valid.messages[0].id, ActionMessageId::RoomDeviceSlotLeave);
        let c2 = valid.state.character(&CharacterId::new("c2")).unwrap();
        assert!(c2.room_device_part().is_none());
        assert!(valid.state.room.items[0].device.as_ref().unwrap().slots.is_empty());
    }

    #[test]
    fn leaving_for_absent_character_only_clears_slot() {
        let mut harness = deployed();
        harness.state.room_mut().items[0]
            .device
            .as_mut()
            .unwrap()
            .slots
            .insert("inside".into(), CharacterId::new("c9"));

        let result = harness.process("c1", &leave());
        let valid = result.valid().unwrap();
        assert_eq!(valid.messages[0].id, ActionMessageId::RoomDeviceSlotClear);
        assert!(valid.slowdown.reasons.is_empty());
    }

    #[test]
    fn occupied_devices_cannot_be_stored_or_deleted() {
        let mut harness = deployed();
        let entered = harness.process("c1", &enter("c2"));
        harness.state = entered.valid().unwrap().state.clone();

        assert!(
            harness
                .process("c1", &deploy(None))
                .problems()
                .contains(&Problem::from(Restriction::DeviceSlotOccupied { slot: "inside".into() }))
        );
        let delete = AppearanceAction::Delete {
            target: crate::action::ActionTargetSelector::RoomInventory,
            item: crate::state::ItemPath::root(cage()),
        };
        assert_eq!(
            harness.process("c1", &delete).problems(),
            [Problem::invalid(InvalidActionReason::NoDeleteDeployedRoomDevice)]
        );
    }

    #[test]
    fn configure_keeps_everything_in_bounds() {
        let harness = deployed();

        assert_eq!(
            harness
                .process("c2", &AppearanceAction::RoomConfigure {
                    background: RoomBackground::new(500, 500),
                })
                .problems(),
            [Problem::from(Restriction::ModifyRoomNotAdmin)]
        );

        let shrunk = harness.process("c1", &AppearanceAction::RoomConfigure {
            background: RoomBackground::new(40, 40),
        });
        assert_eq!(
            shrunk.problems(),
            [Problem::ValidationError {
                error: StateValidationError::DeploymentOutOfBounds(cage()),
            }]
        );
    }

    /// c2 refuses any interaction with c1.
    fn c2_denies_c1(harness: &mut Harness) {
        harness
            .state
            .character_mut(&CharacterId::new("c2"))
            .unwrap()
            .permissions
            .interact
            .overrides
            .insert(CharacterId::new("c1"), PermissionSetting::Deny);
    }

    #[test]
    fn device_contents_answer_to_the_occupant() {
        let put_inside = AppearanceAction::Create {
            target: ActionTargetSelector::RoomInventory,
            item_id: ItemId::new("i/blanket"),
            item_template: ItemTemplate::new(AssetId::new("a/shirt")),
            container: ItemContainerPath::root().join(cage(), "inside"),
            insert_before: None,
        };
        let mut harness = deployed();
        let entered = harness.process("c1", &enter("c2"));
        let occupied = entered.valid().unwrap().state.clone();

        c2_denies_c1(&mut harness);
        assert!(harness.process("c1", &put_inside).is_valid());

        harness.state = occupied;
        c2_denies_c1(&mut harness);
        assert_eq!(
            harness.process("c1", &put_inside).problems(),
            [Problem::from(Restriction::MissingPermission {
                permission: PermissionRef::interaction(CharacterId::new("c2"), InteractionId::Interact),
                prompt: false,
            })]
        );
        assert!(harness.process("c2", &put_inside).is_valid());
    }
}
