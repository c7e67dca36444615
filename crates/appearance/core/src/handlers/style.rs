//! Color and custom name/description.

use super::item::queue_style_message;
use crate::action::ActionTargetSelector;
use crate::processing::{ActionMessage, ActionMessageId, ActionTarget, ProcessingContext, ProcessingResult};
use crate::restriction::ItemInteractionType;
use crate::state::{ColorBundle, Item, ItemPath};

pub(super) fn color(
    ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
    color: &ColorBundle,
) -> ProcessingResult {
    restyle(ctx, target, path, ActionMessageId::ItemColor, |item| {
        item.color = color.clone();
    })
}

pub(super) fn customize(
    ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
    name: Option<&str>,
    description: Option<&str>,
) -> ProcessingResult {
    restyle(ctx, target, path, ActionMessageId::ItemCustomize, |item| {
        item.name = name.map(str::to_owned);
        item.description = description.map(str::to_owned);
    })
}

fn restyle(
    mut ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
    message: ActionMessageId,
    apply: impl FnOnce(&mut Item),
) -> ProcessingResult {
    let Some(resolved) = ctx.get_target(target) else {
        return ctx.invalid(None);
    };
    let Some(item) = resolved.get_item(path).cloned() else {
        return ctx.invalid(None);
    };
    check_styling(&mut ctx, &resolved, path, &item);

    let edited = ctx.manipulator().modify_item(target, path, |current| {
        let mut next = current.clone();
        apply(&mut next);
        Some(next)
    });
    if !edited {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(message, ctx.player_id().clone())
        .with_target(target.clone())
        .with_item(&item)
        .with_container(path.container.clone());
    queue_style_message(&mut ctx, message);
    ctx.finalize()
}

/// Room devices are part of the room layout and only admins restyle them.
fn check_styling(ctx: &mut ProcessingContext<'_>, resolved: &ActionTarget, path: &ItemPath, item: &Item) {
    let is_room_device = ctx
        .assets()
        .asset(&item.asset)
        .is_some_and(|asset| asset.is_room_device());
    if is_room_device {
        ctx.check_player_is_space_admin();
    } else {
        ctx.check_can_use_item(resolved, path, ItemInteractionType::Styling);
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{ActionTargetSelector, AppearanceAction};
    use crate::env::{SpaceFeatures, StaticSpace};
    use crate::processing::{ActionMessageId, Problem};
    use crate::restriction::Restriction;
    use crate::state::{AccountId, CharacterId, ColorBundle, HexColor, ItemId, ItemPath};
    use crate::testing::Harness;

    fn recolor_cage() -> AppearanceAction {
        AppearanceAction::Color {
            target: ActionTargetSelector::RoomInventory,
            item: ItemPath::root(ItemId::new("i/cage")),
            color: ColorBundle::from([("bars".to_owned(), HexColor::new("#202020"))]),
        }
    }

    #[test]
    fn room_devices_need_admin() {
        let harness = Harness::new();

        assert!(harness.process("c1", &recolor_cage()).is_valid());
        assert_eq!(
            harness.process("c2", &recolor_cage()).problems(),
            [Problem::from(Restriction::ModifyRoomNotAdmin)]
        );
    }

    #[test]
    fn styling_messages_follow_space_feature() {
        let mut harness = Harness::new();
        let action = AppearanceAction::Customize {
            target: ActionTargetSelector::character(CharacterId::new("c1")),
            item: ItemPath::root(ItemId::new("i/c1-shirt")),
            name: Some("Lucky shirt".into()),
            description: None,
        };

        let quiet = harness.process("c1", &action);
        let quiet = quiet.valid().unwrap();
        assert!(quiet.messages.is_empty());
        let shirt = &quiet.state.character(&CharacterId::new("c1")).unwrap().items[2];
        assert_eq!(shirt.name.as_deref(), Some("Lucky shirt"));

        harness.space = StaticSpace::new(SpaceFeatures::BODY_MODIFICATION | SpaceFeatures::STYLE_MESSAGES)
            .with_admin(AccountId(1));
        let announced = harness.process("c1", &action);
        assert_eq!(
            announced.valid().unwrap().messages[0].id,
            ActionMessageId::ItemCustomize
        );
    }
}
