//! Character-level actions: skeleton, restriction overrides, attempts and placement.

use std::collections::BTreeMap;

use crate::action::ActionTargetSelector;
use crate::env::{BoneKind, SpaceFeatures};
use crate::processing::{
    ActionMessage, ActionMessageId, InvalidActionReason, ProcessingContext, ProcessingResult,
};
use crate::restriction::Restriction;
use crate::state::{
    ArmPose, CharacterId, InteractionId, LegsPose, PoseState, RestrictionOverride,
    RestrictionOverrideMode, RoomPosition, View,
};

// ===== skeleton =====

pub(super) fn body(
    mut ctx: ProcessingContext<'_>,
    target: &CharacterId,
    bones: &BTreeMap<String, i16>,
) -> ProcessingResult {
    let Some(character) = ctx.state().characters.get(target).cloned() else {
        return ctx.invalid(None);
    };
    if !ctx.space().has_feature(SpaceFeatures::BODY_MODIFICATION) {
        ctx.add_restriction(Restriction::ModifyBodyRoom);
    }
    ctx.add_interaction(&character, InteractionId::ModifyBody);

    edit_pose(ctx, target, bones, BoneKind::Body, |_| {})
}

pub(super) fn pose(
    mut ctx: ProcessingContext<'_>,
    target: &CharacterId,
    bones: &BTreeMap<String, i16>,
    arms: Option<ArmPose>,
    legs: Option<LegsPose>,
    view: Option<View>,
) -> ProcessingResult {
    let Some(character) = ctx.state().characters.get(target).cloned() else {
        return ctx.invalid(None);
    };
    ctx.add_interaction(&character, InteractionId::Posing);

    edit_pose(ctx, target, bones, BoneKind::Pose, |pose| {
        if let Some(arms) = arms {
            pose.arms = arms;
        }
        if let Some(legs) = legs {
            pose.legs = legs;
        }
        if let Some(view) = view {
            pose.view = view;
        }
    })
}

/// Writes `bones` (all of `kind`) plus any extra pose fields.
fn edit_pose(
    mut ctx: ProcessingContext<'_>,
    target: &CharacterId,
    bones: &BTreeMap<String, i16>,
    kind: BoneKind,
    extra: impl FnOnce(&mut PoseState),
) -> ProcessingResult {
    let assets = ctx.assets();
    let all_of_kind = bones
        .keys()
        .all(|name| assets.bone(name).is_some_and(|bone| bone.kind == kind));
    if !all_of_kind {
        return ctx.invalid(None);
    }

    let edited = ctx.manipulator().produce_character_state(target, |character| {
        let mut next = character.clone();
        next.pose
            .bones
            .extend(bones.iter().map(|(name, value)| (name.clone(), *value)));
        extra(&mut next.pose);
        Some(next)
    });
    if !edited {
        return ctx.invalid(None);
    }
    ctx.finalize()
}

// ===== restriction overrides =====

/// Moves the player between `normal` and one of the override modes.
///
/// Overrides are entered from `normal` only, and left back to `normal` only
/// once `allow_leave_at` has passed.
pub(super) fn restriction_override_change(
    mut ctx: ProcessingContext<'_>,
    mode: RestrictionOverrideMode,
) -> ProcessingResult {
    let Some(player) = ctx.player() else {
        return ctx.invalid(None);
    };
    let current = player.override_mode();
    if mode == current {
        return ctx.invalid(None);
    }

    let (next, message) = match (current, player.restriction_override) {
        (RestrictionOverrideMode::Normal, _) => {
            let space = ctx.space();
            let cooldown = match mode {
                RestrictionOverrideMode::Safemode => space.safemode_cooldown_ms(),
                _ => space.timeout_cooldown_ms(),
            };
            let next = RestrictionOverride {
                mode,
                allow_leave_at: ctx.now().saturating_add(cooldown),
            };
            let message = match mode {
                RestrictionOverrideMode::Safemode => ActionMessageId::SafemodeEnter,
                _ => ActionMessageId::TimeoutEnter,
            };
            (Some(next), message)
        }
        (_, Some(active)) if mode == RestrictionOverrideMode::Normal => {
            let cooldown_active = ctx.now() < active.allow_leave_at
                && !ctx
                    .space()
                    .has_feature(SpaceFeatures::DEVELOPMENT_NO_COOLDOWN);
            if cooldown_active {
                return ctx.invalid(Some(InvalidActionReason::RestrictionOverrideCooldown));
            }
            let message = match current {
                RestrictionOverrideMode::Safemode => ActionMessageId::SafemodeLeave,
                _ => ActionMessageId::TimeoutLeave,
            };
            (None, message)
        }
        // Switching directly between override modes
        _ => return ctx.invalid(None),
    };

    let edited = ctx.manipulator().produce_character_state(&player.id, |character| {
        let mut updated = character.clone();
        updated.restriction_override = next;
        Some(updated)
    });
    if !edited {
        return ctx.invalid(None);
    }

    ctx.queue_message(ActionMessage::new(message, player.id.clone()));
    ctx.finalize()
}

// ===== attempts =====

pub(super) fn attempt_interrupt(
    mut ctx: ProcessingContext<'_>,
    target: &CharacterId,
) -> ProcessingResult {
    let Some(character) = ctx.state().characters.get(target).cloned() else {
        return ctx.invalid(None);
    };
    if character.attempting_action.is_none() {
        return ctx.invalid(Some(InvalidActionReason::NoAttempt));
    }

    // Giving up one's own attempt needs no hands
    if character.id != *ctx.player_id() {
        ctx.add_interaction(&character, InteractionId::Interact);
        ctx.check_player_hands();
    }

    let edited = ctx.manipulator().produce_character_state(target, |character| {
        let mut next = character.clone();
        next.attempting_action = None;
        Some(next)
    });
    if !edited {
        return ctx.invalid(None);
    }

    let message = ActionMessage::new(ActionMessageId::AttemptInterrupt, ctx.player_id().clone())
        .with_target(ActionTargetSelector::character(target.clone()));
    ctx.queue_message(message);
    ctx.finalize()
}

// ===== placement =====

pub(super) fn move_character(
    mut ctx: ProcessingContext<'_>,
    target: &CharacterId,
    position: RoomPosition,
) -> ProcessingResult {
    let Some(character) = ctx.state().characters.get(target).cloned() else {
        return ctx.invalid(None);
    };
    ctx.add_interaction(&character, InteractionId::Interact);
    if character.room_device_part().is_some() {
        ctx.add_restriction(Restriction::InRoomDevice {
            character: character.id.clone(),
        });
    }

    let edited = ctx.manipulator().produce_character_state(target, |character| {
        let mut next = character.clone();
        next.position = position;
        Some(next)
    });
    if !edited {
        return ctx.invalid(None);
    }
    ctx.finalize()
}
