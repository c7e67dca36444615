//! Per-action handlers.
//!
//! Every handler follows the same shape: resolve targets, run checks (which
//! append problems without aborting), edit through the manipulator, queue
//! messages and finalize. A missing target or a failed edit aborts through
//! `invalid()`.
mod character;
mod item;
mod module;
mod randomize;
mod room;
mod style;

use crate::action::AppearanceAction;
use crate::processing::{ProcessingContext, ProcessingResult};

/// Routes an action to its handler. The match is exhaustive over the action union.
pub(crate) fn dispatch(action: &AppearanceAction, ctx: ProcessingContext<'_>) -> ProcessingResult {
    match action {
        AppearanceAction::Create {
            target,
            item_id,
            item_template,
            container,
            insert_before,
        } => item::create(
            ctx,
            target,
            item_id,
            item_template,
            container,
            insert_before.as_ref(),
        ),
        AppearanceAction::Delete { target, item } => item::delete(ctx, target, item),
        AppearanceAction::Transfer {
            source,
            item,
            target,
            container,
            insert_before,
        } => item::transfer(ctx, source, item, target, container, insert_before.as_ref()),
        AppearanceAction::Move {
            target,
            item,
            shift,
        } => item::reorder(ctx, target, item, *shift),
        AppearanceAction::Color {
            target,
            item,
            color,
        } => style::color(ctx, target, item, color),
        AppearanceAction::Customize {
            target,
            item,
            name,
            description,
        } => style::customize(ctx, target, item, name.as_deref(), description.as_deref()),
        AppearanceAction::ModuleAction {
            target,
            item,
            module,
            action,
        } => module::module_action(ctx, target, item, module, action),
        AppearanceAction::Body { target, bones } => character::body(ctx, target, bones),
        AppearanceAction::Pose {
            target,
            bones,
            arms,
            legs,
            view,
        } => character::pose(ctx, target, bones, *arms, *legs, *view),
        AppearanceAction::RestrictionOverrideChange { mode } => {
            character::restriction_override_change(ctx, *mode)
        }
        AppearanceAction::Randomize { kind, seed } => randomize::randomize(ctx, *kind, seed),
        AppearanceAction::RoomDeviceDeploy { item, deployment } => {
            room::device_deploy(ctx, item, *deployment)
        }
        AppearanceAction::RoomDeviceEnter {
            item,
            slot,
            character,
            item_id,
        } => room::device_enter(ctx, item, slot, character, item_id),
        AppearanceAction::RoomDeviceLeave { item, slot } => room::device_leave(ctx, item, slot),
        AppearanceAction::ActionAttemptInterrupt { target } => {
            character::attempt_interrupt(ctx, target)
        }
        AppearanceAction::MoveCharacter { target, position } => {
            character::move_character(ctx, target, *position)
        }
        AppearanceAction::RoomConfigure { background } => room::configure(ctx, *background),
    }
}
