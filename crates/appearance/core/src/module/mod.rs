//! Item module behavior.
//!
//! Module logic only sees the module definition, its current state and a
//! [`ModuleActionContext`]. It returns the next module state or `None` after
//! reporting why through the context.
mod lock_slot;
mod typed;

use crate::action::ModuleActionData;
use crate::env::{AssetOracle, ModuleDefinition, ModuleKind};
use crate::processing::{ModuleActionContext, ModuleRejectReason};
use crate::restriction::ItemInteractionType;
use crate::state::ModuleState;

/// How changing a module is classified for restriction checks.
pub fn module_interaction_type(definition: &ModuleDefinition) -> ItemInteractionType {
    if definition.expression {
        ItemInteractionType::ExpressionChange
    } else {
        ItemInteractionType::Modify
    }
}

/// Runs a module action. Returns the next module state, or `None` if the
/// module rejected the action.
pub fn do_module_action(
    definition: &ModuleDefinition,
    state: &ModuleState,
    action: &ModuleActionData,
    assets: &dyn AssetOracle,
    ctx: &mut ModuleActionContext<'_>,
) -> Option<ModuleState> {
    match (&definition.kind, state, action) {
        (ModuleKind::Typed { .. }, ModuleState::Typed { .. }, ModuleActionData::Typed { set_variant }) => {
            typed::set_variant(definition, set_variant, ctx)
        }
        (
            ModuleKind::LockSlot { .. },
            ModuleState::LockSlot { contents },
            ModuleActionData::LockSlot { lock_action },
        ) => lock_slot::lock_action(contents, lock_action, assets, ctx),
        _ => {
            ctx.reject(ModuleRejectReason::NotSupported);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTargetSelector;
    use crate::processing::ModuleActionError;
    use crate::state::{CharacterId, ItemId};
    use crate::testing::fixture_assets;

    #[test]
    fn storage_modules_have_no_actions() {
        let assets = fixture_assets();
        let actor = CharacterId::new("c1");
        let mut ctx = ModuleActionContext::new(
            &actor,
            ActionTargetSelector::character(actor.clone()),
            ItemId::new("i/bag"),
            "storage",
        );

        let next = do_module_action(
            &ModuleDefinition::storage(2),
            &ModuleState::Storage { contents: Vec::new() },
            &ModuleActionData::Typed {
                set_variant: "open".into(),
            },
            &assets,
            &mut ctx,
        );
        assert!(next.is_none());
        assert_eq!(
            ctx.into_report().errors,
            vec![ModuleActionError::Reject {
                module: "storage".into(),
                reason: ModuleRejectReason::NotSupported,
            }]
        );
    }

    #[test]
    fn expression_modules_are_expression_changes() {
        let definition = ModuleDefinition::typed("open", [crate::env::TypedVariant::new("open")]).as_expression();
        assert_eq!(
            module_interaction_type(&definition),
            ItemInteractionType::ExpressionChange
        );
        assert_eq!(
            module_interaction_type(&ModuleDefinition::storage(1)),
            ItemInteractionType::Modify
        );
    }
}
