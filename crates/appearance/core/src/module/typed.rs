use crate::env::ModuleDefinition;
use crate::processing::{ActionMessageId, ModuleActionContext, ModuleRejectReason};
use crate::state::ModuleState;

pub(super) fn set_variant(
    definition: &ModuleDefinition,
    variant: &str,
    ctx: &mut ModuleActionContext<'_>,
) -> Option<ModuleState> {
    if definition.typed_variant(variant).is_none() {
        ctx.reject(ModuleRejectReason::UnknownVariant);
        return None;
    }
    ctx.message(ActionMessageId::ModuleChange);
    Some(ModuleState::Typed {
        variant: variant.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTargetSelector;
    use crate::env::TypedVariant;
    use crate::state::{CharacterId, ItemId};

    #[test]
    fn only_known_variants_are_selected() {
        let definition =
            ModuleDefinition::typed("loose", [TypedVariant::new("loose"), TypedVariant::new("tight")]);
        let actor = CharacterId::new("c1");
        let mut ctx = ModuleActionContext::new(
            &actor,
            ActionTargetSelector::character(actor.clone()),
            ItemId::new("i/gag"),
            "tightness",
        );

        assert_eq!(
            set_variant(&definition, "tight", &mut ctx),
            Some(ModuleState::Typed {
                variant: "tight".into()
            })
        );
        assert_eq!(set_variant(&definition, "shredded", &mut ctx), None);

        let report = ctx.into_report();
        assert_eq!(report.messages, vec![ActionMessageId::ModuleChange]);
        assert_eq!(report.errors.len(), 1);
    }
}
