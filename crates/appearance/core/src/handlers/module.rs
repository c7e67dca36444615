use crate::action::{ActionTargetSelector, ModuleActionData};
use crate::module::{do_module_action, module_interaction_type};
use crate::processing::{
    ActionMessage, ModuleActionContext, Problem, ProcessingContext, ProcessingResult,
};
use crate::state::ItemPath;

pub(super) fn module_action(
    mut ctx: ProcessingContext<'_>,
    target: &ActionTargetSelector,
    path: &ItemPath,
    module: &str,
    action: &ModuleActionData,
) -> ProcessingResult {
    let Some(resolved) = ctx.get_target(target) else {
        return ctx.invalid(None);
    };
    let Some(item) = resolved.get_item(path).cloned() else {
        return ctx.invalid(None);
    };
    let assets = ctx.assets();
    let (Some(definition), Some(state)) = (
        assets
            .asset(&item.asset)
            .and_then(|asset| asset.modules.get(module)),
        item.modules.get(module),
    ) else {
        return ctx.invalid(None);
    };

    ctx.check_can_use_item_module(&resolved, path, module, module_interaction_type(definition));

    let player = ctx.player_id().clone();
    let force = resolved
        .character()
        .is_some_and(|character| ctx.is_forced_on(&character.id));
    let mut module_ctx = ModuleActionContext::new(&player, target.clone(), item.id.clone(), module)
        .with_force(force)
        .with_execution(ctx.execution(), ctx.now());
    let next = do_module_action(definition, state, action, assets, &mut module_ctx);
    let report = module_ctx.into_report();

    for error in report.errors {
        ctx.add_problem(Problem::from(error));
    }
    let Some(next) = next else {
        return ctx.finalize();
    };

    let edited = ctx.manipulator().modify_item(target, path, |current| {
        let mut updated = current.clone();
        updated.modules.insert(module.to_owned(), next);
        Some(updated)
    });
    if !edited {
        return ctx.invalid(None);
    }

    for data in report.data {
        ctx.add_data(data);
    }
    for id in report.messages {
        ctx.queue_message(
            ActionMessage::new(id, player.clone())
                .with_target(target.clone())
                .with_item(&item)
                .with_container(path.container.clone())
                .with_module(module),
        );
    }
    ctx.finalize()
}
