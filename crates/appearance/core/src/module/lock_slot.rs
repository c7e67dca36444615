use crate::action::{ActionTargetSelector, LockAction};
use crate::env::AssetOracle;
use crate::processing::{
    ActionData, ActionMessageId, ExecutionContext, ModuleActionContext, ModuleFailureReason,
    ModuleRejectReason,
};
use crate::state::{Item, LockState, LockedBy, ModuleState};

/// Locks or unlocks the lock held by a lock slot.
pub(super) fn lock_action(
    contents: &[Item],
    action: &LockAction,
    assets: &dyn AssetOracle,
    ctx: &mut ModuleActionContext<'_>,
) -> Option<ModuleState> {
    let Some(lock_item) = contents.first() else {
        ctx.reject(ModuleRejectReason::NoLock);
        return None;
    };
    let Some(definition) = assets.asset(&lock_item.asset).and_then(|asset| asset.lock()) else {
        ctx.reject(ModuleRejectReason::NoLock);
        return None;
    };
    let current = lock_item.lock.clone().unwrap_or_default();

    let next = match action {
        LockAction::Lock { password } => {
            if current.locked.is_some() {
                ctx.reject(ModuleRejectReason::AlreadyLocked);
                return None;
            }
            let password = match (definition.password, password) {
                (None, _) => None,
                (Some(_), None) => {
                    ctx.failure(ModuleFailureReason::PasswordRequired);
                    return None;
                }
                (Some(rule), Some(password)) if rule.accepts(password) => Some(password.clone()),
                (Some(_), Some(_)) => {
                    ctx.failure(ModuleFailureReason::PasswordInvalid);
                    return None;
                }
            };
            LockState {
                locked: Some(LockedBy {
                    character: ctx.actor.clone(),
                    at: ctx.now,
                    password,
                }),
            }
        }
        LockAction::Unlock { password } => {
            let Some(locked) = &current.locked else {
                ctx.reject(ModuleRejectReason::NotLocked);
                return None;
            };
            let on_self = ctx.target().character_id() == Some(ctx.actor);
            if definition.block_self && on_self && !ctx.force {
                ctx.reject(ModuleRejectReason::BlockSelf);
                return None;
            }
            // Clients never know the password; only authoritative processing compares it
            if let Some(expected) = &locked.password {
                if ctx.execution == ExecutionContext::Act && password.as_ref() != Some(expected) {
                    ctx.reject(ModuleRejectReason::WrongPassword);
                    return None;
                }
            }
            LockState { locked: None }
        }
    };

    let locked = next.locked.is_some();
    let mut item = lock_item.clone();
    item.lock = Some(next);
    let mut contents = contents.to_vec();
    contents[0] = item;

    ctx.message(if locked {
        ActionMessageId::LockLock
    } else {
        ActionMessageId::LockUnlock
    });
    ctx.add_data(ActionData::LockStateChanged {
        target: ActionTargetSelector::clone(ctx.target()),
        item: ctx.item().clone(),
        module: ctx.module().to_owned(),
        locked,
    });
    Some(ModuleState::LockSlot { contents })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CharacterId, ItemId};
    use crate::testing::{fixture_assets, item};

    fn unlock(password: Option<&str>) -> LockAction {
        LockAction::Unlock {
            password: password.map(str::to_owned),
        }
    }

    fn lock(password: Option<&str>) -> LockAction {
        LockAction::Lock {
            password: password.map(str::to_owned),
        }
    }

    fn context<'a>(actor: &'a CharacterId, wearer: &str) -> ModuleActionContext<'a> {
        ModuleActionContext::new(
            actor,
            ActionTargetSelector::character(CharacterId::new(wearer)),
            ItemId::new("i/gag"),
            "lock",
        )
        .with_execution(ExecutionContext::Act, 42)
    }

    fn locked_contents(asset: &str, actor: &CharacterId, password: Option<&str>) -> Vec<Item> {
        let assets = fixture_assets();
        let contents = vec![item("i/lock", asset)];
        let mut ctx = context(actor, "c2");
        match lock_action(&contents, &lock(password), &assets, &mut ctx) {
            Some(ModuleState::LockSlot { contents }) => contents,
            other => panic!("lock failed: {other:?}"),
        }
    }

    #[test]
    fn lock_records_locker_and_time() {
        let actor = CharacterId::new("c1");
        let contents = locked_contents("a/padlock", &actor, None);
        let locked = contents[0].lock.as_ref().and_then(|lock| lock.locked.as_ref()).unwrap();
        assert_eq!(locked.character, actor);
        assert_eq!(locked.at, 42);
    }

    #[test]
    fn empty_slot_and_double_lock_are_rejected() {
        let assets = fixture_assets();
        let actor = CharacterId::new("c1");

        let mut ctx = context(&actor, "c2");
        assert!(lock_action(&[], &lock(None), &assets, &mut ctx).is_none());

        let contents = locked_contents("a/padlock", &actor, None);
        let mut ctx = context(&actor, "c2");
        assert!(lock_action(&contents, &lock(None), &assets, &mut ctx).is_none());
        assert_eq!(
            ctx.into_report().errors,
            vec![crate::processing::ModuleActionError::Reject {
                module: "lock".into(),
                reason: ModuleRejectReason::AlreadyLocked,
            }]
        );
    }

    #[test]
    fn passwords_are_required_and_checked() {
        let assets = fixture_assets();
        let actor = CharacterId::new("c1");
        let fresh = vec![item("i/lock", "a/combination-lock")];

        let mut ctx = context(&actor, "c2");
        assert!(lock_action(&fresh, &lock(None), &assets, &mut ctx).is_none());
        let mut ctx = context(&actor, "c2");
        assert!(lock_action(&fresh, &lock(Some("12a")), &assets, &mut ctx).is_none());

        let contents = locked_contents("a/combination-lock", &actor, Some("1234"));
        let mut ctx = context(&actor, "c2");
        assert!(lock_action(&contents, &unlock(Some("0000")), &assets, &mut ctx).is_none());

        let mut ctx = context(&actor, "c2").with_execution(ExecutionContext::ClientOnlyVerify, 43);
        assert!(lock_action(&contents, &unlock(None), &assets, &mut ctx).is_some());

        let mut ctx = context(&actor, "c2");
        let unlocked = lock_action(&contents, &unlock(Some("1234")), &assets, &mut ctx);
        assert!(matches!(
            unlocked,
            Some(ModuleState::LockSlot { contents }) if !contents[0].is_locked()
        ));
    }

    #[test]
    fn block_self_stops_wearer_unless_forced() {
        let assets = fixture_assets();
        let wearer = CharacterId::new("c2");
        let contents = locked_contents("a/combination-lock", &CharacterId::new("c1"), Some("1234"));

        let mut ctx = context(&wearer, "c2");
        assert!(lock_action(&contents, &unlock(Some("1234")), &assets, &mut ctx).is_none());

        let mut ctx = context(&wearer, "c2").with_force(true);
        assert!(lock_action(&contents, &unlock(Some("1234")), &assets, &mut ctx).is_some());
    }
}
