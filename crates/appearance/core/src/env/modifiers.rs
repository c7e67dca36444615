use crate::action::AppearanceAction;
use crate::processing::CharacterModifierActionError;
use crate::state::{CharacterId, GlobalState};

/// Character-modifier engine, consulted after an action was processed.
///
/// Modifier conditions are evaluated elsewhere; the engine only consumes the
/// verdicts, which become `characterModifierActionError` problems.
pub trait ModifierOracle: Send + Sync {
    fn check_action(
        &self,
        actor: &CharacterId,
        action: &AppearanceAction,
        state: &GlobalState,
    ) -> Vec<CharacterModifierActionError>;
}

/// Modifier oracle for spaces without character modifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoModifiers;

impl ModifierOracle for NoModifiers {
    fn check_action(
        &self,
        _actor: &CharacterId,
        _action: &AppearanceAction,
        _state: &GlobalState,
    ) -> Vec<CharacterModifierActionError> {
        Vec::new()
    }
}
