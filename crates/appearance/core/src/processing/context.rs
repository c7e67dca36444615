use std::sync::Arc;

use strum::{AsRefStr, Display};
use tracing::{debug, trace};

use super::{
    ActionData, ActionMessage, ActionTarget, InvalidActionReason, InvalidResult, Problem,
    ProcessingResult, Slowdown, SlowdownReason, ValidResult,
};
use crate::action::ActionTargetSelector;
use crate::env::{AssetOracle, Oracles, RngOracle, SpaceOracle};
use crate::manipulator::GlobalStateManipulator;
use crate::restriction::{
    CheckOutcome, ItemInteractionType, Permission, PermissionRef, PermissionResult,
    RequiredPermission, Restriction, RestrictionChecker,
};
use crate::state::{
    CharacterId, CharacterState, GlobalState, InteractionId, Item, ItemContainerPath, ItemPath,
};

/// Where an action is being processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
#[strum(serialize_all = "camelCase")]
pub enum ExecutionContext {
    /// Speculative prediction on a client. Secrets are not verified.
    ClientOnlyVerify,
    /// Authoritative processing.
    #[default]
    Act,
}

/// Who is acting, where, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ActionContext {
    pub player: CharacterId,
    pub execution: ExecutionContext,
    /// Current time in milliseconds.
    pub now: u64,
}

impl ActionContext {
    pub fn new(player: CharacterId, now: u64) -> Self {
        Self {
            player,
            execution: ExecutionContext::Act,
            now,
        }
    }

    pub fn client_only(mut self) -> Self {
        self.execution = ExecutionContext::ClientOnlyVerify;
        self
    }
}

/// Transaction accumulator of one action.
///
/// Lives from dispatch until [`finalize`](Self::finalize) or
/// [`invalid`](Self::invalid) consumes it. Checks append problems and never
/// abort; handlers decide whether to continue.
pub struct ProcessingContext<'a> {
    oracles: Oracles<'a>,
    player: CharacterId,
    execution: ExecutionContext,
    now: u64,
    manipulator: GlobalStateManipulator,
    problems: Vec<Problem>,
    messages: Vec<ActionMessage>,
    data: Vec<ActionData>,
    required_permissions: Vec<PermissionRef>,
    slowdown: Slowdown,
}

impl<'a> ProcessingContext<'a> {
    pub fn new(oracles: Oracles<'a>, state: &GlobalState, context: &ActionContext) -> Self {
        Self {
            oracles,
            player: context.player.clone(),
            execution: context.execution,
            now: context.now,
            manipulator: GlobalStateManipulator::new(state.clone()),
            problems: Vec::new(),
            messages: Vec::new(),
            data: Vec::new(),
            required_permissions: Vec::new(),
            slowdown: Slowdown::default(),
        }
    }

    // ===== accessors =====

    pub fn assets(&self) -> &'a dyn AssetOracle {
        self.oracles.assets
    }

    pub fn space(&self) -> &'a dyn SpaceOracle {
        self.oracles.space
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.oracles.rng
    }

    pub fn player_id(&self) -> &CharacterId {
        &self.player
    }

    pub fn execution(&self) -> ExecutionContext {
        self.execution
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Working state, including the edits made so far.
    pub fn state(&self) -> &GlobalState {
        self.manipulator.state()
    }

    pub fn manipulator(&mut self) -> &mut GlobalStateManipulator {
        &mut self.manipulator
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// The acting character in the working state.
    pub fn player(&self) -> Option<Arc<CharacterState>> {
        self.state().characters.get(&self.player).cloned()
    }

    /// Whether the player acts on themself while in safemode.
    pub fn is_forced_on(&self, target: &CharacterId) -> bool {
        *target == self.player
            && self
                .state()
                .character(&self.player)
                .is_some_and(CharacterState::is_in_safemode)
    }

    // ===== targets =====

    pub fn get_target(&self, selector: &ActionTargetSelector) -> Option<ActionTarget> {
        match selector {
            ActionTargetSelector::Character { character_id } => self
                .state()
                .characters
                .get(character_id)
                .cloned()
                .map(ActionTarget::Character),
            ActionTargetSelector::RoomInventory => {
                Some(ActionTarget::RoomInventory(self.state().room.clone()))
            }
        }
    }

    /// Character holding permission authority over a container of `target`.
    ///
    /// Worn items belong to their wearer. Items reached through a room device
    /// answer to the occupant of the slot named like the module entered. A
    /// module with no such slot answers to the occupant of the first occupied
    /// slot in slot name order.
    pub fn resolve_target_character(
        &self,
        target: &ActionTarget,
        container: &ItemContainerPath,
    ) -> Option<Arc<CharacterState>> {
        match target {
            ActionTarget::Character(character) => Some(character.clone()),
            ActionTarget::RoomInventory(room) => {
                let step = container.steps().first()?;
                let device = room.items.iter().find(|item| item.id == step.item)?;
                let slots = &device.device.as_ref()?.slots;
                let occupant = slots
                    .get(&step.module)
                    .or_else(|| slots.values().next())?;
                self.state().characters.get(occupant).cloned()
            }
        }
    }

    // ===== checks =====

    /// Checks use of an item of `target`. Returns `false` if the item does not exist.
    pub fn check_can_use_item(
        &mut self,
        target: &ActionTarget,
        path: &ItemPath,
        interaction: ItemInteractionType,
    ) -> bool {
        match target.get_item(path) {
            Some(item) => self.check_item(target, &path.container, item, None, interaction),
            None => false,
        }
    }

    /// Like [`check_can_use_item`](Self::check_can_use_item), for one module of the item.
    pub fn check_can_use_item_module(
        &mut self,
        target: &ActionTarget,
        path: &ItemPath,
        module: &str,
        interaction: ItemInteractionType,
    ) -> bool {
        match target.get_item(path) {
            Some(item) => self.check_item(target, &path.container, item, Some(module), interaction),
            None => false,
        }
    }

    /// Checks an item that is not (yet) in `target`, as if placed in `container`.
    pub fn check_can_use_item_direct(
        &mut self,
        target: &ActionTarget,
        container: &ItemContainerPath,
        item: &Item,
        interaction: ItemInteractionType,
    ) -> bool {
        self.check_item(target, container, item, None, interaction)
    }

    fn check_item(
        &mut self,
        target: &ActionTarget,
        container: &ItemContainerPath,
        item: &Item,
        module: Option<&str>,
        interaction: ItemInteractionType,
    ) -> bool {
        let Some(actor) = self.player() else {
            return false;
        };
        let authority = self.resolve_target_character(target, container);
        let outcome = RestrictionChecker::new(self.assets(), self.space(), &actor)
            .check_item_use_direct(
                target.owner(authority.as_deref()),
                container,
                item,
                module,
                interaction,
            );
        match outcome {
            Some(outcome) => {
                self.apply_outcome(outcome);
                true
            }
            None => false,
        }
    }

    /// Cross-character check for a character target; no-op for the room.
    pub fn check_interact_with_target(&mut self, target: &ActionTarget) {
        if let Some(character) = target.character() {
            self.add_interaction(character, InteractionId::Interact);
        }
    }

    /// Registers an interaction with `target`; no-op when acting on oneself.
    pub fn add_interaction(&mut self, target: &CharacterState, interaction: InteractionId) {
        let Some(actor) = self.player() else {
            return;
        };
        let outcome = RestrictionChecker::new(self.assets(), self.space(), &actor)
            .check_interact_with(target, interaction);
        self.apply_outcome(outcome);
    }

    /// Hand usage of the player, independent of any item.
    pub fn check_player_hands(&mut self) {
        let Some(actor) = self.player() else {
            return;
        };
        let mut outcome = CheckOutcome::default();
        RestrictionChecker::new(self.assets(), self.space(), &actor).check_hands(&mut outcome);
        self.apply_outcome(outcome);
    }

    pub fn check_player_is_space_admin(&mut self) -> bool {
        let is_admin = self
            .player()
            .is_some_and(|player| self.space().is_admin(player.account));
        if !is_admin {
            self.add_restriction(Restriction::ModifyRoomNotAdmin);
        }
        is_admin
    }

    fn apply_outcome(&mut self, outcome: CheckOutcome) {
        for restriction in outcome.restrictions {
            self.add_restriction(restriction);
        }
        for required in outcome.permissions {
            self.record_permission(required);
        }
        for reason in outcome.slowdowns {
            self.add_slowdown(reason);
        }
    }

    // ===== accumulation =====

    /// Records a permission and evaluates it for the player.
    pub fn add_required_permission(&mut self, permission: &dyn Permission) {
        let required = RequiredPermission {
            permission: permission.to_ref(),
            result: permission.evaluate(&self.player),
        };
        self.record_permission(required);
    }

    fn record_permission(&mut self, required: RequiredPermission) {
        if !self.required_permissions.contains(&required.permission) {
            self.required_permissions.push(required.permission.clone());
        }
        let prompt = match required.result {
            PermissionResult::Allow => return,
            PermissionResult::Deny => false,
            PermissionResult::Prompt => true,
        };
        self.add_restriction(Restriction::MissingPermission {
            permission: required.permission,
            prompt,
        });
    }

    pub fn add_problem(&mut self, problem: Problem) {
        if !self.problems.contains(&problem) {
            self.problems.push(problem);
        }
    }

    pub fn add_restriction(&mut self, restriction: Restriction) {
        self.add_problem(Problem::RestrictionError { restriction });
    }

    pub fn add_slowdown(&mut self, reason: SlowdownReason) {
        self.slowdown.add_reason(reason);
    }

    pub fn add_extra_slowdown(&mut self, ms: u64) {
        self.slowdown.add_extra(ms);
    }

    pub fn queue_message(&mut self, message: ActionMessage) {
        self.messages.push(message);
    }

    pub fn add_data(&mut self, data: ActionData) {
        if !self.data.contains(&data) {
            self.data.push(data);
        }
    }

    // ===== terminal =====

    /// Aborts with a generic `invalidAction` problem.
    pub fn invalid(mut self, reason: Option<InvalidActionReason>) -> ProcessingResult {
        trace!(
            target: "appearance::processing",
            player = %self.player,
            reason = ?reason,
            "action aborted as invalid"
        );
        self.add_problem(Problem::InvalidAction { reason });
        self.into_invalid()
    }

    fn into_invalid(self) -> ProcessingResult {
        ProcessingResult::Invalid(InvalidResult::new(
            self.problems,
            self.messages,
            self.slowdown,
            self.required_permissions,
        ))
    }

    /// Validates the working state and produces the terminal result.
    pub fn finalize(mut self) -> ProcessingResult {
        if let Err(error) = self.manipulator.state().validate(self.oracles.assets) {
            self.add_problem(Problem::ValidationError { error });
        }

        if self.problems.is_empty() {
            return ProcessingResult::Valid(ValidResult {
                state: self.manipulator.into_state(),
                messages: self.messages,
                data: self.data,
                slowdown: self.slowdown,
                required_permissions: self.required_permissions,
            });
        }

        debug!(
            target: "appearance::processing",
            player = %self.player,
            problems = self.problems.len(),
            "action rejected at finalize"
        );
        self.into_invalid()
    }
}

impl std::fmt::Debug for ProcessingContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingContext")
            .field("player", &self.player)
            .field("execution", &self.execution)
            .field("now", &self.now)
            .field("problems", &self.problems)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restriction::InteractionPermission;
    use crate::state::PermissionSetting;
    use crate::testing::{fixture_oracles, fixture_state};

    #[test]
    fn problems_are_deduplicated() {
        let (assets, space, rng) = fixture_oracles();
        let oracles = Oracles {
            assets: &assets,
            space: &space,
            rng: &rng,
        };
        let mut context = ProcessingContext::new(
            oracles,
            &fixture_state(),
            &ActionContext::new(CharacterId::new("c1"), 0),
        );

        context.add_restriction(Restriction::BlockedHands);
        context.add_problem(Problem::RestrictionError {
            restriction: Restriction::BlockedHands,
        });
        assert_eq!(context.problems().len(), 1);
    }

    #[test]
    fn denied_permission_becomes_restriction() {
        let (assets, space, rng) = fixture_oracles();
        let oracles = Oracles {
            assets: &assets,
            space: &space,
            rng: &rng,
        };
        let mut state = fixture_state();
        let owner = CharacterId::new("c2");
        state.character_mut(&owner).unwrap().permissions.posing.default = PermissionSetting::Prompt;
        let mut context =
            ProcessingContext::new(oracles, &state, &ActionContext::new(CharacterId::new("c1"), 0));

        let target = state.character(&owner).unwrap().clone();
        context.add_required_permission(&InteractionPermission::new(&target, InteractionId::Posing));

        let result = context.finalize();
        let invalid = result.invalid().unwrap();
        assert_eq!(invalid.prompt, Some(owner.clone()));
        assert_eq!(
            invalid.required_permissions,
            vec![PermissionRef::interaction(owner, InteractionId::Posing)]
        );
    }

    #[test]
    fn untouched_context_finalizes_to_same_state() {
        let (assets, space, rng) = fixture_oracles();
        let oracles = Oracles {
            assets: &assets,
            space: &space,
            rng: &rng,
        };
        let state = fixture_state();
        let context =
            ProcessingContext::new(oracles, &state, &ActionContext::new(CharacterId::new("c1"), 0));

        let result = context.finalize();
        assert_eq!(result.valid().map(|valid| &valid.state), Some(&state));
    }
}
