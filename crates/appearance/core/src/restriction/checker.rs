use super::{
    AssetPreferencePermission, InteractionPermission, ItemInteractionType, Permission,
    PermissionRef, PermissionResult, Restriction,
};
use crate::env::{AssetFlags, AssetOracle, EffectFlags, SpaceFeatures, SpaceOracle};
use crate::processing::SlowdownReason;
use crate::state::{
    CharacterState, InteractionId, Item, ItemContainerPath, ItemPath, RestrictionOverrideMode,
    RoomState, container_chain, find_item,
};

/// A permission evaluated for the actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredPermission {
    pub permission: PermissionRef,
    pub result: PermissionResult,
}

/// Everything a check found. Empty means allowed without delay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub restrictions: Vec<Restriction>,
    pub permissions: Vec<RequiredPermission>,
    pub slowdowns: Vec<SlowdownReason>,
}

impl CheckOutcome {
    pub fn is_allowed(&self) -> bool {
        self.restrictions.is_empty()
            && self
                .permissions
                .iter()
                .all(|required| required.result == PermissionResult::Allow)
    }

    fn restrict(&mut self, restriction: Restriction) {
        if !self.restrictions.contains(&restriction) {
            self.restrictions.push(restriction);
        }
    }

    fn require(&mut self, permission: &dyn Permission, actor: &crate::state::CharacterId) {
        let required = RequiredPermission {
            permission: permission.to_ref(),
            result: permission.evaluate(actor),
        };
        if !self.permissions.contains(&required) {
            self.permissions.push(required);
        }
    }

    fn slow_down(&mut self, reason: SlowdownReason) {
        if !self.slowdowns.contains(&reason) {
            self.slowdowns.push(reason);
        }
    }
}

/// Whose items an item check looks at.
#[derive(Clone, Copy, Debug)]
pub enum ItemOwner<'a> {
    /// Items worn by a character.
    Character(&'a CharacterState),
    /// Room inventory; `authority` is the character holding permission over
    /// the addressed container, if any.
    Room {
        room: &'a RoomState,
        authority: Option<&'a CharacterState>,
    },
}

impl<'a> ItemOwner<'a> {
    pub fn items(&self) -> &'a [Item] {
        match self {
            Self::Character(character) => &character.items,
            Self::Room { room, .. } => &room.items,
        }
    }

    pub fn character(&self) -> Option<&'a CharacterState> {
        match self {
            Self::Character(character) => Some(character),
            Self::Room { authority, .. } => *authority,
        }
    }

    pub fn is_worn(&self) -> bool {
        matches!(self, Self::Character(_))
    }
}

/// Pure restriction checker for one actor.
#[derive(Clone, Copy)]
pub struct RestrictionChecker<'a> {
    assets: &'a dyn AssetOracle,
    space: &'a dyn SpaceOracle,
    actor: &'a CharacterState,
}

impl<'a> RestrictionChecker<'a> {
    pub fn new(
        assets: &'a dyn AssetOracle,
        space: &'a dyn SpaceOracle,
        actor: &'a CharacterState,
    ) -> Self {
        Self {
            assets,
            space,
            actor,
        }
    }

    pub fn actor(&self) -> &'a CharacterState {
        self.actor
    }

    /// Safemode lets a character act on themself regardless of restraints.
    pub fn is_forced_on(&self, target: &CharacterState) -> bool {
        target.id == self.actor.id && self.actor.is_in_safemode()
    }

    /// Union of the effects of everything the actor wears at the root.
    pub fn actor_effects(&self) -> EffectFlags {
        self.actor
            .items
            .iter()
            .filter_map(|item| {
                self.assets
                    .asset(&item.asset)
                    .map(|asset| asset.effective_properties(item).effects)
            })
            .fold(EffectFlags::empty(), |acc, effects| acc | effects)
    }

    /// Cross-character rules: overrides on either side plus the interaction permission.
    pub fn check_interact_with(&self, target: &CharacterState, interaction: InteractionId) -> CheckOutcome {
        let mut outcome = CheckOutcome::default();
        self.interact_with(target, interaction, &mut outcome);
        outcome
    }

    fn interact_with(&self, target: &CharacterState, interaction: InteractionId, out: &mut CheckOutcome) {
        if target.id == self.actor.id {
            return;
        }
        for character in [self.actor, target] {
            match character.override_mode() {
                RestrictionOverrideMode::Normal => {}
                RestrictionOverrideMode::Safemode => out.restrict(Restriction::SafemodeInteractOther {
                    character: character.id.clone(),
                }),
                RestrictionOverrideMode::Timeout => out.restrict(Restriction::TimeoutInteractOther {
                    character: character.id.clone(),
                }),
            }
        }
        if interaction != InteractionId::Interact {
            out.require(
                &InteractionPermission::new(target, InteractionId::Interact),
                &self.actor.id,
            );
        }
        out.require(&InteractionPermission::new(target, interaction), &self.actor.id);
    }

    /// Hand usage: blocked hands deny, limited hands slow down.
    pub fn check_hands(&self, out: &mut CheckOutcome) {
        let effects = self.actor_effects();
        if effects.contains(EffectFlags::BLOCK_HANDS) {
            out.restrict(Restriction::BlockedHands);
        } else if effects.contains(EffectFlags::LIMIT_HANDS) {
            out.slow_down(SlowdownReason::LimitedHands);
        }
    }

    /// Checks an item present in the owner's items.
    ///
    /// Returns `None` if the path does not resolve.
    pub fn check_item_use(
        &self,
        owner: ItemOwner<'_>,
        path: &ItemPath,
        module: Option<&str>,
        interaction: ItemInteractionType,
    ) -> Option<CheckOutcome> {
        let item = find_item(owner.items(), path)?;
        self.check_item_use_direct(owner, &path.container, item, module, interaction)
    }

    /// Checks an item that may not be part of the owner's items yet.
    ///
    /// Every container on `container` is checked as a modification of the
    /// module it exposes. Returns `None` if the container does not resolve.
    pub fn check_item_use_direct(
        &self,
        owner: ItemOwner<'_>,
        container: &ItemContainerPath,
        item: &Item,
        module: Option<&str>,
        interaction: ItemInteractionType,
    ) -> Option<CheckOutcome> {
        let chain = container_chain(owner.items(), container)?;
        let mut out = CheckOutcome::default();

        if let Some(character) = owner.character() {
            self.interact_with(character, InteractionId::Interact, &mut out);
        }
        let forced = match owner {
            ItemOwner::Character(character) => self.is_forced_on(character),
            ItemOwner::Room { .. } => false,
        };
        for (depth, (parent, step)) in chain.iter().zip(container.steps()).enumerate() {
            self.check_item(
                owner,
                parent,
                Some(&step.module),
                ItemInteractionType::Modify,
                depth == 0,
                &mut out,
            );
            // A locked lock stays in its slot until it is unlocked
            let locked_slot = parent.slot_lock(&step.module).is_some_and(Item::is_locked);
            if locked_slot && !forced && interaction.changes_placement() {
                out.restrict(Restriction::BlockedModule {
                    asset: parent.asset.clone(),
                    module: step.module.clone(),
                    self_block: false,
                });
            }
        }
        self.check_item(owner, item, module, interaction, container.is_root(), &mut out);
        Some(out)
    }

    fn check_item(
        &self,
        owner: ItemOwner<'_>,
        item: &Item,
        module: Option<&str>,
        interaction: ItemInteractionType,
        at_root: bool,
        out: &mut CheckOutcome,
    ) {
        // Unknown assets are reported by state validation
        let Some(asset) = self.assets.asset(&item.asset) else {
            return;
        };
        let properties = asset.effective_properties(item);
        let wearer = match owner {
            ItemOwner::Character(character) => Some(character),
            ItemOwner::Room { .. } => None,
        };
        let is_self = wearer.is_some_and(|wearer| wearer.id == self.actor.id);
        let force = wearer.is_some_and(|wearer| self.is_forced_on(wearer));

        if asset.is_bodypart() && interaction.modifies_body() {
            if !self.space.has_feature(SpaceFeatures::BODY_MODIFICATION) {
                out.restrict(Restriction::ModifyBodyRoom);
            }
            if !is_self {
                out.restrict(Restriction::ModifyBodyOthers);
            }
        }

        let hands_exempt = !interaction.needs_hands()
            || asset.is_bodypart()
            || properties.flags.contains(AssetFlags::HANDS_FREE)
            || force
            || (is_self && interaction == ItemInteractionType::ExpressionChange);
        if !hands_exempt {
            self.check_hands(out);
        }

        if force {
            return;
        }

        if wearer.is_some() && interaction == ItemInteractionType::AddRemove {
            if properties.flags.contains(AssetFlags::BLOCK_ADD_REMOVE) {
                out.restrict(Restriction::BlockedAddRemove {
                    asset: asset.id.clone(),
                    self_block: false,
                });
            } else if is_self && properties.flags.contains(AssetFlags::BLOCK_SELF_ADD_REMOVE) {
                out.restrict(Restriction::BlockedAddRemove {
                    asset: asset.id.clone(),
                    self_block: true,
                });
            }
        }

        if let Some(module) = module {
            if properties.blocked_modules.contains(module) {
                out.restrict(Restriction::BlockedModule {
                    asset: asset.id.clone(),
                    module: module.to_owned(),
                    self_block: false,
                });
            } else if is_self && properties.self_blocked_modules.contains(module) {
                out.restrict(Restriction::BlockedModule {
                    asset: asset.id.clone(),
                    module: module.to_owned(),
                    self_block: true,
                });
            }
        }

        if let Some(wearer) = wearer.filter(|_| at_root && interaction.needs_hands()) {
            if let Some(by) = self.covering_item(&wearer.items, item, &properties.attributes) {
                out.restrict(Restriction::Covered {
                    item: item.id.clone(),
                    by: by.id.clone(),
                });
            }
        }

        if let Some(wearer) = wearer.filter(|wearer| {
            interaction == ItemInteractionType::AddRemove
                && wearer.id != self.actor.id
                && !asset.is_bodypart()
        }) {
            out.require(
                &AssetPreferencePermission::new(wearer, asset.id.clone()),
                &self.actor.id,
            );
        }
    }

    /// First item worn above `item` that covers one of its attributes.
    fn covering_item<'i>(
        &self,
        worn: &'i [Item],
        item: &Item,
        attributes: &std::collections::BTreeSet<String>,
    ) -> Option<&'i Item> {
        if attributes.is_empty() {
            return None;
        }
        let index = worn.iter().position(|worn| worn.id == item.id)?;
        worn[index + 1..].iter().find(|above| {
            self.assets
                .asset(&above.asset)
                .is_some_and(|asset| asset.effective_properties(above).covers_any(attributes))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CharacterId, ItemId, RestrictionOverride};
    use crate::testing::{fixture_assets, fixture_space, fixture_state, item};

    fn character(id: &str) -> CharacterState {
        fixture_state()
            .character(&CharacterId::new(id))
            .cloned()
            .unwrap()
    }

    #[test]
    fn blocked_hands_deny_item_use() {
        let assets = fixture_assets();
        let space = fixture_space();
        let mut actor = character("c1");
        actor.items.push(item("i/cuffs", "a/handcuffs"));
        let target = character("c2");
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let outcome = checker
            .check_item_use_direct(
                ItemOwner::Character(&target),
                &ItemContainerPath::root(),
                &item("i/jacket", "a/jacket"),
                None,
                ItemInteractionType::AddRemove,
            )
            .unwrap();
        assert!(outcome.restrictions.contains(&Restriction::BlockedHands));
        assert!(!outcome.is_allowed());
    }

    #[test]
    fn limited_hands_only_slow_down() {
        let assets = fixture_assets();
        let space = fixture_space();
        let mut actor = character("c1");
        actor.items.push(item("i/mittens", "a/mittens"));
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let outcome = checker
            .check_item_use(
                ItemOwner::Character(&actor),
                &ItemPath::root(ItemId::new("i/c1-shirt")),
                None,
                ItemInteractionType::Styling,
            )
            .unwrap();
        assert!(outcome.is_allowed());
        assert_eq!(outcome.slowdowns, vec![SlowdownReason::LimitedHands]);
    }

    #[test]
    fn safemode_forces_own_items_but_blocks_others() {
        let assets = fixture_assets();
        let space = fixture_space();
        let mut actor = character("c1");
        actor.items.push(item("i/cuffs", "a/handcuffs"));
        actor.restriction_override = Some(RestrictionOverride {
            mode: RestrictionOverrideMode::Safemode,
            allow_leave_at: 0,
        });
        let target = character("c2");
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let own = checker
            .check_item_use(
                ItemOwner::Character(&actor),
                &ItemPath::root(ItemId::new("i/c1-shirt")),
                None,
                ItemInteractionType::AddRemove,
            )
            .unwrap();
        assert!(own.is_allowed());

        let other = checker.check_interact_with(&target, InteractionId::Interact);
        assert_eq!(
            other.restrictions,
            vec![Restriction::SafemodeInteractOther {
                character: actor.id.clone()
            }]
        );
    }

    #[test]
    fn covered_items_cannot_be_removed() {
        let assets = fixture_assets();
        let space = fixture_space();
        let mut actor = character("c1");
        actor.items.push(item("i/jacket", "a/jacket"));
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let outcome = checker
            .check_item_use(
                ItemOwner::Character(&actor),
                &ItemPath::root(ItemId::new("i/c1-shirt")),
                None,
                ItemInteractionType::AddRemove,
            )
            .unwrap();
        assert_eq!(
            outcome.restrictions,
            vec![Restriction::Covered {
                item: ItemId::new("i/c1-shirt"),
                by: ItemId::new("i/jacket"),
            }]
        );
    }

    #[test]
    fn bodyparts_need_space_feature_and_self() {
        let assets = fixture_assets();
        let space = crate::env::StaticSpace::default();
        let actor = character("c1");
        let target = character("c2");
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let outcome = checker
            .check_item_use(
                ItemOwner::Character(&target),
                &ItemPath::root(ItemId::new("i/c2-eyes")),
                None,
                ItemInteractionType::AddRemove,
            )
            .unwrap();
        assert!(outcome.restrictions.contains(&Restriction::ModifyBodyRoom));
        assert!(outcome.restrictions.contains(&Restriction::ModifyBodyOthers));
    }

    #[test]
    fn adding_to_others_consults_asset_preference() {
        let assets = fixture_assets();
        let space = fixture_space();
        let actor = character("c1");
        let mut target = character("c2");
        target.asset_preferences.assets.insert(
            crate::state::AssetId::new("a/gag"),
            crate::state::AssetPreference::Maybe,
        );
        let checker = RestrictionChecker::new(&assets, &space, &actor);

        let outcome = checker
            .check_item_use_direct(
                ItemOwner::Character(&target),
                &ItemContainerPath::root(),
                &item("i/gag", "a/gag"),
                None,
                ItemInteractionType::AddRemove,
            )
            .unwrap();
        assert!(outcome.restrictions.is_empty());
        assert!(outcome.permissions.contains(&RequiredPermission {
            permission: PermissionRef::asset_preference(
                target.id.clone(),
                crate::state::AssetId::new("a/gag")
            ),
            result: PermissionResult::Prompt,
        }));
    }
}
