//! End-to-end request scenarios against an in-memory space.

use std::sync::Arc;

use appearance_core::env::{
    AssetKind, EffectFlags, ItemTemplate, PropertySet, create_item_from_template,
};
use appearance_core::processing::CharacterModifierActionError;
use appearance_core::state::{RoomBackground, RoomState};
use appearance_core::{
    AccountId, AppearanceAction, AssetCatalog, AssetDefinition, AssetId, CharacterId,
    CharacterState, GlobalState, ItemId, ModifierOracle, Problem, ProcessingResult,
};
use appearance_runtime::{
    ActionProcessor, HookContext, HookCriticality, HookError, HookRegistry, OracleManager,
    ResultHook, RuntimeConfig, RuntimeError,
};

// ============================================================================
// Fixtures
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn catalog() -> AssetCatalog {
    let personal = |id: &str| {
        AssetDefinition::new(AssetId::new(id), id, AssetKind::Personal { bodypart: None })
    };
    AssetCatalog::new()
        .with_bodypart("body", true, false)
        .with_asset(AssetDefinition::new(
            AssetId::new("a/body"),
            "Body",
            AssetKind::Personal {
                bodypart: Some("body".to_owned()),
            },
        ))
        .with_asset(personal("a/shirt").with_color_group("base"))
        .with_asset(personal("a/mittens").with_properties(PropertySet {
            effects: EffectFlags::LIMIT_HANDS,
            ..PropertySet::default()
        }))
}

fn character(assets: &AssetCatalog, id: &str, account: u64, assets_worn: &[&str]) -> CharacterState {
    let mut character = CharacterState::new(CharacterId::new(id), AccountId(account));
    character.items = assets_worn
        .iter()
        .map(|asset| {
            let item_id = ItemId::new(format!("i/{id}-{}", asset.trim_start_matches("a/")));
            create_item_from_template(item_id, &ItemTemplate::new(AssetId::new(*asset)), assets)
                .unwrap()
        })
        .collect();
    character
}

fn processor_with(hooks: HookRegistry, worn: &[&str]) -> ActionProcessor {
    init_tracing();
    let assets = catalog();
    let state = GlobalState::new(RoomState::new(RoomBackground::default()))
        .with_character(character(&assets, "c1", 1, worn))
        .with_character(character(&assets, "c2", 2, &["a/body"]));
    let config = RuntimeConfig::default();
    let oracles = OracleManager::from_config(Arc::new(assets), &config);
    ActionProcessor::new(oracles, hooks, config, state).unwrap()
}

fn processor() -> ActionProcessor {
    processor_with(HookRegistry::default(), &["a/body", "a/shirt"])
}

fn c1() -> CharacterId {
    CharacterId::new("c1")
}

const RECOLOR: &str = r##"{
    "type": "color",
    "target": { "type": "character", "characterId": "c1" },
    "item": { "container": [], "itemId": "i/c1-shirt" },
    "color": { "base": "#00ff00" }
}"##;

fn shirt_color(state: &GlobalState) -> Option<String> {
    state.character(&c1())?.items.iter().find_map(|item| {
        (item.id == ItemId::new("i/c1-shirt"))
            .then(|| item.color.get("base").map(|color| color.0.clone()))
            .flatten()
    })
}

// ============================================================================
// Wire decoding
// ============================================================================

#[test]
fn malformed_payloads_never_reach_the_engine() {
    let mut processor = processor();
    let before = processor.state().clone();

    let garbage = processor.apply_json(&c1(), "{\"type\": \"teleport\"}", 0);
    assert!(matches!(garbage, Err(RuntimeError::ActionDecode(_))));

    let bad_id = RECOLOR.replace("i/c1-shirt", "shirt");
    let bad_id = processor.apply_json(&c1(), &bad_id, 0);
    assert!(matches!(bad_id, Err(RuntimeError::MalformedAction(_))));
    assert!(bad_id.unwrap_err().is_malformed());

    assert_eq!(processor.state(), &before);
}

#[test]
fn accepted_actions_are_committed() {
    let mut processor = processor();
    let before = processor.state().state_root().unwrap();

    let result = processor.apply_json(&c1(), RECOLOR, 0).unwrap();
    assert!(result.is_valid(), "{:?}", result.problems());
    assert_eq!(shirt_color(processor.state()).as_deref(), Some("#00ff00"));

    let after = processor.state().state_root().unwrap();
    assert_ne!(before, after, "state root {} did not change", hex::encode(before));
}

#[test]
fn verify_predicts_without_committing() {
    let processor = processor();
    let action = appearance_runtime::decode_action(RECOLOR).unwrap();

    let predicted = processor.verify(&c1(), &action, 0).unwrap();
    assert!(predicted.is_valid());
    assert_eq!(shirt_color(processor.state()), None);
}

#[test]
fn invalid_initial_state_is_refused() {
    let assets = catalog();
    let state = GlobalState::new(RoomState::new(RoomBackground::default()))
        .with_character(character(&assets, "c1", 1, &["a/shirt"]));
    let config = RuntimeConfig::default();
    let oracles = OracleManager::from_config(Arc::new(assets), &config);

    let result = ActionProcessor::new(oracles, HookRegistry::default(), config, state);
    assert!(matches!(result, Err(RuntimeError::InvalidState(_))));
}

// ============================================================================
// Attempts
// ============================================================================

#[test]
fn slowed_actions_go_through_an_attempt() {
    let mut processor = processor_with(HookRegistry::default(), &["a/body", "a/shirt", "a/mittens"]);
    let action = appearance_runtime::decode_action(RECOLOR).unwrap();

    let immediate = processor.apply(&c1(), &action, 0).unwrap();
    assert_eq!(immediate.problems(), [Problem::AttemptRequired]);

    let started = processor.start_attempt(&c1(), &action, 100).unwrap();
    assert!(started.is_valid());
    let attempt = processor
        .state()
        .character(&c1())
        .and_then(|character| character.attempting_action.clone())
        .unwrap();
    assert_eq!(attempt.finish_after, 3_100);

    let early = processor.finish_attempt(&c1(), &action, 3_000).unwrap();
    assert_eq!(early.problems(), [Problem::TooSoon]);

    let finished = processor.finish_attempt(&c1(), &action, 3_100).unwrap();
    assert!(finished.is_valid());
    assert_eq!(shirt_color(processor.state()).as_deref(), Some("#00ff00"));
    assert!(
        processor
            .state()
            .character(&c1())
            .is_some_and(|character| character.attempting_action.is_none())
    );
}

// ============================================================================
// Hooks
// ============================================================================

struct Blindfolded;

impl ModifierOracle for Blindfolded {
    fn check_action(
        &self,
        actor: &CharacterId,
        _action: &AppearanceAction,
        _state: &GlobalState,
    ) -> Vec<CharacterModifierActionError> {
        vec![CharacterModifierActionError {
            character: actor.clone(),
            modifier: "blindfold".to_owned(),
        }]
    }
}

#[test]
fn modifier_verdicts_reject_actions() {
    init_tracing();
    let assets = catalog();
    let state = GlobalState::new(RoomState::new(RoomBackground::default()))
        .with_character(character(&assets, "c1", 1, &["a/body", "a/shirt"]));
    let config = RuntimeConfig::default();
    let oracles = OracleManager::from_config(Arc::new(assets), &config)
        .with_modifiers(Arc::new(Blindfolded));
    let mut processor =
        ActionProcessor::new(oracles, HookRegistry::default(), config, state).unwrap();

    let result = processor.apply_json(&c1(), RECOLOR, 0).unwrap();
    assert_eq!(
        result.problems(),
        [Problem::from(CharacterModifierActionError {
            character: c1(),
            modifier: "blindfold".to_owned(),
        })]
    );
    assert_eq!(shirt_color(processor.state()), None);
}

struct Broken(HookCriticality);

impl ResultHook for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn criticality(&self) -> HookCriticality {
        self.0
    }

    fn check(&self, _ctx: &HookContext<'_>) -> Result<Vec<Problem>, HookError> {
        Err(HookError::Unavailable("moderation service".to_owned()))
    }
}

#[test]
fn hook_failures_follow_criticality() {
    let hooks = HookRegistry::new(vec![Arc::new(Broken(HookCriticality::Critical)) as Arc<dyn ResultHook>]);
    let mut processor = processor_with(hooks, &["a/body", "a/shirt"]);
    let result = processor.apply_json(&c1(), RECOLOR, 0);
    assert!(matches!(result, Err(RuntimeError::Hook { hook: "broken", .. })));

    let hooks = HookRegistry::new(vec![Arc::new(Broken(HookCriticality::Important)) as Arc<dyn ResultHook>]);
    let mut processor = processor_with(hooks, &["a/body", "a/shirt"]);
    let result = processor.apply_json(&c1(), RECOLOR, 0).unwrap();
    assert!(matches!(result, ProcessingResult::Valid(_)));
}

#[test]
fn default_registry_runs_modifier_checks_first() {
    let registry = HookRegistry::default();
    assert_eq!(registry.hooks().next(), Some(("character_modifier", -100)));
}
