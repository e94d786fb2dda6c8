//! Shared card pool and setup helpers for integration tests.

#![allow(dead_code)]

use ccg_rules::cards::{
    AbilityCost, ActivatedAbility, CardDefinition, CardId, CardLookup, CardRegistry, CardType, Characteristics,
    Color, Keyword,
};
use ccg_rules::core::{Action, EntityId, GameState, PlayerId, RulesConfig};
use ccg_rules::effects::{
    AffectedFilter, Amount, CopyCount, Effect, EffectTarget, Modification, StaticAbility, Target,
    TargetRequirement,
};
use ccg_rules::mana::{ManaCost, ManaProduction, ManaType};
use ccg_rules::rules::{Engine, ExecutionResult};
use ccg_rules::triggers::{TriggerCondition, TriggeredAbility};
use ccg_rules::zones::ZoneId;

pub const MOUNTAIN: CardId = CardId(1);
pub const FOREST: CardId = CardId(2);
pub const ISLAND: CardId = CardId(3);
pub const SHOCK: CardId = CardId(10);
pub const GIANT_GROWTH: CardId = CardId(11);
pub const COUNTERSPELL: CardId = CardId(12);
pub const MANA_LEAK: CardId = CardId(13);
pub const GRAPESHOT: CardId = CardId(14);
pub const TAVERN_RUMMAGE: CardId = CardId(15);
pub const DIVINATION: CardId = CardId(16);
pub const GRIZZLY_BEARS: CardId = CardId(20);
pub const COLOSSAL_WURM: CardId = CardId(21);
pub const TYPHOID_RATS: CardId = CardId(22);
pub const GOBLIN_BRUTE: CardId = CardId(23);
pub const CLOUD_SPRITE: CardId = CardId(24);
pub const GIANT_SPIDER: CardId = CardId(25);
pub const ELVISH_VISIONARY: CardId = CardId(26);
pub const CINDER_HOUND: CardId = CardId(27);
pub const BLOODTHIRSTY_BAT: CardId = CardId(28);
pub const SCORCHING_SENTRY: CardId = CardId(29);
pub const WHITE_KNIGHT: CardId = CardId(30);
pub const GLORIOUS_ANTHEM: CardId = CardId(40);
pub const STREAM_CYCLER: CardId = CardId(41);
pub const SPARK_SAGE: CardId = CardId(42);
pub const ARC_MAGE: CardId = CardId(43);

fn land(id: CardId, name: &str, mana: ManaType) -> CardDefinition {
    CardDefinition::new(
        id,
        Characteristics::new(name)
            .with_type(CardType::Land)
            .with_subtype("Basic"),
    )
    .with_mana_ability(ManaProduction::Fixed(mana))
}

fn creature(id: CardId, name: &str, cost: &str, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::new(
        id,
        Characteristics::new(name)
            .with_type(CardType::Creature)
            .with_pt(power, toughness),
    )
    .with_cost(cost_of(cost))
}

fn with_keyword(mut card: CardDefinition, keyword: Keyword) -> CardDefinition {
    card.characteristics = card.characteristics.with_keyword(keyword);
    card
}

fn with_color(mut card: CardDefinition, color: Color) -> CardDefinition {
    card.characteristics = card.characteristics.with_color(color);
    card
}

pub fn cost_of(text: &str) -> ManaCost {
    ManaCost::parse(text).unwrap()
}

/// The card pool every integration test draws from.
pub fn registry() -> CardRegistry {
    let mut registry = CardRegistry::new();

    registry.register(land(MOUNTAIN, "Mountain", ManaType::Red));
    registry.register(land(FOREST, "Forest", ManaType::Green));
    registry.register(land(ISLAND, "Island", ManaType::Blue));

    registry.register(with_color(
        CardDefinition::new(SHOCK, Characteristics::new("Shock").with_type(CardType::Instant))
            .with_cost(cost_of("{R}"))
            .with_spell_effect(Effect::DealDamage {
                amount: Amount::Fixed(2),
                to: EffectTarget::Target(0),
            })
            .with_spell_target(TargetRequirement::any()),
        Color::Red,
    ));
    registry.register(
        CardDefinition::new(
            GIANT_GROWTH,
            Characteristics::new("Giant Growth").with_type(CardType::Instant),
        )
        .with_cost(cost_of("{G}"))
        .with_spell_effect(Effect::pump(EffectTarget::Target(0), 3, 3))
        .with_spell_target(TargetRequirement::creature()),
    );
    registry.register(
        CardDefinition::new(
            COUNTERSPELL,
            Characteristics::new("Counterspell").with_type(CardType::Instant),
        )
        .with_cost(cost_of("{U}{U}"))
        .with_spell_effect(Effect::CounterSpell {
            what: EffectTarget::Target(0),
        })
        .with_spell_target(TargetRequirement::spell()),
    );
    registry.register(
        CardDefinition::new(MANA_LEAK, Characteristics::new("Mana Leak").with_type(CardType::Instant))
            .with_cost(cost_of("{1}{U}"))
            .with_spell_effect(Effect::CounterUnlessPays {
                what: EffectTarget::Target(0),
                cost: cost_of("{3}"),
            })
            .with_spell_target(TargetRequirement::spell()),
    );
    registry.register(
        CardDefinition::new(GRAPESHOT, Characteristics::new("Grapeshot").with_type(CardType::Sorcery))
            .with_cost(cost_of("{1}{R}"))
            .with_spell_effect(Effect::DealDamage {
                amount: Amount::Fixed(1),
                to: EffectTarget::Target(0),
            })
            .with_spell_target(TargetRequirement::any())
            .with_trigger(
                TriggeredAbility::new(
                    TriggerCondition::SelfCast,
                    Effect::CopySpell {
                        what: EffectTarget::Source,
                        copies: CopyCount::Storm,
                    },
                )
                .with_description("storm"),
            ),
    );
    registry.register(
        CardDefinition::new(
            TAVERN_RUMMAGE,
            Characteristics::new("Tavern Rummage").with_type(CardType::Sorcery),
        )
        .with_cost(cost_of("{R}"))
        .with_spell_effect(Effect::Rummage { discard: 1, draw: 1 }),
    );
    registry.register(
        CardDefinition::new(DIVINATION, Characteristics::new("Divination").with_type(CardType::Sorcery))
            .with_cost(cost_of("{2}{U}"))
            .with_spell_effect(Effect::DrawCards {
                count: Amount::Fixed(2),
                player: EffectTarget::Controller,
            }),
    );

    registry.register(creature(GRIZZLY_BEARS, "Grizzly Bears", "{1}{G}", 2, 2));
    registry.register(with_keyword(
        creature(COLOSSAL_WURM, "Colossal Wurm", "{5}{G}{G}", 7, 7),
        Keyword::Trample,
    ));
    registry.register(with_keyword(
        creature(TYPHOID_RATS, "Typhoid Rats", "{B}", 1, 1),
        Keyword::Deathtouch,
    ));
    registry.register(with_keyword(
        creature(GOBLIN_BRUTE, "Goblin Brute", "{2}{R}", 3, 2),
        Keyword::Menace,
    ));
    registry.register(with_keyword(
        creature(CLOUD_SPRITE, "Cloud Sprite", "{U}", 1, 1),
        Keyword::Flying,
    ));
    registry.register(with_keyword(
        creature(GIANT_SPIDER, "Giant Spider", "{3}{G}", 2, 4),
        Keyword::Reach,
    ));
    registry.register(
        creature(ELVISH_VISIONARY, "Elvish Visionary", "{1}{G}", 1, 1).with_trigger(
            TriggeredAbility::new(
                TriggerCondition::SelfEntersBattlefield,
                Effect::DrawCards {
                    count: Amount::Fixed(1),
                    player: EffectTarget::Controller,
                },
            )
            .with_description("draw a card"),
        ),
    );
    registry.register(
        creature(CINDER_HOUND, "Cinder Hound", "{3}{R}", 3, 3).with_trigger(
            TriggeredAbility::new(
                TriggerCondition::SelfDiscarded,
                Effect::DealDamage {
                    amount: Amount::Fixed(3),
                    to: EffectTarget::Target(0),
                },
            )
            .with_target(TargetRequirement::any())
            .with_description("deal 3 damage to any target"),
        ),
    );
    registry.register(with_keyword(
        creature(BLOODTHIRSTY_BAT, "Bloodthirsty Bat", "{1}{B}", 2, 2),
        Keyword::Lifelink,
    ));
    registry.register(
        creature(SCORCHING_SENTRY, "Scorching Sentry", "{2}{R}", 2, 2).with_trigger(
            TriggeredAbility::new(
                TriggerCondition::SelfEntersBattlefield,
                Effect::DealDamage {
                    amount: Amount::Fixed(1),
                    to: EffectTarget::Target(0),
                },
            )
            .with_target(TargetRequirement::creature())
            .with_description("deal 1 damage to target creature"),
        ),
    );
    registry.register(with_keyword(
        with_keyword(
            creature(WHITE_KNIGHT, "White Knight", "{W}{W}", 2, 2),
            Keyword::FirstStrike,
        ),
        Keyword::Protection(Color::Red),
    ));

    registry.register(
        CardDefinition::new(
            GLORIOUS_ANTHEM,
            Characteristics::new("Glorious Anthem").with_type(CardType::Enchantment),
        )
        .with_cost(cost_of("{1}{W}{W}"))
        .with_static(StaticAbility::new(
            Modification::ModifyPowerToughness {
                power: 1,
                toughness: 1,
            },
            AffectedFilter::CreaturesYouControl,
        )),
    );
    registry.register(
        creature(STREAM_CYCLER, "Stream Cycler", "{4}{U}", 3, 3).with_activated(ActivatedAbility::cycling(
            cost_of("{2}"),
            Effect::DrawCards {
                count: Amount::Fixed(1),
                player: EffectTarget::Controller,
            },
        )),
    );
    registry.register(
        creature(SPARK_SAGE, "Spark Sage", "{1}{R}", 1, 1).with_activated(
            ActivatedAbility::new(
                AbilityCost {
                    mana: cost_of("{R}"),
                    tap: true,
                    discard_self: false,
                },
                Effect::DealDamage {
                    amount: Amount::Fixed(1),
                    to: EffectTarget::Target(0),
                },
            )
            .with_target(TargetRequirement::any()),
        ),
    );
    registry.register(
        CardDefinition::new(
            ARC_MAGE,
            Characteristics::new("Arc Mage")
                .with_type(CardType::Planeswalker)
                .with_loyalty(3),
        )
        .with_cost(cost_of("{2}{R}{R}")),
    );

    registry
}

/// A two-player game with empty zones.
pub fn two_player_game() -> GameState {
    GameState::new(RulesConfig::new(2).with_seed(7))
}

pub fn p(index: u8) -> PlayerId {
    PlayerId::new(index)
}

/// Put a card from the pool directly into `zone`.
pub fn put(state: &mut GameState, registry: &CardRegistry, card: CardId, owner: PlayerId, zone: ZoneId) -> EntityId {
    let definition = registry.get_card(card).unwrap();
    state.create_card(definition, owner, zone)
}

pub fn lands(state: &mut GameState, registry: &CardRegistry, card: CardId, owner: PlayerId, count: usize) -> Vec<EntityId> {
    (0..count)
        .map(|_| put(state, registry, card, owner, ZoneId::BATTLEFIELD))
        .collect()
}

/// Execute and require success.
pub fn ok(engine: &Engine, state: &GameState, action: Action) -> GameState {
    match engine.execute(state, action.clone()) {
        ExecutionResult::Success { state, .. } => state,
        other => panic!("{action:?} did not succeed: {:?} {:?}", other.error(), other.decision()),
    }
}

/// Every player passes once, in priority order.
pub fn pass_all(engine: &Engine, state: &GameState) -> ExecutionResult {
    let mut state = state.clone();
    let players = state.players_in_game().count();
    for i in 0..players {
        let player = state.turn.priority_player;
        let result = engine.execute(&state, Action::PassPriority { player });
        if i + 1 == players {
            return result;
        }
        state = result.into_state();
    }
    unreachable!("at least one player is in the game")
}

pub fn cast(player: PlayerId, card: EntityId, targets: Vec<Target>) -> Action {
    Action::CastSpell {
        player,
        card,
        targets,
        x: 0,
    }
}
