//! Continuous-effect projection.
//!
//! `Projector::project` computes what every permanent on the battlefield
//! actually is right now: base characteristics from components, then every
//! active continuous effect applied layer by layer.
//!
//! ## Algorithm
//!
//! 1. Seed an accumulator from each battlefield entity's base characteristics
//!    and controller.
//! 2. For each layer (and each power/toughness sublayer), materialize the
//!    static abilities that apply there. Their affected sets are resolved
//!    against the accumulator as it stands at that layer, so a type change in
//!    the type layer decides who counts as a creature for a later anthem.
//! 3. Order effects within the group by dependency, then timestamp. Floating
//!    effects apply after statics of the same group.
//! 4. Apply counters in their own sublayer: net +1/+1 minus -1/-1 to both
//!    power and toughness.
//! 5. Freeze into an `OrdMap`, so equal inputs give byte-identical output.
//!
//! The dependency check is the shallow heuristic: an effect depends on a
//! type-changing effect in the same group whose affected set intersects its
//! own. It does not trial-apply effects.

use im::{OrdMap, OrdSet};
use log::trace;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Color, Keyword};
use crate::core::{EntityId, GameState, PlayerId, Result, Timestamp};
use crate::zones::ZoneId;

use super::layers::{
    AffectedFilter, ContinuousEffect, DynamicValue, Layer, Modification, PtSublayer,
};

/// Effective characteristics of one permanent.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectedObject {
    pub name: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub types: OrdSet<CardType>,
    pub subtypes: OrdSet<String>,
    pub colors: OrdSet<Color>,
    pub keywords: OrdSet<Keyword>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
}

impl ProjectedObject {
    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.types.contains(&CardType::Creature)
    }
}

/// Read-only view of every permanent after continuous effects.
///
/// Never stored in `GameState`; recomputed on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedState {
    objects: OrdMap<EntityId, ProjectedObject>,
}

impl ProjectedState {
    /// Projected values for one permanent; `None` off the battlefield.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ProjectedObject> {
        self.objects.get(&id)
    }

    #[must_use]
    pub fn get_power(&self, id: EntityId) -> Option<i32> {
        self.objects.get(&id)?.power
    }

    #[must_use]
    pub fn get_toughness(&self, id: EntityId) -> Option<i32> {
        self.objects.get(&id)?.toughness
    }

    #[must_use]
    pub fn get_controller(&self, id: EntityId) -> Option<PlayerId> {
        self.objects.get(&id).map(|o| o.controller)
    }

    #[must_use]
    pub fn has_keyword(&self, id: EntityId, keyword: Keyword) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|o| o.keywords.contains(&keyword))
    }

    #[must_use]
    pub fn has_color(&self, id: EntityId, color: Color) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|o| o.colors.contains(&color))
    }

    #[must_use]
    pub fn has_type(&self, id: EntityId, card_type: CardType) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|o| o.types.contains(&card_type))
    }

    /// Iterate over all projected permanents in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ProjectedObject)> {
        self.objects.iter().map(|(id, o)| (*id, o))
    }

    /// Creatures, optionally restricted to one controller.
    pub fn creatures(&self, controller: Option<PlayerId>) -> impl Iterator<Item = EntityId> + '_ {
        self.objects
            .iter()
            .filter(move |(_, o)| o.is_creature() && controller.map_or(true, |c| o.controller == c))
            .map(|(id, _)| *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Canonical byte encoding, used to compare projections.
    pub fn fingerprint(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }
}

/// Computes `ProjectedState` from a `GameState`.
pub struct Projector;

type Accumulator = FxHashMap<EntityId, ProjectedObject>;

/// A static ability waiting to be materialized in its layer.
struct StaticSource<'a> {
    source: EntityId,
    timestamp: Timestamp,
    modification: &'a Modification,
    filter: &'a AffectedFilter,
}

impl Projector {
    /// Project the current battlefield.
    #[must_use]
    pub fn project(state: &GameState) -> ProjectedState {
        let mut acc = Self::seed(state);
        let statics = Self::collect_statics(state);

        for layer in Layer::ALL {
            if layer == Layer::PowerToughness {
                for sublayer in PtSublayer::ALL {
                    if sublayer == PtSublayer::Counters {
                        Self::apply_counters(state, &mut acc);
                    } else {
                        Self::apply_group(state, &mut acc, &statics, layer, Some(sublayer));
                    }
                }
            } else {
                Self::apply_group(state, &mut acc, &statics, layer, None);
            }
        }

        ProjectedState {
            objects: acc.into_iter().collect(),
        }
    }

    fn seed(state: &GameState) -> Accumulator {
        let mut acc = Accumulator::default();
        for id in state.zones.cards(ZoneId::BATTLEFIELD) {
            let Some(components) = state.entity(id) else {
                continue;
            };
            let (Some(chars), Some(owner)) = (&components.characteristics, components.owner)
            else {
                trace!("{id} on the battlefield without characteristics; not projected");
                continue;
            };
            acc.insert(
                id,
                ProjectedObject {
                    name: chars.name.clone(),
                    owner,
                    controller: components.controller.unwrap_or(owner),
                    types: chars.types.clone(),
                    subtypes: chars.subtypes.clone(),
                    colors: chars.colors.clone(),
                    keywords: chars.keywords.clone(),
                    power: chars.power,
                    toughness: chars.toughness,
                },
            );
        }
        acc
    }

    fn collect_statics(state: &GameState) -> Vec<StaticSource<'_>> {
        let mut statics = Vec::new();
        for id in state.zones.cards(ZoneId::BATTLEFIELD) {
            let Some(components) = state.entity(id) else {
                continue;
            };
            let timestamp = components.entered_at.unwrap_or_default();
            for ability in components.statics.iter() {
                statics.push(StaticSource {
                    source: id,
                    timestamp,
                    modification: &ability.modification,
                    filter: &ability.affected,
                });
            }
        }
        statics
    }

    fn apply_group(
        state: &GameState,
        acc: &mut Accumulator,
        statics: &[StaticSource<'_>],
        layer: Layer,
        sublayer: Option<PtSublayer>,
    ) {
        let in_group = |m: &Modification| m.layer() == layer && m.sublayer() == sublayer;

        let static_effects: Vec<ContinuousEffect> = statics
            .iter()
            .filter(|s| in_group(s.modification) && acc.contains_key(&s.source))
            .map(|s| {
                ContinuousEffect::new(
                    s.source,
                    s.timestamp,
                    s.modification.clone(),
                    Self::resolve_filter(state, acc, s.source, s.filter),
                )
            })
            .collect();

        let floating: Vec<ContinuousEffect> = state
            .floating_effects
            .iter()
            .filter(|f| f.effect.layer == layer && f.effect.sublayer == sublayer)
            .map(|f| f.effect.clone())
            .collect();

        for effect in order_by_dependency(&static_effects)
            .into_iter()
            .chain(order_by_dependency(&floating))
        {
            trace!(
                "applying {:?} from {} at {} to {} objects",
                effect.modification,
                effect.source,
                effect.timestamp,
                effect.affected.len()
            );
            Self::apply(state, acc, effect);
        }
    }

    fn resolve_filter(
        state: &GameState,
        acc: &Accumulator,
        source: EntityId,
        filter: &AffectedFilter,
    ) -> OrdSet<EntityId> {
        let Some(source_controller) = acc.get(&source).map(|o| o.controller) else {
            return OrdSet::new();
        };
        let creatures = || acc.iter().filter(|(_, o)| o.is_creature());

        match filter {
            AffectedFilter::SelfOnly => OrdSet::unit(source),
            AffectedFilter::EnchantedPermanent => state
                .entity(source)
                .and_then(|c| c.attached_to)
                .filter(|target| acc.contains_key(target))
                .map_or_else(OrdSet::new, OrdSet::unit),
            AffectedFilter::CreaturesYouControl => creatures()
                .filter(|(_, o)| o.controller == source_controller)
                .map(|(id, _)| *id)
                .collect(),
            AffectedFilter::OtherCreaturesYouControl => creatures()
                .filter(|(id, o)| o.controller == source_controller && **id != source)
                .map(|(id, _)| *id)
                .collect(),
            AffectedFilter::AllCreatures => creatures().map(|(id, _)| *id).collect(),
            AffectedFilter::CreaturesOpponentsControl => creatures()
                .filter(|(_, o)| o.controller != source_controller)
                .map(|(id, _)| *id)
                .collect(),
            AffectedFilter::CreaturesWithSubtype(subtype) => creatures()
                .filter(|(_, o)| o.subtypes.contains(subtype))
                .map(|(id, _)| *id)
                .collect(),
        }
    }

    fn apply(state: &GameState, acc: &mut Accumulator, effect: &ContinuousEffect) {
        // Copiable values and dynamic values are read before mutating anything.
        let copied = match &effect.modification {
            Modification::CopyOf(original) => state
                .entity(*original)
                .and_then(|c| c.characteristics.clone()),
            _ => None,
        };
        let creature_counts: FxHashMap<PlayerId, i32> =
            acc.values()
                .filter(|o| o.is_creature())
                .fold(FxHashMap::default(), |mut counts, o| {
                    *counts.entry(o.controller).or_insert(0) += 1;
                    counts
                });
        let evaluate = |value: &DynamicValue, controller: PlayerId| -> i32 {
            match value {
                DynamicValue::Fixed(n) => *n,
                DynamicValue::CardsInControllerHand => {
                    state.zones.size(ZoneId::hand(controller)) as i32
                }
                DynamicValue::CardsInControllerGraveyard => {
                    state.zones.size(ZoneId::graveyard(controller)) as i32
                }
                DynamicValue::CreaturesControllerControls => {
                    creature_counts.get(&controller).copied().unwrap_or(0)
                }
            }
        };

        for id in effect.affected.iter() {
            let Some(obj) = acc.get_mut(id) else {
                continue;
            };
            match &effect.modification {
                Modification::CopyOf(_) => {
                    if let Some(chars) = &copied {
                        obj.name = chars.name.clone();
                        obj.types = chars.types.clone();
                        obj.subtypes = chars.subtypes.clone();
                        obj.colors = chars.colors.clone();
                        obj.keywords = chars.keywords.clone();
                        obj.power = chars.power;
                        obj.toughness = chars.toughness;
                    }
                }
                Modification::ChangeController(player) => obj.controller = *player,
                Modification::ChangeColorWord { from, to } => {
                    if obj.keywords.remove(&Keyword::Protection(*from)).is_some() {
                        obj.keywords.insert(Keyword::Protection(*to));
                    }
                }
                Modification::AddCardType(card_type) => {
                    obj.types.insert(*card_type);
                }
                Modification::RemoveCardType(card_type) => {
                    obj.types.remove(card_type);
                }
                Modification::AddSubtype(subtype) => {
                    obj.subtypes.insert(subtype.clone());
                }
                Modification::AddColor(color) => {
                    obj.colors.insert(*color);
                }
                Modification::SetColors(colors) => {
                    obj.colors = colors.iter().copied().collect();
                }
                Modification::AddKeyword(keyword) => {
                    obj.keywords.insert(*keyword);
                }
                Modification::RemoveKeyword(keyword) => {
                    obj.keywords.remove(keyword);
                }
                Modification::RemoveAllKeywords => obj.keywords = OrdSet::new(),
                Modification::CharacteristicDefining { power, toughness } => {
                    obj.power = Some(evaluate(power, obj.controller));
                    obj.toughness = Some(evaluate(toughness, obj.controller));
                }
                Modification::SetPowerToughness { power, toughness } => {
                    obj.power = Some(*power);
                    obj.toughness = Some(*toughness);
                }
                Modification::ModifyPowerToughness { power, toughness } => {
                    obj.power = obj.power.map(|p| p.saturating_add(*power));
                    obj.toughness = obj.toughness.map(|t| t.saturating_add(*toughness));
                }
                Modification::SwitchPowerToughness => {
                    std::mem::swap(&mut obj.power, &mut obj.toughness);
                }
            }
        }
    }

    fn apply_counters(state: &GameState, acc: &mut Accumulator) {
        for (id, obj) in acc.iter_mut() {
            let net = state.entity(*id).map_or(0, |c| c.counters.net_pt());
            if net != 0 {
                obj.power = obj.power.map(|p| p.saturating_add(net));
                obj.toughness = obj.toughness.map(|t| t.saturating_add(net));
            }
        }
    }
}

/// Order one layer group's effects.
///
/// Effect A goes after effect B when B changes types and their affected sets
/// intersect. Independent effects keep timestamp order; if the dependencies
/// form a cycle the whole group falls back to timestamp order.
#[must_use]
pub fn order_by_dependency(effects: &[ContinuousEffect]) -> Vec<&ContinuousEffect> {
    let by_timestamp = || {
        let mut sorted: Vec<&ContinuousEffect> = effects.iter().collect();
        sorted.sort_by_key(|e| e.timestamp);
        sorted
    };
    if effects.len() <= 1 {
        return effects.iter().collect();
    }

    let n = effects.len();
    let mut depended_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (a, effect_a) in effects.iter().enumerate() {
        for (b, effect_b) in effects.iter().enumerate() {
            if a != b
                && effect_b.modification.is_type_changing()
                && effect_a.affected.iter().any(|id| effect_b.affected.contains(id))
            {
                depended_by[b].push(a);
                in_degree[a] += 1;
            }
        }
    }
    if in_degree.iter().all(|&d| d == 0) {
        return by_timestamp();
    }

    let key = |i: usize| (effects[i].timestamp, i);
    let mut ready: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut result = Vec::with_capacity(n);
    while !ready.is_empty() {
        ready.sort_by_key(|&i| std::cmp::Reverse(key(i)));
        let Some(next) = ready.pop() else { break };
        result.push(&effects[next]);
        for &dependent in &depended_by[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if result.len() < n {
        trace!("dependency cycle among {n} effects; using timestamp order");
        return by_timestamp();
    }
    result
}
