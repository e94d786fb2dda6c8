//! Effects: what spells and abilities do, and how continuous effects change
//! what permanents are.
//!
//! - `Effect`: The instructions a resolving spell or ability runs
//! - `EffectExecutor`: Runs effects, pausing for player decisions
//! - `ContinuousEffect` / `StaticAbility` / `ActiveFloatingEffect`: Layered
//!   modifications of characteristics
//! - `Projector`: Applies every continuous effect in layer order, producing a
//!   read-only `ProjectedState`
//! - `TargetValidator`: Target legality against the projected battlefield
//!
//! ## Design Philosophy
//!
//! Stored components hold printed values only. Everything a continuous effect
//! changes is recomputed by projection on demand, so removing an effect never
//! needs an undo step.

mod effect;
mod executor;
mod layers;
mod projector;
mod targeting;

pub use effect::{Amount, CardFilter, CopyCount, Effect, EffectTarget, ExecutionContext};
pub use executor::{created_effects, EffectExecutor};
pub use layers::{
    ActiveFloatingEffect, AffectedFilter, ContinuousEffect, Duration, DynamicValue, Layer,
    Modification, PtSublayer, StaticAbility,
};
pub use projector::{order_by_dependency, ProjectedObject, ProjectedState, Projector};
pub use targeting::{
    ControllerFilter, Target, TargetKind, TargetRequirement, TargetValidator,
};
