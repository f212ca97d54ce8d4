//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - One explicit Euler step per tick, no wall clock
//! - Seeded RNG only (at spawn)
//! - Stable iteration order (by entity id)
//! - No rendering or sink dependencies

pub mod arena;
pub mod collision;
pub mod state;
pub mod store;
pub mod tick;

pub use arena::Arena;
pub use collision::{WallContact, flags_overlap, reflect_velocity, wall_contact};
pub use state::{Entity, Round, RoundOutcome, RoundPhase, SimEvent};
pub use store::EntityStore;
pub use tick::{Advance, PhysicsRules, RoundRules, advance, step};
