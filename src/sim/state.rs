//! Round state and core simulation types

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::store::EntityStore;
use crate::config::Config;

/// A flag token
///
/// Every flag shares one size, so the contact radius and collision threshold
/// live in [`PhysicsRules`](super::tick::PhysicsRules) rather than here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Creation-order id, starting at 1
    pub id: u32,
    /// Display name (uppercased asset stem)
    pub label: String,
    pub pos: Vec2,
    /// Distance per tick
    pub vel: Vec2,
    /// Eliminated flags stay in the store, frozen
    pub alive: bool,
}

impl Entity {
    pub fn new(id: u32, label: impl Into<String>, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            label: label.into(),
            pos,
            vel,
            alive: true,
        }
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Physics ticks are running
    Running,
    /// Showing the winner banner; physics frozen
    WinnerPause { remaining: u32 },
    /// Round is over
    Ended,
}

/// How a round finished
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// Winner id; `None` when nobody survived
    pub winner: Option<u32>,
    /// Physics ticks played
    pub ticks: u64,
    /// Ended by the tick cap with several flags still alive
    pub timed_out: bool,
}

/// Something that happened during a physics tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Flag escaped through the gap
    Eliminated { id: u32, tick: u64 },
    /// Flag reflected off the wall
    WallBounce { id: u32, tick: u64 },
    /// Two flags exchanged velocities
    Collision { a: u32, b: u32, tick: u64 },
}

impl SimEvent {
    pub fn tick(&self) -> u64 {
        match *self {
            SimEvent::Eliminated { tick, .. }
            | SimEvent::WallBounce { tick, .. }
            | SimEvent::Collision { tick, .. } => tick,
        }
    }

    /// Wall bounces and collisions (audio cue points)
    pub fn is_hit(&self) -> bool {
        matches!(self, SimEvent::WallBounce { .. } | SimEvent::Collision { .. })
    }
}

/// One play-through from spawn to a single (or zero) survivor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub store: EntityStore,
    /// Physics ticks since round start
    pub tick_index: u64,
    pub phase: RoundPhase,
    /// Set when leaving `Running`
    pub outcome: Option<RoundOutcome>,
}

impl Round {
    /// Start a round with hand-placed entities
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            store: EntityStore::new(entities),
            tick_index: 0,
            phase: RoundPhase::Running,
            outcome: None,
        }
    }

    /// Spawn one flag per label at a random spot inside the arena
    ///
    /// Positions are uniform in angle and in radius over
    /// `[0, radius - clearance)`. Each velocity component is drawn from
    /// `[min_speed, max_speed]` with a random sign.
    pub fn spawn<R: Rng>(labels: &[String], arena: &Arena, config: &Config, rng: &mut R) -> Self {
        let max_r = arena.radius - config.spawn_clearance;
        let entities = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let r = rng.random_range(0.0..max_r);
                let pos = arena.center + crate::polar_to_cartesian(r, angle);
                let vel = Vec2::new(
                    random_component(rng, config.min_speed, config.max_speed),
                    random_component(rng, config.min_speed, config.max_speed),
                );
                Entity::new(i as u32 + 1, label.clone(), pos, vel)
            })
            .collect();
        Self::new(entities)
    }

    /// Label of the winner, if the round produced one
    pub fn winner_label(&self) -> Option<&str> {
        self.outcome
            .as_ref()
            .and_then(|o| o.winner)
            .and_then(|id| self.store.get(id))
            .map(|e| e.label.as_str())
    }
}

fn random_component<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    sign * rng.random_range(min..=max)
}
