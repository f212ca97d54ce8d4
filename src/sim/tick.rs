//! Fixed-step physics tick and round state machine
//!
//! Per tick, every flag alive at the start of the tick is processed in
//! creation order: integrate, test for escape, reflect off the wall, then
//! swap velocities with every other alive flag it overlaps.
//!
//! Collision resolution is sequential and chained. A flag compares against
//! all other alive flags using their current velocity, including flags
//! already processed (and possibly already swapped) this tick. An
//! overlapping pair is therefore visited from both sides and can swap twice
//! in one tick; which velocity a flag ends up with depends on iteration
//! order.

use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::collision::{WallContact, flags_overlap, reflect_velocity, wall_contact};
use super::state::{Round, RoundOutcome, RoundPhase, SimEvent};
use super::store::EntityStore;
use crate::config::Config;

/// Per-tick physics parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsRules {
    /// Half sprite width, used for wall contact
    pub token_radius: f32,
    /// Centre distance below which two flags swap velocities
    pub collision_threshold: f32,
}

impl PhysicsRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            token_radius: config.token_radius(),
            collision_threshold: config.collision_threshold(),
        }
    }
}

/// Round-level rules on top of the physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundRules {
    pub physics: PhysicsRules,
    /// Stop after this many ticks even with several survivors
    pub max_ticks: Option<u64>,
    /// Banner frames shown before the round ends
    pub winner_pause_ticks: u32,
}

impl RoundRules {
    pub fn from_config(config: &Config, max_ticks: Option<u64>) -> Self {
        Self {
            physics: PhysicsRules::from_config(config),
            max_ticks,
            winner_pause_ticks: config.winner_pause_ticks(),
        }
    }
}

/// What one call to [`advance`] did
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// A physics tick ran; render the arena
    Simulated(Vec<SimEvent>),
    /// The round just left `Running`; no frame for this step
    Finished(RoundOutcome),
    /// Show the winner banner; `remaining` banner frames follow this one
    Paused { remaining: u32 },
    /// Nothing left to do
    Ended,
}

/// Advance a round by one step of its state machine
pub fn advance(round: &mut Round, arena: &Arena, rules: &RoundRules) -> Advance {
    match round.phase {
        RoundPhase::Running => {
            let alive = round.store.alive_count();
            let capped = rules.max_ticks.is_some_and(|max| round.tick_index >= max);

            if alive <= 1 || capped {
                let outcome = RoundOutcome {
                    winner: round.store.iter_alive().next().map(|e| e.id),
                    ticks: round.tick_index,
                    timed_out: alive > 1,
                };
                if outcome.timed_out {
                    log::warn!(
                        "Tick cap {} reached with {} flags alive",
                        round.tick_index,
                        alive
                    );
                }
                round.outcome = Some(outcome.clone());
                round.phase = RoundPhase::WinnerPause {
                    remaining: rules.winner_pause_ticks,
                };
                return Advance::Finished(outcome);
            }

            round.tick_index += 1;
            Advance::Simulated(step(
                &mut round.store,
                arena,
                &rules.physics,
                round.tick_index,
            ))
        }

        RoundPhase::WinnerPause { remaining } => {
            if remaining == 0 {
                round.phase = RoundPhase::Ended;
                Advance::Ended
            } else {
                round.phase = RoundPhase::WinnerPause {
                    remaining: remaining - 1,
                };
                Advance::Paused {
                    remaining: remaining - 1,
                }
            }
        }

        RoundPhase::Ended => Advance::Ended,
    }
}

/// Run one physics tick over every alive flag
///
/// `tick` tags the emitted events.
pub fn step(
    store: &mut EntityStore,
    arena: &Arena,
    rules: &PhysicsRules,
    tick: u64,
) -> Vec<SimEvent> {
    let mut events = Vec::new();

    for i in store.alive_indices() {
        let entity = store.at_mut(i);
        entity.pos += entity.vel;
        let id = entity.id;

        match wall_contact(arena, entity.pos, rules.token_radius) {
            WallContact::Escaped => {
                entity.alive = false;
                log::info!("{} eliminated at tick {}", entity.label, tick);
                events.push(SimEvent::Eliminated { id, tick });
                continue;
            }
            WallContact::Bounce { normal } => {
                entity.vel = reflect_velocity(entity.vel, normal);
                log::debug!("{} bounced off the wall at tick {}", entity.label, tick);
                events.push(SimEvent::WallBounce { id, tick });
            }
            WallContact::Clear => {}
        }

        resolve_collisions(store, i, rules.collision_threshold, tick, &mut events);
    }

    events
}

/// Swap velocities between flag `i` and every other alive flag it overlaps
pub(crate) fn resolve_collisions(
    store: &mut EntityStore,
    i: usize,
    threshold: f32,
    tick: u64,
    events: &mut Vec<SimEvent>,
) {
    for j in 0..store.len() {
        if j == i || !store.at(j).alive {
            continue;
        }
        if flags_overlap(store.at(i).pos, store.at(j).pos, threshold) {
            store.swap_velocities(i, j);
            let (a, b) = (store.at(i).id, store.at(j).id);
            log::debug!("Flags {} and {} collided at tick {}", a, b, tick);
            events.push(SimEvent::Collision { a, b, tick });
        }
    }
}
