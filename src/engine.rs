//! Round loop
//!
//! Drives simulate → render → emit on a single thread. The sink's `emit` is
//! the only suspension point. One-shot mode plays a single capped round and
//! finishes the sink; continuous mode plays rounds back to back.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::assets::FlagSprite;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::renderer::Renderer;
use crate::sim::{Advance, Arena, Round, RoundRules, SimEvent, advance};
use crate::sink::FrameSink;

/// How rounds are chained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// One capped round, then the sink is finished
    OneShot,
    /// Rounds repeat until the sink fails or the round budget runs out
    Continuous,
}

/// Summary of a finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number within the session
    pub round: u32,
    pub winner_id: Option<u32>,
    pub winner: Option<String>,
    /// Physics ticks played
    pub ticks: u64,
    pub timed_out: bool,
    /// (flag label, tick) in elimination order
    pub eliminations: Vec<(String, u64)>,
    /// Ticks with a wall bounce or collision, one entry per hit
    pub hits: Vec<u64>,
}

type RoundObserver = Box<dyn FnMut(&RoundReport)>;

pub struct Engine<S: FrameSink> {
    config: Config,
    mode: Mode,
    arena: Arena,
    rules: RoundRules,
    renderer: Renderer,
    labels: Vec<String>,
    sink: S,
    rng: Pcg32,
    seed: u64,
    /// Frames emitted this session
    frame_index: u64,
    rounds_played: u32,
    on_round_end: Option<RoundObserver>,
}

impl<S: FrameSink> Engine<S> {
    /// Validate the configuration and build an engine over the given flags
    pub fn new(config: Config, flags: Vec<FlagSprite>, sink: S, mode: Mode) -> Result<Self> {
        config.validate()?;
        if flags.len() < 2 {
            return Err(ConfigError::NotEnoughAssets { found: flags.len() }.into());
        }

        let seed = config.seed.unwrap_or_else(rand::random);
        let max_ticks = match mode {
            Mode::OneShot => Some(config.max_ticks),
            Mode::Continuous => None,
        };
        let labels = flags.iter().map(|f| f.name.clone()).collect();

        Ok(Self {
            arena: Arena::from_config(&config),
            rules: RoundRules::from_config(&config, max_ticks),
            renderer: Renderer::new(&config, flags),
            labels,
            sink,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            frame_index: 0,
            rounds_played: 0,
            on_round_end: None,
            config,
            mode,
        })
    }

    /// Called with every round's report as it ends
    pub fn on_round_end(mut self, observer: impl FnMut(&RoundReport) + 'static) -> Self {
        self.on_round_end = Some(Box::new(observer));
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frame_index
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run the session
    ///
    /// One-shot: play one round, finish the sink (encoding the output) and
    /// return its report. Continuous: play rounds until `max_rounds` (if any)
    /// and return the last report. A sink failure stops the loop at once.
    pub fn run(&mut self, max_rounds: Option<u32>) -> Result<Option<RoundReport>> {
        let result = self.run_rounds(max_rounds);
        match result {
            Ok(report) => {
                self.sink.finish()?;
                Ok(report)
            }
            Err(e) => {
                log::error!("Session stopped: {}", e);
                Err(e)
            }
        }
    }

    fn run_rounds(&mut self, max_rounds: Option<u32>) -> Result<Option<RoundReport>> {
        let budget = match self.mode {
            Mode::OneShot => Some(1),
            Mode::Continuous => max_rounds,
        };

        let mut last = None;
        while budget.is_none_or(|n| self.rounds_played < n) {
            last = Some(self.run_round()?);
        }
        Ok(last)
    }

    /// Spawn a fresh round and play it to the end
    pub fn run_round(&mut self) -> Result<RoundReport> {
        let round = Round::spawn(&self.labels, &self.arena, &self.config, &mut self.rng);
        log::info!(
            "Round {} starting with {} flags (seed {})",
            self.rounds_played + 1,
            self.labels.len(),
            self.seed
        );
        self.play(round)
    }

    /// Play a prepared round through `Running`, the winner pause and `Ended`
    pub fn play(&mut self, mut round: Round) -> Result<RoundReport> {
        let mut eliminations = Vec::new();
        let mut hits = Vec::new();

        loop {
            match advance(&mut round, &self.arena, &self.rules) {
                Advance::Simulated(events) => {
                    for event in &events {
                        if event.is_hit() {
                            hits.push(event.tick());
                        }
                        if let SimEvent::Eliminated { id, tick } = *event {
                            if let Some(entity) = round.store.get(id) {
                                eliminations.push((entity.label.clone(), tick));
                            }
                        }
                    }
                    let frame = self.renderer.render_arena(&round.store);
                    self.emit(&frame)?;
                }
                Advance::Finished(outcome) => {
                    log::info!(
                        "WINNER: {} after {} ticks",
                        round.winner_label().unwrap_or("NONE"),
                        outcome.ticks
                    );
                }
                Advance::Paused { .. } => {
                    let frame = self.renderer.render_banner(round.winner_label());
                    self.emit(&frame)?;
                }
                Advance::Ended => break,
            }
        }

        self.rounds_played += 1;
        let outcome = round.outcome.clone().unwrap_or_default();
        let report = RoundReport {
            round: self.rounds_played,
            winner_id: outcome.winner,
            winner: round.winner_label().map(str::to_string),
            ticks: outcome.ticks,
            timed_out: outcome.timed_out,
            eliminations,
            hits,
        };

        self.sink.end_round(&report)?;
        if let Some(observer) = self.on_round_end.as_mut() {
            observer(&report);
        }
        Ok(report)
    }

    fn emit(&mut self, frame: &image::RgbImage) -> Result<()> {
        self.sink.emit(self.frame_index, frame)?;
        self.frame_index += 1;
        Ok(())
    }
}
