//! Arena, physics and output settings
//!
//! Loaded from an optional JSON file, then overridden from the command line.
//! Every field has a default so a partial file is valid.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Frame ===
    /// Output frame width in pixels
    pub width: u32,
    /// Output frame height in pixels
    pub height: u32,
    /// Frames per second (encoder input rate, banner duration)
    pub fps: u32,

    // === Arena ===
    /// Containment radius around the frame centre
    pub arena_radius: f32,
    /// Half-angle of the escape gap (degrees, centred on +x)
    pub gap_half_width_deg: f32,

    // === Flags ===
    /// Sprite edge length; also the collision threshold
    pub token_size: u32,
    /// Spawn positions stay this far inside the wall
    pub spawn_clearance: f32,
    /// Per-axis launch speed range
    pub min_speed: f32,
    pub max_speed: f32,

    // === Rounds ===
    /// Tick cap for one-shot rounds
    pub max_ticks: u64,
    /// How long the winner banner stays up
    pub winner_pause_secs: f32,
    /// RNG seed; random when absent
    pub seed: Option<u64>,

    // === Colours ===
    pub bg_color: [u8; 3],
    pub arena_color: [u8; 3],
    pub arena_line_width: u32,
    pub banner_color: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            fps: FPS,

            arena_radius: ARENA_RADIUS,
            gap_half_width_deg: GAP_HALF_WIDTH_DEG,

            token_size: FLAG_SIZE,
            spawn_clearance: SPAWN_CLEARANCE,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,

            max_ticks: MAX_TICKS,
            winner_pause_secs: WINNER_PAUSE_SECS,
            seed: None,

            bg_color: BG_COLOR,
            arena_color: ARENA_COLOR,
            arena_line_width: ARENA_LINE_WIDTH,
            banner_color: BANNER_COLOR,
        }
    }
}

impl Config {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid("width/height", "frame must be non-empty"));
        }
        if self.fps == 0 {
            return Err(ConfigError::invalid("fps", "must be positive"));
        }
        if self.token_size == 0 {
            return Err(ConfigError::invalid("token_size", "must be positive"));
        }
        for (field, value) in [
            ("arena_radius", self.arena_radius),
            ("gap_half_width_deg", self.gap_half_width_deg),
            ("spawn_clearance", self.spawn_clearance),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("winner_pause_secs", self.winner_pause_secs),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{value} is not finite")));
            }
        }
        if !(self.arena_radius > 0.0) {
            return Err(ConfigError::invalid("arena_radius", "must be positive"));
        }
        if !(self.gap_half_width_deg > 0.0 && self.gap_half_width_deg <= 180.0) {
            return Err(ConfigError::invalid(
                "gap_half_width_deg",
                format!("{} is outside (0, 180]", self.gap_half_width_deg),
            ));
        }
        if !(self.min_speed > 0.0) || self.min_speed > self.max_speed {
            return Err(ConfigError::invalid(
                "min_speed/max_speed",
                format!("need 0 < min <= max, got {}..{}", self.min_speed, self.max_speed),
            ));
        }
        if self.spawn_clearance < 0.0 || self.spawn_clearance >= self.arena_radius {
            return Err(ConfigError::invalid(
                "spawn_clearance",
                format!("must lie in [0, {})", self.arena_radius),
            ));
        }
        if self.winner_pause_secs < 0.0 {
            return Err(ConfigError::invalid("winner_pause_secs", "must not be negative"));
        }
        Ok(())
    }

    /// Arena centre in frame coordinates
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.width / 2) as f32, (self.height / 2) as f32)
    }

    /// Half the sprite edge; used for wall contact
    pub fn token_radius(&self) -> f32 {
        self.token_size as f32 / 2.0
    }

    /// Centre-to-centre distance below which two flags swap velocities.
    /// This is the full sprite width, not the sum of two half-widths.
    pub fn collision_threshold(&self) -> f32 {
        self.token_size as f32
    }

    /// Winner banner duration in frames
    pub fn winner_pause_ticks(&self) -> u32 {
        (self.fps as f32 * self.winner_pause_secs).round() as u32
    }

    /// Size of one raw rgb24 frame in bytes
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference() {
        let config = Config::default();
        assert_eq!(config.center(), Vec2::new(640.0, 360.0));
        assert_eq!(config.collision_threshold(), 48.0);
        assert_eq!(config.token_radius(), 24.0);
        assert_eq!(config.winner_pause_ticks(), 300);
        assert_eq!(config.frame_bytes(), 1280 * 720 * 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "arena_radius": 300.0, "seed": 7 }"#).unwrap();
        assert_eq!(config.arena_radius, 300.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.token_size, FLAG_SIZE);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_gap = Config {
            gap_half_width_deg: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad_gap.validate(),
            Err(ConfigError::InvalidValue { field: "gap_half_width_deg", .. })
        ));

        let bad_speed = Config {
            min_speed: 5.0,
            max_speed: 4.0,
            ..Default::default()
        };
        assert!(bad_speed.validate().is_err());

        let bad_clearance = Config {
            spawn_clearance: 260.0,
            ..Default::default()
        };
        assert!(bad_clearance.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        // Out of f32 range; parses as infinity
        let huge: Config = serde_json::from_str(r#"{ "arena_radius": 1e39, "seed": 1 }"#).unwrap();
        assert!(huge.arena_radius.is_infinite());
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::InvalidValue { field: "arena_radius", .. })
        ));

        let cases = [
            Config { gap_half_width_deg: f32::NAN, ..Default::default() },
            Config { spawn_clearance: f32::NEG_INFINITY, ..Default::default() },
            Config { min_speed: f32::NAN, ..Default::default() },
            Config { max_speed: f32::INFINITY, ..Default::default() },
            Config { winner_pause_secs: f32::INFINITY, ..Default::default() },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }
}
