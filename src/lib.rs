//! Flag Royale - last flag standing in a circular arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity store, arena geometry, physics, round state)
//! - `renderer`: CPU rasterizer producing fixed-size RGB frames
//! - `sink`: Where rendered frames go (PNG sequence, encoder pipe, bounded channel)
//! - `engine`: Round loop tying simulation, rendering and sink together
//! - `config`: Data-driven arena and encoder settings
//! - `assets`: Flag sprite loading

pub mod assets;
pub mod config;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod sim;
pub mod sink;

pub use config::Config;
pub use engine::{Engine, Mode, RoundReport};
pub use error::{Result, RoyaleError};

use glam::Vec2;

/// Reference configuration constants
pub mod consts {
    /// Output frame dimensions
    pub const FRAME_WIDTH: u32 = 1280;
    pub const FRAME_HEIGHT: u32 = 720;
    /// Frames per second handed to the encoder
    pub const FPS: u32 = 30;

    /// Arena containment radius (pixels)
    pub const ARENA_RADIUS: f32 = 260.0;
    /// Half-angle of the escape sector centred on +x (degrees)
    pub const GAP_HALF_WIDTH_DEG: f32 = 20.0;

    /// Flag sprite edge length. Also the centre-to-centre collision threshold.
    pub const FLAG_SIZE: u32 = 48;
    /// Spawn positions stay this far inside the wall
    pub const SPAWN_CLEARANCE: f32 = 60.0;
    /// Per-axis launch speed range (pixels per tick)
    pub const MIN_SPEED: f32 = 2.0;
    pub const MAX_SPEED: f32 = 4.0;

    /// One-shot runs stop here even with several survivors
    pub const MAX_TICKS: u64 = 2000;
    /// Winner banner duration
    pub const WINNER_PAUSE_SECS: f32 = 10.0;

    pub const BG_COLOR: [u8; 3] = [18, 18, 18];
    pub const ARENA_COLOR: [u8; 3] = [255, 255, 255];
    pub const ARENA_LINE_WIDTH: u32 = 4;
    pub const BANNER_COLOR: [u8; 3] = [255, 255, 0];
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_degrees(deg: f32) -> f32 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees_range() {
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }

    #[test]
    fn test_normalize_degrees_large_inputs() {
        // Far beyond the point where subtracting 360 changes an f32
        for deg in [5.7e10_f32, -5.7e10, 1e9_f32.to_degrees(), f32::MAX, f32::MIN] {
            let n = normalize_degrees(deg);
            assert!(n > -180.0 && n <= 180.0, "{deg} -> {n}");
        }
    }

    #[test]
    fn test_polar_roundtrip_quadrant() {
        let p = polar_to_cartesian(10.0, std::f32::consts::FRAC_PI_2);
        let (r, theta) = cartesian_to_polar(p);
        assert!((r - 10.0).abs() < 1e-4);
        assert!((theta - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }
}
