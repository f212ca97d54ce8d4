//! Circular arena geometry with a fixed escape gap
//!
//! The gap is an angular sector of the boundary centred on angle 0 (the +x
//! direction from the centre). Angles follow `atan2(dy, dx)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::{cartesian_to_polar, normalize_degrees};

/// The containment circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Centre in frame coordinates
    pub center: Vec2,
    /// Outer containment radius
    pub radius: f32,
    /// Half-angle of the escape sector (degrees)
    pub gap_half_width_deg: f32,
}

impl Arena {
    pub fn new(center: Vec2, radius: f32, gap_half_width_deg: f32) -> Self {
        Self {
            center,
            radius,
            gap_half_width_deg,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.center(), config.arena_radius, config.gap_half_width_deg)
    }

    #[inline]
    pub fn distance_from_center(&self, pos: Vec2) -> f32 {
        (pos - self.center).length()
    }

    /// Angle of `pos` around the centre in radians, 0 along +x
    #[inline]
    pub fn angle_from_center(&self, pos: Vec2) -> f32 {
        cartesian_to_polar(pos - self.center).1
    }

    /// Check if an angle (radians) lies strictly inside the escape sector
    pub fn is_in_exit_gap(&self, angle: f32) -> bool {
        let deg = normalize_degrees(angle.to_degrees());
        -self.gap_half_width_deg < deg && deg < self.gap_half_width_deg
    }

    /// Outward radial unit vector at `pos`; `None` exactly at the centre
    pub fn wall_normal(&self, pos: Vec2) -> Option<Vec2> {
        let offset = pos - self.center;
        let dist = offset.length();
        if dist > 0.0 { Some(offset / dist) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn arena() -> Arena {
        Arena::new(Vec2::new(640.0, 360.0), 260.0, 20.0)
    }

    #[test]
    fn test_distance_and_angle() {
        let a = arena();
        let p = a.center + Vec2::new(0.0, 100.0);
        assert!((a.distance_from_center(p) - 100.0).abs() < 1e-4);
        assert!((a.angle_from_center(p) - PI / 2.0).abs() < 1e-5);
        assert_eq!(a.angle_from_center(a.center + Vec2::new(50.0, 0.0)), 0.0);
    }

    #[test]
    fn test_gap_is_open_interval() {
        let a = arena();
        assert!(a.is_in_exit_gap(0.0));
        assert!(a.is_in_exit_gap(19.9_f32.to_radians()));
        assert!(a.is_in_exit_gap((-19.9_f32).to_radians()));
        assert!(!a.is_in_exit_gap(20.0_f32.to_radians()));
        assert!(!a.is_in_exit_gap((-20.0_f32).to_radians()));
        assert!(!a.is_in_exit_gap(PI / 2.0));
        assert!(!a.is_in_exit_gap(PI));
    }

    #[test]
    fn test_gap_wraps_full_turns() {
        let a = arena();
        assert!(a.is_in_exit_gap(2.0 * PI + 0.1));
        assert!(!a.is_in_exit_gap(-PI));
    }

    #[test]
    fn test_wall_normal_points_outward() {
        let a = arena();
        let n = a.wall_normal(a.center + Vec2::new(-30.0, 40.0)).unwrap();
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!((n - Vec2::new(-0.6, 0.8)).length() < 1e-5);
    }

    #[test]
    fn test_wall_normal_degenerate_at_center() {
        let a = arena();
        assert!(a.wall_normal(a.center).is_none());
    }

    #[test]
    fn test_gap_check_handles_huge_angles() {
        let a = arena();
        // Must return; at this magnitude the angle carries no useful precision
        let _ = a.is_in_exit_gap(1e9);
        let _ = a.is_in_exit_gap(-1e30);
    }
}
