//! Wall and flag-to-flag contact tests
//!
//! Wall contact is evaluated after integration: an out-of-bounds flag inside
//! the gap escapes, anything touching the wall elsewhere is reflected.

use glam::Vec2;

use super::arena::Arena;

/// Result of testing one flag against the arena boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallContact {
    /// Fully past the wall and inside the gap sector
    Escaped,
    /// Edge reached the wall; reflect about this outward normal
    Bounce { normal: Vec2 },
    /// No contact (or degenerate position at the exact centre)
    Clear,
}

/// Classify a flag's position against the wall
pub fn wall_contact(arena: &Arena, pos: Vec2, token_radius: f32) -> WallContact {
    let dist = arena.distance_from_center(pos);

    if dist > arena.radius && arena.is_in_exit_gap(arena.angle_from_center(pos)) {
        return WallContact::Escaped;
    }

    if dist > arena.radius - token_radius {
        if let Some(normal) = arena.wall_normal(pos) {
            return WallContact::Bounce { normal };
        }
    }

    WallContact::Clear
}

/// Reflect velocity off a surface
///
/// Standard specular reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Two flags collide when their centres are closer than `threshold`
#[inline]
pub fn flags_overlap(a: Vec2, b: Vec2, threshold: f32) -> bool {
    a.distance(b) < threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena::new(Vec2::new(640.0, 360.0), 260.0, 20.0)
    }

    #[test]
    fn test_escape_inside_gap() {
        let a = arena();
        let pos = a.center + Vec2::new(261.0, 0.0);
        assert_eq!(wall_contact(&a, pos, 24.0), WallContact::Escaped);
    }

    #[test]
    fn test_bounce_outside_gap() {
        let a = arena();
        let pos = a.center + Vec2::new(0.0, 261.0);
        match wall_contact(&a, pos, 24.0) {
            WallContact::Bounce { normal } => assert!((normal - Vec2::Y).length() < 1e-5),
            other => panic!("expected bounce, got {other:?}"),
        }
    }

    #[test]
    fn test_bounce_inside_gap_before_full_escape() {
        let a = arena();
        // Edge touches the wall inside the gap but the centre has not crossed it
        let pos = a.center + Vec2::new(250.0, 0.0);
        assert!(matches!(wall_contact(&a, pos, 24.0), WallContact::Bounce { .. }));
    }

    #[test]
    fn test_clear_in_interior() {
        let a = arena();
        assert_eq!(wall_contact(&a, a.center + Vec2::new(100.0, 0.0), 24.0), WallContact::Clear);
        assert_eq!(wall_contact(&a, a.center, 24.0), WallContact::Clear);
    }

    #[test]
    fn test_degenerate_center_never_bounces() {
        // Token larger than the arena: every position touches the wall, even the centre
        let a = Arena::new(Vec2::ZERO, 10.0, 20.0);
        assert_eq!(wall_contact(&a, Vec2::ZERO, 24.0), WallContact::Clear);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(flags_overlap(Vec2::ZERO, Vec2::new(47.9, 0.0), 48.0));
        assert!(!flags_overlap(Vec2::ZERO, Vec2::new(48.0, 0.0), 48.0));
    }

    proptest! {
        #[test]
        fn prop_reflection_preserves_speed(
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
            theta in -std::f32::consts::PI..std::f32::consts::PI,
        ) {
            let v = Vec2::new(vx, vy);
            let n = Vec2::new(theta.cos(), theta.sin());
            let r = reflect_velocity(v, n);
            prop_assert!((r.length() - v.length()).abs() <= 1e-3 * (1.0 + v.length()));
        }
    }
}
