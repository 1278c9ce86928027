//! Unit tests for mg-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EntityId, ExhibitId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(ExhibitId(100) > ExhibitId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(ExhibitId::INVALID.0, u32::MAX);
        assert_eq!(EntityId::INVALID.0, u64::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::Vec3;

    #[test]
    fn horizontal_distance_ignores_y() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 10.0, 4.0);
        assert!((a.horizontal_distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_rejects_degenerate() {
        assert!(Vec3::new(1e-5, 0.0, 0.0).normalized().is_none());
        let n = Vec3::new(0.0, 0.0, 2.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn yaw_convention_faces_plus_z_at_zero() {
        // yaw 0 faces +Z; yaw π/2 faces +X.
        assert!(Vec3::new(0.0, 0.0, 1.0).yaw().unwrap().abs() < 1e-6);
        let quarter = Vec3::new(1.0, 0.0, 0.0).yaw().unwrap();
        assert!((quarter - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn yaw_roundtrips_through_from_yaw() {
        for yaw in [-2.1_f32, -0.5, 0.0, 0.7, 3.0] {
            let back = Vec3::from_yaw(yaw).yaw().unwrap();
            assert!((back - yaw).abs() < 1e-5, "yaw {yaw} came back as {back}");
        }
    }

    #[test]
    fn yaw_is_none_for_vertical() {
        assert!(Vec3::new(0.0, 5.0, 0.0).yaw().is_none());
    }

    #[test]
    fn rotated_y_quarter_turn() {
        // +Z rotated by +90° lands on +X under this handedness.
        let r = Vec3::new(0.0, 0.0, 1.0).rotated_y(std::f32::consts::FRAC_PI_2);
        assert!((r.x - 1.0).abs() < 1e-6 && r.z.abs() < 1e-6);
    }

    #[test]
    fn cross_right_vector() {
        // The follow resolver derives its lateral axis as forward × up;
        // for a +Z forward that is -X.  Pin the convention.
        let right = Vec3::new(0.0, 0.0, 1.0).cross(Vec3::UP);
        assert!((right.x + 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6 && right.z.abs() < 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(5.0, 6.0, 7.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }
}

#[cfg(test)]
mod time {
    use crate::FrameClock;

    #[test]
    fn advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(1.0 / 60.0);
        clock.advance(1.0 / 60.0);
        assert!((clock.now() - 2.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn never_runs_backwards() {
        let mut clock = FrameClock::starting_at(5.0);
        clock.advance(-1.0);
        assert_eq!(clock.now(), 5.0);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_per_agent() {
        let mut a1 = AgentRng::new(42, AgentId(0));
        let mut a2 = AgentRng::new(42, AgentId(0));
        for _ in 0..16 {
            assert_eq!(a1.gen_range(0u32..1000), a2.gen_range(0u32..1000));
        }
    }

    #[test]
    fn agents_get_independent_streams() {
        let mut a = AgentRng::new(42, AgentId(0));
        let mut b = AgentRng::new(42, AgentId(1));
        let same = (0..16).filter(|_| a.gen_range(0u32..1000) == b.gen_range(0u32..1000)).count();
        assert!(same < 16, "two agents produced identical streams");
    }

    #[test]
    fn random_heading_in_range() {
        let mut rng = AgentRng::new(7, AgentId(3));
        for _ in 0..64 {
            let h = rng.random_heading();
            assert!((0.0..std::f32::consts::TAU).contains(&h));
        }
    }
}
