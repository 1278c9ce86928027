//! Unit tests for mg-crowd.
//!
//! All tests drive the simulation with synthetic frames over a dense
//! hand-built floor — no scene data, no wall clock.

#[cfg(test)]
mod helpers {
    use mg_core::Vec3;
    use mg_nav::{NavPoint, NavSurface, NavSurfaceBuilder, NavigationPort};

    use crate::{AgentParams, Crowd};

    /// A flat square floor sampled every 0.5 m, 4-connected.
    pub fn floor(side_m: f32) -> NavSurface {
        const SPACING: f32 = 0.5;
        let n = (side_m / SPACING) as i32 + 1;
        let mut b = NavSurfaceBuilder::with_capacity((n * n) as usize, (n * n * 4) as usize);
        for ix in 0..n {
            for iz in 0..n {
                b.add_node(Vec3::new(ix as f32 * SPACING, 0.0, iz as f32 * SPACING));
            }
        }
        let node = |ix: i32, iz: i32| mg_core::NodeId((ix * n + iz) as u32);
        for ix in 0..n {
            for iz in 0..n {
                if ix + 1 < n {
                    b.link(node(ix, iz), node(ix + 1, iz));
                }
                if iz + 1 < n {
                    b.link(node(ix, iz), node(ix, iz + 1));
                }
            }
        }
        b.build()
    }

    pub fn snap(surface: &NavSurface, x: f32, z: f32) -> NavPoint {
        surface.find_closest_point(Vec3::new(x, 0.0, z)).unwrap()
    }

    /// Run `secs` of simulation at 60 Hz frames.
    pub fn run(crowd: &mut Crowd, surface: &NavSurface, secs: f32) {
        let frames = (secs * 60.0).ceil() as usize;
        for _ in 0..frames {
            crowd.advance(1.0 / 60.0, surface);
        }
    }

    pub fn walker() -> AgentParams {
        AgentParams { max_speed: 2.0, ..AgentParams::default() }
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use mg_core::{AgentId, EntityId, Vec3};
    use mg_nav::NavSurface;

    use super::helpers;
    use crate::{AgentParams, Crowd, CrowdError};

    #[test]
    fn add_and_remove() {
        let surface = helpers::floor(4.0);
        let mut crowd = Crowd::new(42);

        let id = crowd
            .add_agent(Vec3::new(1.0, 0.0, 1.0), AgentParams::default(), Some(EntityId(7)), &surface)
            .unwrap();
        assert!(crowd.contains(id));
        assert_eq!(crowd.visual(id).unwrap(), Some(EntityId(7)));
        assert_eq!(crowd.len(), 1);
        assert_eq!(crowd.agent_ids().collect::<Vec<_>>(), vec![id]);

        assert!(crowd.remove_agent(id));
        assert!(!crowd.remove_agent(id));
        assert!(crowd.is_empty());
    }

    #[test]
    fn spawn_off_surface_returns_none() {
        let surface = helpers::floor(4.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(500.0, 0.0, 500.0), AgentParams::default(), None, &surface);
        assert!(id.is_none());
        assert!(crowd.is_empty());
    }

    #[test]
    fn spawn_on_empty_surface_returns_none() {
        let mut crowd = Crowd::new(42);
        assert!(crowd.add_agent(Vec3::ZERO, AgentParams::default(), None, &NavSurface::empty()).is_none());
    }

    #[test]
    fn stale_handle_is_an_error_not_a_panic() {
        let surface = helpers::floor(4.0);
        let mut crowd = Crowd::new(42);
        let ghost = AgentId(99);
        assert!(matches!(crowd.position(ghost), Err(CrowdError::AgentNotFound(_))));
        assert!(matches!(crowd.reset_move_target(ghost), Err(CrowdError::AgentNotFound(_))));
        let target = helpers::snap(&surface, 1.0, 1.0);
        assert!(crowd.request_move_target(ghost, target, &surface).is_err());
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod movement {
    use mg_core::Vec3;

    use super::helpers;
    use crate::{Crowd, ParamsUpdate};

    #[test]
    fn walks_to_the_requested_target() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();

        let target = helpers::snap(&surface, 8.0, 8.0);
        let length = crowd.request_move_target(id, target, &surface).unwrap();
        assert!(length > 10.0, "manhattan route should be ~15 m, got {length}");
        assert!(crowd.state(id).unwrap().is_moving());

        helpers::run(&mut crowd, &surface, 15.0);

        let pos = crowd.position(id).unwrap();
        assert!(
            pos.horizontal_distance(target.position) < 0.2,
            "agent stopped {} m short",
            pos.horizontal_distance(target.position)
        );
        assert!(!crowd.state(id).unwrap().is_moving(), "path should be finished");
    }

    #[test]
    fn reset_move_target_stops_dead() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();

        helpers::run(&mut crowd, &surface, 1.0);
        assert!(crowd.velocity(id).unwrap().length() > 0.5, "should be underway");

        crowd.reset_move_target(id).unwrap();
        assert_eq!(crowd.velocity(id).unwrap(), Vec3::ZERO);
        assert!(!crowd.state(id).unwrap().is_moving());

        let before = crowd.position(id).unwrap();
        helpers::run(&mut crowd, &surface, 0.5);
        let after = crowd.position(id).unwrap();
        assert!(before.horizontal_distance(after) < 1e-3, "agent crept after reset");
    }

    #[test]
    fn zero_speed_ceiling_pins_the_agent() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();
        crowd.update_parameters(id, ParamsUpdate::speed(0.0)).unwrap();

        helpers::run(&mut crowd, &surface, 1.0);
        let pos = crowd.position(id).unwrap();
        assert!(pos.horizontal_distance(Vec3::new(0.5, 0.0, 0.5)) < 0.05);
    }

    #[test]
    fn heading_tracks_movement_direction() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        // Straight +X leg.
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();
        helpers::run(&mut crowd, &surface, 1.0);

        let heading = crowd.heading(id).unwrap();
        let expected = Vec3::new(1.0, 0.0, 0.0).yaw().unwrap();
        assert!((heading - expected).abs() < 0.2, "heading {heading} vs {expected}");
    }

    #[test]
    fn teleport_clears_the_active_path() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 8.0);
        crowd.request_move_target(id, target, &surface).unwrap();

        crowd.teleport(id, Vec3::new(5.0, 0.0, 5.0), &surface).unwrap();
        assert!(!crowd.state(id).unwrap().is_moving());
        assert_eq!(crowd.position(id).unwrap(), Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(crowd.interpolated_position(id).unwrap(), Vec3::new(5.0, 0.0, 5.0));
    }
}

// ── Local avoidance ───────────────────────────────────────────────────────────

#[cfg(test)]
mod separation {
    use mg_core::Vec3;

    use super::helpers;
    use crate::{AgentParams, Crowd};

    #[test]
    fn close_agents_push_apart() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let a = crowd.add_agent(Vec3::new(5.0, 0.0, 5.0), AgentParams::default(), None, &surface).unwrap();
        let b = crowd.add_agent(Vec3::new(5.3, 0.0, 5.0), AgentParams::default(), None, &surface).unwrap();

        helpers::run(&mut crowd, &surface, 2.0);

        let d = crowd.position(a).unwrap().horizontal_distance(crowd.position(b).unwrap());
        assert!(d > 0.6, "agents remained overlapped: {d} m apart");
    }

    #[test]
    fn coincident_agents_resolve_deterministically() {
        let surface = helpers::floor(10.0);

        let run_once = || {
            let mut crowd = Crowd::new(7);
            let a = crowd.add_agent(Vec3::new(5.0, 0.0, 5.0), AgentParams::default(), None, &surface).unwrap();
            let b = crowd.add_agent(Vec3::new(5.0, 0.0, 5.0), AgentParams::default(), None, &surface).unwrap();
            helpers::run(&mut crowd, &surface, 1.0);
            (crowd.position(a).unwrap(), crowd.position(b).unwrap())
        };

        let (a1, b1) = run_once();
        let (a2, b2) = run_once();
        assert!(a1.horizontal_distance(b1) > 0.2, "tie never broke");
        assert_eq!(a1, a2, "same seed must replay identically");
        assert_eq!(b1, b2);
    }

    #[test]
    fn zero_weight_disables_avoidance() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let params = AgentParams { separation_weight: 0.0, ..AgentParams::default() };
        let a = crowd.add_agent(Vec3::new(5.0, 0.0, 5.0), params, None, &surface).unwrap();
        let b = crowd.add_agent(Vec3::new(5.2, 0.0, 5.0), params, None, &surface).unwrap();

        helpers::run(&mut crowd, &surface, 1.0);
        let d = crowd.position(a).unwrap().horizontal_distance(crowd.position(b).unwrap());
        assert!(d < 0.3, "agents moved without any steering input: {d}");
    }
}

// ── Substeps & interpolation ──────────────────────────────────────────────────

#[cfg(test)]
mod stepping {
    use mg_core::Vec3;

    use super::helpers;
    use crate::Crowd;

    #[test]
    fn interpolated_position_lies_between_substeps() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();

        // Advance by 1.5 substeps: the leftover half-step should show up as
        // interpolation, not as a teleport.
        crowd.advance(1.5 / 60.0, &surface);
        let smooth = crowd.interpolated_position(id).unwrap();
        let state = crowd.state(id).unwrap();
        let expected = state.prev_position.lerp(state.position, 0.5);
        assert!(
            (smooth - expected).length() < 1e-5,
            "interpolated {smooth} but halfway point is {expected}"
        );
    }

    #[test]
    fn custom_stepping_is_respected() {
        let surface = helpers::floor(10.0);
        // 30 Hz substeps, at most 2 per frame.
        let mut crowd = Crowd::new(42).with_stepping(1.0 / 30.0, 2);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();

        for _ in 0..300 {
            crowd.advance(1.0 / 30.0, &surface);
        }
        let pos = crowd.position(id).unwrap();
        assert!(
            pos.horizontal_distance(target.position) < 0.2,
            "coarse stepping still reaches the target, stopped {} m short",
            pos.horizontal_distance(target.position)
        );
    }

    #[test]
    fn giant_frame_deltas_are_clamped() {
        let surface = helpers::floor(10.0);
        let mut crowd = Crowd::new(42);
        let id = crowd.add_agent(Vec3::new(0.5, 0.0, 0.5), helpers::walker(), None, &surface).unwrap();
        let target = helpers::snap(&surface, 8.0, 0.5);
        crowd.request_move_target(id, target, &surface).unwrap();

        // A 10-second stall (tab switch) must not integrate 10 s of motion.
        crowd.advance(10.0, &surface);
        let pos = crowd.position(id).unwrap();
        assert!(
            pos.horizontal_distance(Vec3::new(0.5, 0.0, 0.5)) < 1.0,
            "stall frame integrated too far"
        );
    }
}
