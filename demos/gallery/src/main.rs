//! gallery — headless demo of the museum_guide tour core.
//!
//! A guide NPC tours four frames in a synthetic exhibition hall while a
//! companion avatar keeps station at its side and two visitors stroll the
//! floor.  The whole run is deterministic: fixed 60 Hz frames, seeded RNG,
//! no wall clock.

mod hall;

use anyhow::Result;
use tracing::info;

use mg_core::{AgentId, FrameClock, Seconds, Vec3, WorldRng};
use mg_crowd::{AgentParams, Crowd};
use mg_nav::NavigationPort;
use mg_present::PresentationSync;
use mg_tour::{FollowResolver, TourController, TourObserver, TourOptions, Waypoint};

use hall::{HALL_LENGTH_M, HALL_WIDTH_M};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED: u64 = 42;
const DT: f32 = 1.0 / 60.0;
const MAX_SIM_SECS: f64 = 120.0;
const STATUS_EVERY_SECS: f64 = 2.0;

// Guide locomotion, matching the hall's NPC rig.
const GUIDE_WALK: f32 = 2.6;
const GUIDE_RUN: f32 = 6.0;

// ── Narration stub ────────────────────────────────────────────────────────────

/// Stands in for the audio subsystem: reacts to tour events and asks for the
/// hold to match each "clip" length.  It cannot touch the controller from
/// inside a callback, so it queues the request for the frame loop to apply.
#[derive(Default)]
struct Narrator {
    pending_hold: Option<(AgentId, f64)>,
    prefetched: Vec<String>,
    played: Vec<String>,
    tours_finished: usize,
}

impl Narrator {
    /// Pretend clip length for an exhibit.
    fn clip_secs(name: &str) -> f64 {
        1.0 + name.len() as f64 * 0.08
    }
}

impl TourObserver for Narrator {
    fn on_approach(&mut self, _guide: AgentId, next: &Waypoint) {
        info!(exhibit = %next.exhibit, "prefetching narration");
        self.prefetched.push(next.exhibit.to_string());
    }

    fn on_arrival(&mut self, guide: AgentId, waypoint: &Waypoint) {
        let secs = Self::clip_secs(&waypoint.exhibit.to_string());
        info!(exhibit = %waypoint.exhibit, clip_secs = secs, "arrival — playing narration");
        self.played.push(waypoint.exhibit.to_string());
        self.pending_hold = Some((guide, secs));
    }

    fn on_tour_finished(&mut self, _guide: AgentId) {
        info!("tour finished");
        self.tours_finished += 1;
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== gallery — museum_guide tour demo ===");

    // 1. Scene: surface, obstacles, exhibits.
    let surface = hall::build_surface();
    let obstacles = hall::build_obstacles();
    let catalog = hall::build_catalog();
    println!(
        "Hall {HALL_LENGTH_M}×{HALL_WIDTH_M} m: {} walkable samples, {} links, {} pillars, {} frames",
        surface.node_count(),
        surface.link_count(),
        obstacles.len(),
        catalog.len(),
    );

    // 2. Crowd: guide, companion avatar, two visitors.
    let mut crowd = Crowd::new(SEED);

    let guide = crowd
        .add_agent(
            Vec3::new(2.0, 0.0, 8.0),
            AgentParams { radius: 0.35, separation_weight: 0.2, ..AgentParams::default() },
            None,
            &surface,
        )
        .expect("guide spawn is on the floor");

    let companion = crowd
        .add_agent(
            Vec3::new(1.0, 0.0, 8.5),
            AgentParams {
                radius: 0.25,
                height: 1.8,
                max_speed: 2.4,
                max_acceleration: 6.0,
                separation_weight: 0.05,
                ..AgentParams::default()
            },
            None,
            &surface,
        )
        .expect("companion spawn is on the floor");

    let visitors: Vec<AgentId> = (0..2)
        .filter_map(|i| {
            crowd.add_agent(
                Vec3::new(6.0 + i as f32 * 4.0, 0.0, 7.0),
                AgentParams { max_speed: 1.2, ..AgentParams::default() },
                None,
                &surface,
            )
        })
        .collect();

    // 3. Tour layer.
    let mut controller = TourController::new();
    controller.register_guide(guide, None, GUIDE_WALK, GUIDE_RUN);

    let route: Vec<_> = catalog.ids().collect();
    let mut narrator = Narrator::default();
    let mut resolver = FollowResolver::new();
    let mut presenter = PresentationSync::new();
    let mut stroll_rng = WorldRng::new(SEED ^ 0xbeef);

    let mut clock = FrameClock::new();
    let started = controller.start_tour(
        guide,
        &route,
        &catalog,
        clock.now(),
        TourOptions { hold_secs: 2.0, ..TourOptions::default() },
        &mut crowd,
        &surface,
    )?;
    println!("Tour started over {started} stops\n");

    // 4. Frame loop.
    let mut next_status: Seconds = 0.0;
    while clock.now() < MAX_SIM_SECS {
        clock.advance(DT);
        let now = clock.now();

        crowd.advance(DT, &surface);
        controller.advance_all(now, &mut crowd, &surface, &mut narrator);

        // Narration length arrived from the observer: stretch the hold.
        if let Some((agent, secs)) = narrator.pending_hold.take() {
            controller.set_hold(agent, secs);
        }

        // Companion keeps station beside the guide.
        if let Err(e) = resolver.resolve(
            companion,
            guide,
            controller.state(guide),
            now,
            &mut crowd,
            &surface,
            &obstacles,
        ) {
            tracing::warn!(error = %e, "follow resolution failed this frame");
        }

        // Visitors stroll to random floor points.
        for &visitor in &visitors {
            let idle = crowd.state(visitor).map(|s| !s.is_moving()).unwrap_or(false);
            if idle && stroll_rng.gen_bool(0.01) {
                let wander = Vec3::new(
                    stroll_rng.gen_range(1.0..HALL_LENGTH_M - 1.0),
                    0.0,
                    stroll_rng.gen_range(1.0..HALL_WIDTH_M - 1.0),
                );
                if let Ok(point) = surface.find_closest_point(wander) {
                    let _ = crowd.request_move_target(visitor, point, &surface);
                }
            }
        }

        // Presentation sampling (a renderer would consume these).
        let guide_shot = presenter.sample(guide, controller.state(guide), &crowd, now, DT);
        let _ = presenter.sample(companion, None, &crowd, now, DT);
        for &visitor in &visitors {
            let _ = presenter.sample(visitor, None, &crowd, now, DT);
        }

        if now >= next_status {
            next_status = now + STATUS_EVERY_SECS;
            if let (Some(shot), Some(state)) = (guide_shot, controller.state(guide)) {
                let progress = controller
                    .tour_progress(guide)
                    .map(|(i, n)| format!("{}/{n}", i + 1))
                    .unwrap_or_else(|| "done".into());
                println!(
                    "t={now:6.2}s  stop {progress}  mode={:?}  cue={:?}  guide={}  side={:?}",
                    state.mode,
                    shot.cue,
                    shot.pose.position,
                    resolver.preferred_side(),
                );
            }
        }

        if !controller.has_tour(guide) {
            break;
        }
    }

    // 5. Summary.
    println!("\n=== summary ===");
    println!("Simulated {:.1} s", clock.now());
    println!("Narrations played: {:?}", narrator.played);
    println!("Prefetched: {:?}", narrator.prefetched);
    println!("Tours finished: {}", narrator.tours_finished);
    let guide_pos = crowd.position(guide)?;
    let companion_pos = crowd.position(companion)?;
    println!("Guide ended at {guide_pos}, companion at {companion_pos}");
    anyhow::ensure!(narrator.tours_finished == 1, "tour did not complete in time");
    Ok(())
}
