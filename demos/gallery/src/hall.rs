//! Synthetic exhibition hall: floor grid, pillar obstacles, hung frames.
//!
//! A 16 × 10 m hall sampled every 0.5 m, with two structural pillars the
//! surface routes around and four frames along the long walls.

use mg_core::{NodeId, Vec3};
use mg_nav::{Aabb, AabbObstacleSet, NavSurface, NavSurfaceBuilder};
use mg_tour::{Exhibit, ExhibitCatalog};

pub const HALL_LENGTH_M: f32 = 16.0;
pub const HALL_WIDTH_M: f32 = 10.0;
const SPACING: f32 = 0.5;

// Walkable samples are dropped within this distance of a pillar so paths
// keep agent bodies clear of the stone.
const PILLAR_CLEARANCE_M: f32 = 0.45;

/// The two structural pillars, 0.8 m square, full height.
pub fn pillars() -> Vec<Aabb> {
    [Vec3::new(5.0, 1.5, 5.0), Vec3::new(11.0, 1.5, 5.0)]
        .into_iter()
        .map(|center| Aabb::from_center(center, Vec3::new(0.8, 3.0, 0.8)))
        .collect()
}

/// Build the walkable surface, skipping samples inside pillar footprints.
pub fn build_surface() -> NavSurface {
    let pillars = pillars();
    let blocked = |p: Vec3| {
        pillars.iter().any(|b| {
            p.x > b.min.x - PILLAR_CLEARANCE_M
                && p.x < b.max.x + PILLAR_CLEARANCE_M
                && p.z > b.min.z - PILLAR_CLEARANCE_M
                && p.z < b.max.z + PILLAR_CLEARANCE_M
        })
    };

    let nx = (HALL_LENGTH_M / SPACING) as i32 + 1;
    let nz = (HALL_WIDTH_M / SPACING) as i32 + 1;
    let mut builder = NavSurfaceBuilder::with_capacity((nx * nz) as usize, (nx * nz * 4) as usize);

    let mut ids: Vec<Option<NodeId>> = Vec::with_capacity((nx * nz) as usize);
    for ix in 0..nx {
        for iz in 0..nz {
            let pos = Vec3::new(ix as f32 * SPACING, 0.0, iz as f32 * SPACING);
            ids.push(if blocked(pos) { None } else { Some(builder.add_node(pos)) });
        }
    }

    let at = |ix: i32, iz: i32| ids[(ix * nz + iz) as usize];
    for ix in 0..nx {
        for iz in 0..nz {
            let Some(here) = at(ix, iz) else { continue };
            if ix + 1 < nx && let Some(east) = at(ix + 1, iz) {
                builder.link(here, east);
            }
            if iz + 1 < nz && let Some(north) = at(ix, iz + 1) {
                builder.link(here, north);
            }
        }
    }
    builder.build()
}

pub fn build_obstacles() -> AabbObstacleSet {
    AabbObstacleSet::new(pillars())
}

/// Four frames: three on the south wall (z = 0), one on the north.
pub fn build_catalog() -> ExhibitCatalog {
    let mut catalog = ExhibitCatalog::new();

    let mut south = |name: &str, x: f32| {
        catalog.add(Exhibit {
            name: name.to_owned(),
            stand_target: Vec3::new(x, 0.0, 1.2),
            center: Vec3::new(x, 1.5, 0.0),
            normal: Vec3::new(0.0, 0.0, 1.0),
        })
    };
    south("water_lilies", 3.0);
    south("starry_night", 8.0);
    south("the_scream", 13.0);

    catalog.add(Exhibit {
        name: "guernica".to_owned(),
        stand_target: Vec3::new(8.0, 0.0, HALL_WIDTH_M - 1.2),
        center: Vec3::new(8.0, 1.5, HALL_WIDTH_M),
        normal: Vec3::new(0.0, 0.0, -1.0),
    });

    catalog
}
