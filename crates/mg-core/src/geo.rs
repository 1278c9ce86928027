//! World-space vector type and horizontal-plane utilities.
//!
//! `Vec3` uses `f32` components — matching the precision of navigation-mesh
//! data and GPU-facing transforms.  Y is up.
//!
//! # Yaw convention
//!
//! A heading is stored as a single yaw angle (radians about +Y), derived from
//! a horizontal direction as `atan2(dir.x, dir.z)`.  Yaw 0 faces +Z.  All
//! arrival/facing logic in the tour core works in this convention; converting
//! to a quaternion is the presentation layer's job.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A world-space position or direction with `f32` components.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Unit-length copy, or `None` for a (near-)zero vector.
    ///
    /// The cutoff is `1e-6` on the squared length — below that, a direction
    /// is meaningless and callers must substitute their own default.
    pub fn normalized(self) -> Option<Vec3> {
        let len_sq = self.length_sq();
        if len_sq < 1e-6 {
            return None;
        }
        let inv = 1.0 / len_sq.sqrt();
        Some(self * inv)
    }

    /// Copy with `y` zeroed — projects onto the walkable plane.
    #[inline]
    pub fn flattened(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Horizontal (XZ-plane) distance, ignoring the vertical axis.
    ///
    /// Arrival checks use this so a navmesh anchor slightly above or below
    /// the agent's feet does not inflate the distance.
    #[inline]
    pub fn horizontal_distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Linear interpolation: `self` at `t = 0`, `other` at `t = 1`.
    #[inline]
    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }

    /// Yaw (radians about +Y) of this direction's horizontal projection.
    ///
    /// Returns `None` when the horizontal projection is degenerate.
    pub fn yaw(self) -> Option<f32> {
        let flat = self.flattened();
        if flat.length_sq() < 1e-6 {
            return None;
        }
        Some(flat.x.atan2(flat.z))
    }

    /// Unit forward vector for a yaw angle (inverse of [`Vec3::yaw`]).
    #[inline]
    pub fn from_yaw(yaw: f32) -> Vec3 {
        Vec3::new(yaw.sin(), 0.0, yaw.cos())
    }

    /// Rotate about the +Y axis by `angle` radians (counter-clockwise when
    /// viewed from above).
    pub fn rotated_y(self, angle: f32) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        Vec3::new(
            self.x * cos + self.z * sin,
            self.y,
            -self.x * sin + self.z * cos,
        )
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}
