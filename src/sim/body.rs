//! Simulated rigid bodies
//!
//! A body owns its convex shape, mass, kinematic state, and a domain tag the
//! game-rules layer uses to special-case entities. Removal is a tombstone:
//! a removed body stops participating in forces and collisions but stays
//! allocated until the owning scene sweeps it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::polygon::Polygon;

/// Body mass: a positive real, or immovable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mass {
    Finite(f32),
    /// Never integrated; acts as a static anchor (ground, walls, platforms)
    Infinite,
}

impl Mass {
    /// Finite mass. Panics unless `m` is a positive real.
    pub fn finite(m: f32) -> Self {
        assert!(m > 0.0 && m.is_finite(), "mass must be a positive real");
        Mass::Finite(m)
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        matches!(self, Mass::Infinite)
    }

    /// Mass value; `f32::INFINITY` for immovable bodies
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Mass::Finite(m) => m,
            Mass::Infinite => f32::INFINITY,
        }
    }

    /// Inverse mass; zero for immovable bodies
    #[inline]
    pub fn inverse(self) -> f32 {
        match self {
            Mass::Finite(m) => 1.0 / m,
            Mass::Infinite => 0.0,
        }
    }
}

/// Domain role of a body, inspected by game-rules layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tag {
    #[default]
    None,
    Player(u8),
    Projectile,
    Platform,
    Powerup,
    /// Off-screen mass used to source newtonian gravity
    Anchor,
}

/// Cosmetic color, irrelevant to physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A simulated rigid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    shape: Polygon,
    /// Cached position reference point, kept in sync with the shape
    centroid: Vec2,
    velocity: Vec2,
    /// Force accumulator, consumed and cleared by integration
    force: Vec2,
    mass: Mass,
    color: Rgb,
    tag: Tag,
    removed: bool,
}

impl Body {
    pub fn new(shape: Polygon, mass: Mass, color: Rgb) -> Self {
        Self::with_tag(shape, mass, color, Tag::None)
    }

    pub fn with_tag(shape: Polygon, mass: Mass, color: Rgb, tag: Tag) -> Self {
        let centroid = shape.centroid();
        Self {
            shape,
            centroid,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass,
            color,
            tag,
            removed: false,
        }
    }

    #[inline]
    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    #[inline]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Teleport: moves the shape so its centroid lands on `centroid`,
    /// independent of velocity integration
    pub fn set_centroid(&mut self, centroid: Vec2) {
        let delta = centroid - self.centroid;
        self.translate(delta);
    }

    /// Move the body by `delta`, keeping shape and cached centroid in sync
    pub fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
        self.centroid += delta;
    }

    /// Rotate the body's shape around its centroid
    pub fn rotate(&mut self, angle: f32) {
        self.shape.rotate_about(angle, self.centroid);
    }

    /// Accumulated force for this tick
    #[inline]
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Overwrite the accumulated force; last write wins until integration
    pub fn set_force(&mut self, force: Vec2) {
        self.force = force;
    }

    /// Accumulate into the force accumulator; velocity is unaffected until
    /// the next integration step
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Semi-implicit Euler step. Immovable bodies are never moved; their
    /// accumulator is still consumed so stale forces cannot pile up.
    pub(crate) fn integrate(&mut self, dt: f32) {
        let inv_mass = self.mass.inverse();
        if inv_mass > 0.0 {
            self.velocity += self.force * inv_mass * dt;
            self.translate(self.velocity * dt);
        }
        self.force = Vec2::ZERO;
    }
}
