//! Polybox - a deterministic 2D convex-polygon physics engine for arcade games
//!
//! Core modules:
//! - `sim`: Bodies, separating-axis collision detection, force creators, and
//!   the `Scene` tick pipeline
//! - `config`: Data-driven engine tuning
//!
//! Rendering, input dispatch, audio, and score/round bookkeeping are external
//! collaborators: they drive the engine through `Scene` and read body state
//! back after each tick.

pub mod config;
pub mod sim;

pub use config::SimConfig;
pub use sim::{Body, BodyHandle, Hit, Mass, Polygon, Rgb, Scene, ShapeError, SimEvent, Tag};

use glam::Vec2;

/// Engine constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Centroid distance below which newtonian gravity is skipped rather than
    /// allowed to diverge
    pub const MIN_GRAVITY_DISTANCE: f32 = 1e-3;

    /// Squared edge length below which an edge contributes no collision axis
    /// (degenerate/collinear input)
    pub const DEGENERATE_EDGE_EPSILON: f32 = 1e-12;
}

/// Rotate a vector by `angle` radians about the origin
#[inline]
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
