//! Deterministic physics core
//!
//! All simulation state lives here. This module must be pure and deterministic:
//! - A tick is a pure function of current state and `dt`
//! - Single-threaded, no blocking, no suspension points
//! - Stable body addressing for the whole frame (tombstone now, sweep later)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod forces;
pub mod polygon;
pub mod scene;

pub use body::{Body, Mass, Rgb, Tag};
pub use collision::{Hit, find_collision};
pub use forces::ForceCreator;
pub use polygon::{Polygon, ShapeError};
pub use scene::{BodyHandle, Scene, SimEvent};
