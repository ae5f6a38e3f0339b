//! Convex polygon geometry
//!
//! Shapes are ordered world-space vertex loops with consistent winding.
//! Construction validates the two things the engine cannot recover from:
//! fewer than three vertices, and zero enclosed area.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rotate_vec;

/// Rejected polygon input
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon encloses zero area")]
    ZeroArea,
}

/// A convex polygon as an ordered vertex loop in world space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Build a polygon from an ordered vertex loop.
    ///
    /// Fails with [`ShapeError`] on fewer than 3 vertices or a degenerate
    /// (zero-area) loop. Convexity and winding are the caller's contract.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        let poly = Self { vertices };
        if poly.signed_area().abs() <= f32::EPSILON {
            return Err(ShapeError::ZeroArea);
        }
        Ok(poly)
    }

    /// Axis-aligned rectangle centered on `center`.
    ///
    /// Panics on non-positive dimensions.
    pub fn rect(width: f32, height: f32, center: Vec2) -> Self {
        assert!(
            width > 0.0 && height > 0.0,
            "rectangle dimensions must be positive"
        );
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self {
            vertices: vec![
                center + Vec2::new(-hw, -hh),
                center + Vec2::new(hw, -hh),
                center + Vec2::new(hw, hh),
                center + Vec2::new(-hw, hh),
            ],
        }
    }

    /// Regular polygon inscribed in a circle of `radius` around `center`.
    /// High side counts approximate discs (pickups, boulders).
    ///
    /// Panics on fewer than 3 sides or a non-positive radius.
    pub fn regular(sides: usize, radius: f32, center: Vec2) -> Self {
        assert!(sides >= 3, "a polygon needs at least 3 sides");
        assert!(radius > 0.0, "radius must be positive");
        let step = std::f32::consts::TAU / sides as f32;
        let vertices = (0..sides)
            .map(|i| {
                let theta = i as f32 * step;
                center + Vec2::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect();
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Shoelace sum; sign encodes winding
    fn signed_area(&self) -> f32 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            sum += self.vertices[i].perp_dot(self.vertices[(i + 1) % n]);
        }
        sum / 2.0
    }

    /// Enclosed area
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        let mut acc = Vec2::ZERO;
        let mut area6 = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let cross = p.perp_dot(q);
            area6 += cross;
            acc += (p + q) * cross;
        }
        acc / (3.0 * area6)
    }

    /// Move every vertex by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    /// Rotate every vertex by `angle` radians around `pivot`
    pub fn rotate_about(&mut self, angle: f32, pivot: Vec2) {
        for v in &mut self.vertices {
            *v = rotate_vec(*v - pivot, angle) + pivot;
        }
    }

    /// Lowest vertical extent
    #[inline]
    pub fn min_y(&self) -> f32 {
        self.vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min)
    }

    /// Highest vertical extent
    #[inline]
    pub fn max_y(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.y)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
