//! Separating-axis collision detection for convex polygons
//!
//! Every edge of both polygons contributes one candidate axis (its outward
//! normal). If the vertex projections of the two polygons fail to overlap on
//! any axis, the polygons are disjoint and the test short-circuits. If every
//! axis overlaps, the axis with the smallest overlap is the axis of least
//! penetration, which is the physically meaningful direction for response.

use glam::Vec2;

use super::polygon::Polygon;
use crate::consts::DEGENERATE_EDGE_EPSILON;

/// A detected overlap between two convex polygons
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    /// Unit axis of least penetration, oriented from the first polygon
    /// toward the second
    pub axis: Vec2,
    /// Overlap length along `axis`
    pub overlap: f32,
}

/// Separating-axis test between two convex polygons.
///
/// Returns `None` as soon as any axis separates the two. Touching extents
/// count as a hit with zero overlap. Linear in total vertex count.
pub fn find_collision(a: &Polygon, b: &Polygon) -> Option<Hit> {
    let mut best_axis = Vec2::ZERO;
    let mut best_overlap = f32::INFINITY;

    for poly in [a, b] {
        let verts = poly.vertices();
        let n = verts.len();
        for i in 0..n {
            let edge = verts[(i + 1) % n] - verts[i];
            if edge.length_squared() <= DEGENERATE_EDGE_EPSILON {
                continue;
            }
            let axis = edge.perp().normalize();

            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            if max_a < min_b || max_b < min_a {
                return None;
            }

            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if overlap < best_overlap {
                best_overlap = overlap;
                best_axis = axis;
            }
        }
    }

    // Orient the axis from a toward b so responses can use it directly
    if best_axis.dot(b.centroid() - a.centroid()) < 0.0 {
        best_axis = -best_axis;
    }

    Some(Hit {
        axis: best_axis,
        overlap: best_overlap,
    })
}

/// Scalar interval a polygon occupies along `axis`
fn project(poly: &Polygon, axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in poly.vertices() {
        let d = v.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
