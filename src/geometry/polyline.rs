//! Arc-length parameterization of a piecewise-linear 3D curve.

use crate::foundation::core::Vec3;
use crate::foundation::error::{InkfadeError, InkfadeResult};

/// Sum of Euclidean distances between consecutive points.
///
/// Returns `0.0` for fewer than two points.
pub fn total_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Map `t` in `[0, 1]` to a position by cumulative distance along the curve.
///
/// `t` outside the range is clamped. Zero-length segments never produce NaN: a target
/// that lands on one resolves to the segment's end point. Overshoot from float
/// accumulation resolves to the last point.
pub fn sample_at(points: &[Vec3], t: f32) -> Vec3 {
    match points {
        [] => return Vec3::ZERO,
        [only] => return *only,
        _ => {}
    }
    let last = points[points.len() - 1];
    let t = t.clamp(0.0, 1.0);
    if t <= 0.0 {
        return points[0];
    }
    if t >= 1.0 {
        return last;
    }

    let target = total_length(points) * t;
    let mut walked = 0.0f32;
    for w in points.windows(2) {
        let (p1, p2) = (w[0], w[1]);
        let seg = p1.distance(p2);
        if walked + seg >= target {
            if seg == 0.0 {
                return p2;
            }
            let local = ((target - walked) / seg).clamp(0.0, 1.0);
            return p1.lerp(p2, local);
        }
        walked += seg;
    }
    last
}

/// Immutable, validated snapshot of a stroke's points.
///
/// Capturing rejects everything a conversion cannot run on, so a `Polyline` always
/// has at least two points, only finite coordinates and a finite length.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<Vec3>,
    length: f32,
}

impl Polyline {
    /// Validate and freeze `points`.
    pub fn capture(points: impl Into<Vec<Vec3>>) -> InkfadeResult<Self> {
        let points = points.into();
        if points.len() < 2 {
            return Err(InkfadeError::invalid_input(format!(
                "polyline needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(InkfadeError::invalid_input(format!(
                "polyline point {i} has a non-finite coordinate"
            )));
        }
        let length = total_length(&points);
        if !length.is_finite() {
            return Err(InkfadeError::invalid_input(format!(
                "polyline length overflows f32 ({length})"
            )));
        }
        Ok(Self { points, length })
    }

    /// Captured points in stroke order.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of captured points (always >= 2).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total arc length.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Position at normalized arc-length parameter `t`.
    pub fn sample(&self, t: f32) -> Vec3 {
        sample_at(&self.points, t)
    }

    /// Leading `count` points (the revealed prefix), clamped to the point count.
    pub fn head(&self, count: usize) -> &[Vec3] {
        &self.points[..count.min(self.points.len())]
    }

    /// Trailing `count` points, clamped to the point count.
    pub fn tail(&self, count: usize) -> &[Vec3] {
        let n = self.points.len();
        &self.points[n - count.min(n)..]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/polyline.rs"]
mod tests;
