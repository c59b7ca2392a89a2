//! Numeric mapping utilities
//!
//! Pure functions that map raw data coordinates into render space and
//! measure point distances relative to the camera.

use serde::{Deserialize, Serialize};

use crate::camera::{vec_dot, vec_length, vec_normalize, vec_sub};
use crate::types::Vec3;

/// The [min, max] range of a coordinate axis across a point set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True when every value sits at the same coordinate
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0
    }
}

/// Compute the extent of a sequence of values.
///
/// Non-finite values are skipped. An empty sequence yields the degenerate
/// extent `[0, 0]`.
pub fn extent<I>(values: I) -> Extent
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<Extent>, v| match acc {
            None => Some(Extent::new(v, v)),
            Some(e) => Some(Extent::new(e.min.min(v), e.max.max(v))),
        })
        .unwrap_or_default()
}

/// Affine map of `value` from `from` onto `to`.
///
/// Exact at both endpoints of `from`. A zero-width `from` maps every value to
/// the midpoint of `to`.
pub fn scale_linear(value: f64, from: Extent, to: [f64; 2]) -> f64 {
    if from.is_degenerate() {
        return (to[0] + to[1]) / 2.0;
    }
    let t = (value - from.min) / from.width();
    to[0] * (1.0 - t) + to[1] * t
}

/// Nearest and farthest point depth from the camera.
///
/// `positions` is packed xyz. Depth is measured along the unit view direction
/// (camera towards `target`), so points off the view axis report their
/// distance from the camera plane. Points behind the camera plane are
/// ignored. Returns `(0, 0)` when no point qualifies or the camera sits on
/// its target.
pub fn get_near_far_point_distances(positions: &[f32], camera_position: Vec3, target: Vec3) -> (f32, f32) {
    let to_target = vec_sub(target, camera_position);
    if vec_length(to_target) <= f32::EPSILON {
        return (0.0, 0.0);
    }
    let view = vec_normalize(to_target);

    let mut shortest = f32::INFINITY;
    let mut furthest = 0.0_f32;
    let mut seen = false;

    for point in positions.chunks_exact(3) {
        let to_point = vec_sub([point[0], point[1], point[2]], camera_position);
        let along_view = vec_dot(view, to_point);
        if along_view < 0.0 {
            continue;
        }
        shortest = shortest.min(along_view);
        furthest = furthest.max(along_view);
        seen = true;
    }

    if !seen {
        return (0.0, 0.0);
    }
    (shortest, furthest)
}
