// Copyright 2016-2018 Matthew D. Michelotti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Point and segment queries. Queries read collider geometry only and never
//! touch contact state.

use crate::core::gjk::{self, Placed, Segment};
use crate::core::{ColliderHandle, CollisionWorld, Filter, TransformSource, WorldConfig};
use crate::geom::{ConvexShape, Transform, Vec2};
use noisy_float::prelude::n64;

const SEGMENT_BISECTIONS: usize = 48;

/// Result of a point query against one shape.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PointInfo {
    /// The collider owning the shape.
    pub collider: ColliderHandle,
    /// Index of the shape within the collider.
    pub shape: usize,
    /// Closest point on the shape's boundary.
    pub point: Vec2,
    /// Distance to `point`, negative when the query point is inside the shape.
    pub distance: f64,
    /// Unit gradient of the signed distance: the outward surface normal at
    /// `point`. Zero when it cannot be determined.
    pub gradient: Vec2,
}

/// Result of a segment query against one shape.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SegmentInfo {
    /// The collider owning the shape.
    pub collider: ColliderHandle,
    /// Index of the shape within the collider.
    pub shape: usize,
    /// First point along the segment that touches the shape.
    pub point: Vec2,
    /// Unit surface normal at `point`, facing back along the segment.
    pub normal: Vec2,
    /// Fraction of the segment at which `point` lies.
    pub alpha: f64,
}

impl CollisionWorld {
    /// Finds every shape within `max_distance` of `point`, sorted by collider
    /// then shape index.
    ///
    /// Colliders rejected by `filter` or whose owner has no transform are ignored.
    pub fn query_point<T>(&self, point: Vec2, max_distance: f64, filter: Filter, transforms: &T) -> Vec<PointInfo>
    where
        T: TransformSource + ?Sized,
    {
        let config = *self.config();
        let mut result = Vec::new();
        self.for_each_shape(filter, transforms, |collider, shape, attached, transform| {
            let (surface, distance, gradient) = point_query(&config, attached, &transform, point);
            if distance <= max_distance {
                result.push(PointInfo { collider, shape, point: surface, distance, gradient });
            }
        });
        result
    }

    /// The shape nearest to `point` within `max_distance`, if any.
    pub fn query_point_nearest<T>(&self, point: Vec2, max_distance: f64, filter: Filter, transforms: &T) -> Option<PointInfo>
    where
        T: TransformSource + ?Sized,
    {
        self.query_point(point, max_distance, filter, transforms)
            .into_iter()
            .min_by_key(|info| n64(info.distance))
    }

    /// Finds every shape the segment from `start` to `end` touches, sorted by `alpha`.
    pub fn query_segment<T>(&self, start: Vec2, end: Vec2, filter: Filter, transforms: &T) -> Vec<SegmentInfo>
    where
        T: TransformSource + ?Sized,
    {
        let config = *self.config();
        let mut result = Vec::new();
        self.for_each_shape(filter, transforms, |collider, shape, attached, transform| {
            if let Some((point, normal, alpha)) = segment_query(&config, attached, &transform, start, end) {
                result.push(SegmentInfo { collider, shape, point, normal, alpha });
            }
        });
        result.sort_by_key(|info| (n64(info.alpha), info.collider, info.shape));
        result
    }

    /// The first shape the segment from `start` to `end` touches, if any.
    pub fn query_segment_first<T>(&self, start: Vec2, end: Vec2, filter: Filter, transforms: &T) -> Option<SegmentInfo>
    where
        T: TransformSource + ?Sized,
    {
        self.query_segment(start, end, filter, transforms).into_iter().next()
    }

    fn for_each_shape<T, F>(&self, filter: Filter, transforms: &T, mut f: F)
    where
        T: TransformSource + ?Sized,
        F: FnMut(ColliderHandle, usize, &ConvexShape, Transform),
    {
        for (handle, collider) in self.colliders() {
            if filter.rejects(&collider.filter()) {
                continue;
            }
            let owner_transform = match transforms.world_transform(collider.owner()) {
                Some(transform) => transform,
                None => continue,
            };
            for (index, attached) in collider.shapes().iter().enumerate() {
                f(handle, index, &attached.shape, attached.world_transform(&owner_transform));
            }
        }
    }
}

// Returns the closest surface point, the signed distance and its gradient.
fn point_query(config: &WorldConfig, shape: &ConvexShape, transform: &Transform, point: Vec2) -> (Vec2, f64, Vec2) {
    let placed = Placed::new(shape, transform);
    if let Some(simplex) = gjk::gjk_overlap(&placed, &point, config.gjk_max_iterations) {
        // inside: the boundary point of (shape - point) nearest the origin is surface - point
        let depth = gjk::epa(&simplex, &placed, &point, config.epa_tolerance, config.epa_max_iterations);
        (point + depth, -depth.len(), unit_or_zero(depth))
    } else if let Some((surface, _)) = gjk::gjk_closest(&placed, &point) {
        let offset = point - surface;
        (surface, offset.len(), unit_or_zero(offset))
    } else {
        (point, 0.0, Vec2::zero())
    }
}

fn unit_or_zero(vector: Vec2) -> Vec2 {
    if vector.is_zero() {
        Vec2::zero()
    } else {
        vector.normalize()
    }
}

// Bisects for the shortest prefix of the segment that still touches the shape.
fn segment_query(
    config: &WorldConfig,
    shape: &ConvexShape,
    transform: &Transform,
    start: Vec2,
    end: Vec2,
) -> Option<(Vec2, Vec2, f64)> {
    let placed = Placed::new(shape, transform);
    let hits = |alpha: f64| {
        let prefix = Segment { start, end: start.lerp(end, alpha) };
        gjk::gjk_overlap(&placed, &prefix, config.gjk_max_iterations).is_some()
    };
    if !hits(1.0) {
        return None;
    }
    let fallback = unit_or_zero(start - end);

    if gjk::gjk_overlap(&placed, &start, config.gjk_max_iterations).is_some() {
        let (_, _, gradient) = point_query(config, shape, transform, start);
        let normal = if gradient.is_zero() { fallback } else { gradient };
        return Some((start, normal, 0.0));
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    for _ in 0..SEGMENT_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if hits(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let outside = start.lerp(end, lo);
    let normal = match gjk::gjk_closest(&placed, &outside) {
        Some((surface, _)) if surface != outside => unit_or_zero(outside - surface),
        _ => fallback,
    };
    Some((start.lerp(end, hi), normal, hi))
}
