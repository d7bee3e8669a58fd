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

//! Narrow phase: GJK overlap and distance tests, and an EPA penetration
//! estimate, all driven purely by support mappings.
//!
//! Two convex shapes overlap iff their Minkowski difference `A - B` contains
//! the origin. GJK searches for a triangle of difference points enclosing the
//! origin; EPA then grows that triangle outward to find the boundary point of
//! the difference nearest the origin, which is the minimum translation that
//! separates the shapes.

use crate::core::WorldConfig;
use crate::geom::{v2, ConvexShape, Transform, Vec2};
use noisy_float::prelude::n64;
use tracing::debug;

/// Default cap on GJK refinement iterations.
pub const GJK_MAX_ITERATIONS: usize = 16;

/// Default minimum improvement for EPA to keep expanding.
pub const EPA_TOLERANCE: f64 = 0.001;

/// Default cap on points added by EPA.
pub const EPA_MAX_ITERATIONS: usize = 64;

const CLOSEST_MAX_ITERATIONS: usize = 64;
const CLOSEST_REL_TOLERANCE: f64 = 1e-10;

/// A convex set described by its support mapping.
pub trait Support {
    /// Returns the point of the set furthest along `direction`.
    fn support(&self, direction: Vec2) -> Vec2;

    /// Returns a point inside the set, used to seed the search direction.
    fn center(&self) -> Vec2;
}

/// A shape placed in world space.
#[derive(Copy, Clone, Debug)]
pub struct Placed<'a> {
    /// The shape.
    pub shape: &'a ConvexShape,
    /// Its world transform.
    pub transform: &'a Transform,
}

impl<'a> Placed<'a> {
    /// Constructs a new `Placed`.
    pub fn new(shape: &'a ConvexShape, transform: &'a Transform) -> Placed<'a> {
        Placed { shape, transform }
    }
}

impl Support for Placed<'_> {
    fn support(&self, direction: Vec2) -> Vec2 {
        self.shape.furthest_vertex(direction, self.transform)
    }

    fn center(&self) -> Vec2 {
        self.transform.position
    }
}

/// A line segment in world space.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Segment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
}

impl Support for Segment {
    fn support(&self, direction: Vec2) -> Vec2 {
        if self.end.dot(direction) > self.start.dot(direction) {
            self.end
        } else {
            self.start
        }
    }

    fn center(&self) -> Vec2 {
        self.start.lerp(self.end, 0.5)
    }
}

impl Support for Vec2 {
    fn support(&self, _direction: Vec2) -> Vec2 {
        *self
    }

    fn center(&self) -> Vec2 {
        *self
    }
}

/// Three Minkowski-difference points whose triangle encloses the origin,
/// witnessing that two shapes overlap.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Simplex {
    points: [Vec2; 3],
}

impl Simplex {
    /// Returns the triangle's vertices, in points of `A - B`.
    pub fn points(&self) -> [Vec2; 3] {
        self.points
    }
}

#[derive(Copy, Clone, Debug)]
struct SupportPoint {
    diff: Vec2,
    on_a: Vec2,
    on_b: Vec2,
}

struct MinkowskiDiff<'a, A: ?Sized, B: ?Sized> {
    a: &'a A,
    b: &'a B,
}

impl<A: Support + ?Sized, B: Support + ?Sized> MinkowskiDiff<'_, A, B> {
    fn support(&self, direction: Vec2) -> Vec2 {
        self.support_point(direction).diff
    }

    fn support_point(&self, direction: Vec2) -> SupportPoint {
        let on_a = self.a.support(direction);
        let on_b = self.b.support(-direction);
        SupportPoint { diff: on_a - on_b, on_a, on_b }
    }

    fn seed_direction(&self) -> Vec2 {
        let direction = self.a.center() - self.b.center();
        if direction.is_zero() {
            v2(1.0, 0.0)
        } else {
            direction
        }
    }
}

/// Tests two placed shapes for overlap with the default iteration cap
/// (`GJK_MAX_ITERATIONS`). See [`overlaps_with`] for a configured cap.
///
/// Returns an origin-enclosing simplex when they overlap. Touching shapes
/// usually count as overlapping; near-tangent smooth shapes that fail to
/// resolve within the cap are reported as not overlapping.
pub fn overlaps(
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Option<Simplex> {
    overlaps_with(&WorldConfig::default(), shape_a, transform_a, shape_b, transform_b)
}

/// `overlaps` with the iteration cap taken from `config`.
pub fn overlaps_with(
    config: &WorldConfig,
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Option<Simplex> {
    gjk_overlap(
        &Placed::new(shape_a, transform_a),
        &Placed::new(shape_b, transform_b),
        config.gjk_max_iterations,
    )
}

/// Estimates the minimum translation separating two overlapping shapes, given
/// the simplex returned by [`overlaps`]. Uses the default tolerance and cap
/// (`EPA_TOLERANCE`, `EPA_MAX_ITERATIONS`); see [`penetration_with`].
///
/// Moving `shape_b` by the returned vector (or `shape_a` by its negation)
/// leaves the two shapes just touching.
pub fn penetration(
    simplex: &Simplex,
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Vec2 {
    penetration_with(&WorldConfig::default(), simplex, shape_a, transform_a, shape_b, transform_b)
}

/// `penetration` with the tolerance and cap taken from `config`.
pub fn penetration_with(
    config: &WorldConfig,
    simplex: &Simplex,
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Vec2 {
    epa(
        simplex,
        &Placed::new(shape_a, transform_a),
        &Placed::new(shape_b, transform_b),
        config.epa_tolerance,
        config.epa_max_iterations,
    )
}

/// Returns the closest pair of points `(on_a, on_b)` between two disjoint
/// shapes, or `None` if they overlap or touch.
pub fn closest_points(
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> Option<(Vec2, Vec2)> {
    gjk_closest(
        &Placed::new(shape_a, transform_a),
        &Placed::new(shape_b, transform_b),
    )
}

/// Returns the distance between two shapes, or zero when they overlap or touch.
pub fn distance(
    shape_a: &ConvexShape,
    transform_a: &Transform,
    shape_b: &ConvexShape,
    transform_b: &Transform,
) -> f64 {
    closest_points(shape_a, transform_a, shape_b, transform_b)
        .map_or(0.0, |(on_a, on_b)| on_a.dist(on_b))
}

/// GJK overlap test over arbitrary support mappings.
pub fn gjk_overlap<A, B>(a: &A, b: &B, max_iterations: usize) -> Option<Simplex>
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    let diff = MinkowskiDiff { a, b };
    let seed = diff.seed_direction();
    let first = diff.support(seed);
    let direction = if first.is_zero() { -seed } else { -first };
    let second = diff.support(direction);
    if second.dot(direction) < 0.0 {
        return None;
    }

    let mut edge = [first, second];
    for _ in 0..max_iterations {
        let direction = normal_towards_origin(edge[0], edge[1])?;
        let previous = edge[1].dot(direction);
        let next = diff.support(direction);
        let progress = next.dot(direction);
        if progress <= previous || progress < 0.0 {
            return None;
        }
        let triangle = [edge[0], edge[1], next];
        if encloses_origin(&triangle) {
            return Some(Simplex { points: triangle });
        }
        edge = edge_facing_origin(&triangle);
    }
    debug!(max_iterations, "GJK did not resolve, reporting no overlap");
    None
}

// Normal of the segment `a`-`b`, oriented so the origin is on its positive side.
fn normal_towards_origin(a: Vec2, b: Vec2) -> Option<Vec2> {
    let normal = (b - a).perp();
    if normal.is_zero() {
        return None;
    }
    if normal.dot(-a) < 0.0 {
        Some(-normal)
    } else {
        Some(normal)
    }
}

// Three half-plane tests; the origin may lie on the boundary.
fn encloses_origin(triangle: &[Vec2; 3]) -> bool {
    let [a, b, c] = *triangle;
    if (b - a).cross(c - a) == 0.0 {
        return false;
    }
    let ab = (b - a).cross(-a);
    let bc = (c - b).cross(-b);
    let ca = (a - c).cross(-c);
    (ab >= 0.0 && bc >= 0.0 && ca >= 0.0) || (ab <= 0.0 && bc <= 0.0 && ca <= 0.0)
}

// The newest point is triangle[2]. The origin lies outside one of the two edges
// through it; keep that edge, newest point last.
fn edge_facing_origin(triangle: &[Vec2; 3]) -> [Vec2; 2] {
    let [a, b, c] = *triangle;
    let origin_side = (a - c).cross(-c);
    let b_side = (a - c).cross(b - c);
    if origin_side * b_side < 0.0 {
        [a, c]
    } else {
        [b, c]
    }
}

/// Expanding Polytope Algorithm over arbitrary support mappings.
///
/// Grows the polytope until the support along the nearest edge's normal no
/// longer improves on that edge by more than `tolerance`, or until
/// `max_iterations` points were added, in which case the best edge so far is
/// used. A degenerate simplex yields the zero vector.
pub fn epa<A, B>(simplex: &Simplex, a: &A, b: &B, tolerance: f64, max_iterations: usize) -> Vec2
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    let diff = MinkowskiDiff { a, b };
    let mut polytope = simplex.points.to_vec();
    let [p0, p1, p2] = simplex.points;
    let area = (p1 - p0).cross(p2 - p0);
    if area == 0.0 {
        return Vec2::zero();
    }
    if area < 0.0 {
        polytope.reverse();
    }

    for _ in 0..max_iterations {
        let (index, normal, distance) = match closest_edge(&polytope) {
            Some(edge) => edge,
            None => return Vec2::zero(),
        };
        let point = diff.support(normal);
        if point.dot(normal) - distance <= tolerance {
            return normal * distance;
        }
        polytope.insert(index + 1, point);
    }
    debug!(max_iterations, "EPA hit its iteration cap, using best edge");
    closest_edge(&polytope).map_or(Vec2::zero(), |(_, normal, distance)| normal * distance)
}

// For a counter-clockwise polytope, returns the index of the edge nearest the
// origin, its outward unit normal and its distance from the origin.
fn closest_edge(polytope: &[Vec2]) -> Option<(usize, Vec2, f64)> {
    let count = polytope.len();
    (0..count)
        .filter_map(|i| {
            let start = polytope[i];
            let edge = polytope[(i + 1) % count] - start;
            if edge.is_zero() {
                return None;
            }
            let normal = v2(edge.y, -edge.x).normalize();
            Some((i, normal, normal.dot(start)))
        })
        .min_by_key(|&(_, _, distance)| n64(distance))
}

/// GJK distance query over arbitrary support mappings.
///
/// Returns the closest points `(on_a, on_b)` of two disjoint sets, or `None`
/// when the sets overlap or touch.
pub fn gjk_closest<A, B>(a: &A, b: &B) -> Option<(Vec2, Vec2)>
where
    A: Support + ?Sized,
    B: Support + ?Sized,
{
    let diff = MinkowskiDiff { a, b };
    let mut simplex = vec![diff.support_point(diff.seed_direction())];
    let mut closest = Closest::vertex(simplex[0]);

    for _ in 0..CLOSEST_MAX_ITERATIONS {
        let point = closest.point();
        let dist_sq = point.len_sq();
        if dist_sq == 0.0 {
            return None;
        }
        let next = diff.support_point(-point);
        if dist_sq - point.dot(next.diff) <= CLOSEST_REL_TOLERANCE * dist_sq
            || simplex.iter().any(|existing| existing.diff == next.diff)
        {
            break;
        }
        simplex.push(next);
        closest = reduce(&mut simplex)?;
    }
    Some(closest.witnesses())
}

// Closest point of the current simplex feature to the origin, as a convex
// combination of at most two support points.
#[derive(Copy, Clone)]
struct Closest {
    first: SupportPoint,
    second: SupportPoint,
    weight: f64,
}

impl Closest {
    fn vertex(point: SupportPoint) -> Closest {
        Closest { first: point, second: point, weight: 0.0 }
    }

    fn segment(first: SupportPoint, second: SupportPoint) -> Closest {
        let edge = second.diff - first.diff;
        let len_sq = edge.len_sq();
        let weight = if len_sq == 0.0 {
            0.0
        } else {
            (-first.diff.dot(edge) / len_sq).max(0.0).min(1.0)
        };
        Closest { first, second, weight }
    }

    fn point(&self) -> Vec2 {
        self.first.diff.lerp(self.second.diff, self.weight)
    }

    fn witnesses(&self) -> (Vec2, Vec2) {
        (
            self.first.on_a.lerp(self.second.on_a, self.weight),
            self.first.on_b.lerp(self.second.on_b, self.weight),
        )
    }
}

// Shrinks `simplex` to the feature nearest the origin. Returns `None` when
// a triangle encloses the origin.
fn reduce(simplex: &mut Vec<SupportPoint>) -> Option<Closest> {
    match simplex.len() {
        2 => {
            let closest = Closest::segment(simplex[0], simplex[1]);
            keep_feature(simplex, &closest);
            Some(closest)
        }
        3 => {
            let triangle = [simplex[0].diff, simplex[1].diff, simplex[2].diff];
            if encloses_origin(&triangle) {
                return None;
            }
            let closest = [(0, 1), (1, 2), (2, 0)]
                .iter()
                .map(|&(i, j)| Closest::segment(simplex[i], simplex[j]))
                .min_by_key(|closest| n64(closest.point().len_sq()))?;
            keep_feature(simplex, &closest);
            Some(closest)
        }
        _ => unreachable!("simplex holds between one and three points"),
    }
}

fn keep_feature(simplex: &mut Vec<SupportPoint>, closest: &Closest) {
    simplex.clear();
    if closest.weight <= 0.0 {
        simplex.push(closest.first);
    } else if closest.weight >= 1.0 {
        simplex.push(closest.second);
    } else {
        simplex.push(closest.first);
        simplex.push(closest.second);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn circle(radius: f64) -> ConvexShape {
        ConvexShape::circle(radius).unwrap()
    }

    fn at(x: f64, y: f64) -> Transform {
        Transform::from_position(v2(x, y))
    }

    #[test]
    fn test_circle_circle() {
        let shape = circle(5.0);
        assert!(overlaps(&shape, &at(0.0, 0.0), &shape, &at(8.0, 0.0)).is_some());
        assert!(overlaps(&shape, &at(0.0, 0.0), &shape, &at(11.0, 0.0)).is_none());
        assert!(overlaps(&shape, &at(0.0, 0.0), &shape, &at(5.0, 6.0)).is_some());
        assert!(overlaps(&shape, &at(0.0, 0.0), &shape, &at(7.5, 7.5)).is_none());
    }

    #[test]
    fn test_box_box() {
        let square = ConvexShape::rect(2.0, 2.0).unwrap();
        assert!(overlaps(&square, &at(0.0, 0.0), &square, &at(1.5, 0.5)).is_some());
        assert!(overlaps(&square, &at(0.0, 0.0), &square, &at(2.5, 0.0)).is_none());

        // corners miss once one box is rotated
        let rotated = Transform::new(v2(2.3, 2.3), 45.0, v2(1.0, 1.0));
        assert!(overlaps(&square, &at(0.0, 0.0), &square, &rotated).is_none());
        let rotated = Transform::new(v2(1.9, 0.0), 45.0, v2(1.0, 1.0));
        assert!(overlaps(&square, &at(0.0, 0.0), &square, &rotated).is_some());
    }

    #[test]
    fn test_mixed_shapes() {
        let square = ConvexShape::rect(2.0, 2.0).unwrap();
        let stadium = ConvexShape::stadium(0.5, 4.0).unwrap();
        assert!(overlaps(&square, &at(0.0, 0.0), &stadium, &at(1.4, 2.0)).is_some());
        assert!(overlaps(&square, &at(0.0, 0.0), &stadium, &at(1.6, 2.0)).is_none());
        assert!(overlaps(&circle(1.0), &at(0.0, 0.0), &ConvexShape::Point, &at(0.5, 0.5)).is_some());
        assert!(overlaps(&circle(1.0), &at(0.0, 0.0), &ConvexShape::Point, &at(0.8, 0.8)).is_none());
    }

    #[test]
    fn test_contained_shape() {
        let big = ConvexShape::rect(10.0, 10.0).unwrap();
        assert!(overlaps(&big, &at(0.0, 0.0), &circle(1.0), &at(0.0, 0.0)).is_some());
        assert!(overlaps(&circle(1.0), &at(1.0, 1.0), &big, &at(0.0, 0.0)).is_some());
    }

    #[test]
    fn test_simplex_encloses_origin() {
        let shape = circle(5.0);
        let simplex = overlaps(&shape, &at(0.0, 0.0), &shape, &at(8.0, 0.0)).unwrap();
        let points = simplex.points();
        assert!(encloses_origin(&points));
    }

    #[test]
    fn test_box_penetration() {
        let square = ConvexShape::rect(2.0, 2.0).unwrap();
        let (ta, tb) = (at(0.0, 0.0), at(1.5, 0.25));
        let simplex = overlaps(&square, &ta, &square, &tb).unwrap();
        let depth = penetration(&simplex, &square, &ta, &square, &tb);
        assert_relative_eq!(depth.x, 0.5, epsilon = 1e-3);
        assert_relative_eq!(depth.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_circle_penetration() {
        let shape = circle(5.0);
        let (ta, tb) = (at(0.0, 0.0), at(8.0, 0.0));
        let simplex = overlaps(&shape, &ta, &shape, &tb).unwrap();
        let depth = penetration(&simplex, &shape, &ta, &shape, &tb);
        assert_relative_eq!(depth.x, 2.0, epsilon = 1e-2);
        assert_relative_eq!(depth.y, 0.0, epsilon = 1e-1);
    }

    #[test]
    fn test_epa_cap_falls_back_to_best_edge() {
        let shape = circle(5.0);
        let (ta, tb) = (at(0.0, 0.0), at(8.0, 0.0));
        let (a, b) = (Placed::new(&shape, &ta), Placed::new(&shape, &tb));
        let simplex = gjk_overlap(&a, &b, GJK_MAX_ITERATIONS).unwrap();
        let depth = epa(&simplex, &a, &b, EPA_TOLERANCE, 0);
        assert!(depth.len() <= 2.0 + 1e-9);
    }

    #[test]
    fn test_configured_caps() {
        let defaults = WorldConfig::default();
        assert_eq!(defaults.gjk_max_iterations, GJK_MAX_ITERATIONS);
        assert_eq!(defaults.epa_tolerance, EPA_TOLERANCE);
        assert_eq!(defaults.epa_max_iterations, EPA_MAX_ITERATIONS);

        let shape = circle(5.0);
        let (ta, tb) = (at(0.0, 0.0), at(8.0, 0.0));
        let capped = WorldConfig { gjk_max_iterations: 0, ..WorldConfig::default() };
        assert!(overlaps_with(&capped, &shape, &ta, &shape, &tb).is_none());
        let simplex = overlaps_with(&WorldConfig::default(), &shape, &ta, &shape, &tb).unwrap();
        assert_eq!(Some(simplex), overlaps(&shape, &ta, &shape, &tb));

        let no_expansion = WorldConfig { epa_max_iterations: 0, ..WorldConfig::default() };
        let rough = penetration_with(&no_expansion, &simplex, &shape, &ta, &shape, &tb);
        let refined = penetration(&simplex, &shape, &ta, &shape, &tb);
        assert!(rough.len() <= refined.len() + 1e-9);
        assert_relative_eq!(refined.x, 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_closest_points() {
        let shape = circle(1.0);
        let (on_a, on_b) = closest_points(&shape, &at(0.0, 0.0), &shape, &at(4.0, 0.0)).unwrap();
        assert_relative_eq!(on_a.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(on_b.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(on_a.y, 0.0, epsilon = 1e-6);
        assert!(closest_points(&shape, &at(0.0, 0.0), &shape, &at(1.0, 0.0)).is_none());
        assert_relative_eq!(distance(&shape, &at(0.0, 0.0), &shape, &at(0.0, 5.0)), 3.0, epsilon = 1e-6);
        assert_eq!(distance(&shape, &at(0.0, 0.0), &shape, &at(1.0, 0.0)), 0.0);

        let square = ConvexShape::rect(2.0, 2.0).unwrap();
        let (on_a, on_b) = gjk_closest(&Placed::new(&square, &at(0.0, 0.0)), &v2(3.0, 0.5)).unwrap();
        assert_relative_eq!(on_a.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(on_a.y, 0.5, epsilon = 1e-9);
        assert_eq!(on_b, v2(3.0, 0.5));
    }

    #[test]
    fn test_segment_support() {
        let square = ConvexShape::rect(2.0, 2.0).unwrap();
        let identity = Transform::identity();
        let placed = Placed::new(&square, &identity);
        let crossing = Segment { start: v2(-5.0, 0.0), end: v2(5.0, 0.2) };
        let missing = Segment { start: v2(-5.0, 3.0), end: v2(5.0, 2.0) };
        assert!(gjk_overlap(&placed, &crossing, GJK_MAX_ITERATIONS).is_some());
        assert!(gjk_overlap(&placed, &missing, GJK_MAX_ITERATIONS).is_none());
    }

    fn arb_shape() -> impl Strategy<Value = ConvexShape> {
        prop_oneof![
            (0.1f64..5.0).prop_map(|radius| ConvexShape::circle(radius).unwrap()),
            (0.1f64..5.0, 0.1f64..5.0).prop_map(|(rx, ry)| ConvexShape::ellipse(rx, ry).unwrap()),
            (0.1f64..5.0, 0.1f64..5.0).prop_map(|(w, h)| ConvexShape::rect(w, h).unwrap()),
            (0.1f64..3.0, 0.0f64..4.0).prop_map(|(r, h)| ConvexShape::stadium(r, h).unwrap()),
        ]
    }

    fn arb_transform() -> impl Strategy<Value = Transform> {
        (-10.0f64..10.0, -10.0f64..10.0, -180.0f64..180.0, 0.5f64..2.0, 0.5f64..2.0)
            .prop_map(|(x, y, rotation, sx, sy)| Transform::new(v2(x, y), rotation, v2(sx, sy)))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            shape_a in arb_shape(),
            shape_b in arb_shape(),
            ta in arb_transform(),
            tb in arb_transform(),
        ) {
            prop_assume!(ta.position != tb.position);
            prop_assert_eq!(
                overlaps(&shape_a, &ta, &shape_b, &tb).is_some(),
                overlaps(&shape_b, &tb, &shape_a, &ta).is_some()
            );
        }

        #[test]
        fn prop_overlap_implies_aabb_overlap(
            shape_a in arb_shape(),
            shape_b in arb_shape(),
            ta in arb_transform(),
            tb in arb_transform(),
        ) {
            if overlaps(&shape_a, &ta, &shape_b, &tb).is_some() {
                prop_assert!(shape_a.aabb(&ta).overlaps(&shape_b.aabb(&tb)));
            }
        }
    }
}
