// Copyright 2016-2017 Matthew D. Michelotti
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

use crate::error::ShapeError;
use crate::geom::{v2, Card, Rect, Transform, Vec2};

mod support;

/// Enumeration of kinds of shapes used by the collision engine.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum ShapeKind {
    /// Ellipse, or circle when both radii match.
    Ellipse,
    /// Convex polygon, including boxes.
    Polygon,
    /// Capsule: a vertical segment swept by a circle.
    Stadium,
    /// A single point at the local origin.
    Point,
}

/// An ellipse centered on the local origin.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Ellipse {
    radii: Vec2,
}

impl Ellipse {
    /// Returns the x and y radii.
    pub fn radii(&self) -> Vec2 {
        self.radii
    }
}

/// A convex polygon given by its local-space vertices.
///
/// The vertices must already be convex and consistently wound (either
/// direction); this is checked on construction.
#[derive(PartialEq, Clone, Debug)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Validates and constructs a polygon.
    pub fn new(vertices: Vec<Vec2>) -> Result<Polygon, ShapeError> {
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices { count: vertices.len() });
        }
        if !vertices.iter().all(|vertex| vertex.is_finite()) {
            return Err(ShapeError::NonFinite);
        }
        let area = signed_area(&vertices);
        if area == 0.0 {
            return Err(ShapeError::Degenerate);
        }
        let count = vertices.len();
        for i in 0..count {
            let start = vertices[i];
            let edge = vertices[(i + 1) % count] - start;
            let outside = vertices
                .iter()
                .any(|&vertex| edge.cross(vertex - start) * area < 0.0);
            if outside {
                return Err(ShapeError::NotConvex);
            }
        }
        Ok(Polygon { vertices })
    }

    /// Constructs an axis-aligned box of the given `size`, centered on the local origin.
    pub fn make_box(size: Vec2) -> Result<Polygon, ShapeError> {
        if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
            return Err(ShapeError::InvalidDimensions(size.x, size.y));
        }
        let half = size * 0.5;
        Polygon::new(vec![
            v2(half.x, half.y),
            v2(-half.x, half.y),
            v2(-half.x, -half.y),
            v2(half.x, -half.y),
        ])
    }

    /// Returns the local-space vertices.
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    let count = vertices.len();
    let twice_area: f64 = (0..count)
        .map(|i| vertices[i].cross(vertices[(i + 1) % count]))
        .sum();
    twice_area * 0.5
}

/// A capsule: the segment from `(0, -height/2)` to `(0, height/2)` swept by a
/// circle of `radius`.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Stadium {
    radius: f64,
    height: f64,
}

impl Stadium {
    /// Returns the radius of the rounded ends.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the length of the straight section.
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// A convex shape in its local space.
///
/// The only query the narrow phase needs from a shape is its support point
/// (`furthest_vertex`); the broad phase additionally asks for world bounds.
#[derive(PartialEq, Clone, Debug)]
pub enum ConvexShape {
    /// See [`Ellipse`].
    Ellipse(Ellipse),
    /// See [`Polygon`].
    Polygon(Polygon),
    /// See [`Stadium`].
    Stadium(Stadium),
    /// A single point at the local origin.
    Point,
}

impl ConvexShape {
    /// Constructs a circle with the given `radius`.
    pub fn circle(radius: f64) -> Result<ConvexShape, ShapeError> {
        ConvexShape::ellipse(radius, radius)
    }

    /// Constructs an ellipse with independent x and y radii.
    pub fn ellipse(radius_x: f64, radius_y: f64) -> Result<ConvexShape, ShapeError> {
        for &radius in &[radius_x, radius_y] {
            if !(radius > 0.0 && radius.is_finite()) {
                return Err(ShapeError::InvalidRadius(radius));
            }
        }
        Ok(ConvexShape::Ellipse(Ellipse { radii: v2(radius_x, radius_y) }))
    }

    /// Constructs a convex polygon from local-space vertices.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<ConvexShape, ShapeError> {
        Polygon::new(vertices).map(ConvexShape::Polygon)
    }

    /// Constructs an axis-aligned rectangle polygon centered on the local origin.
    pub fn rect(width: f64, height: f64) -> Result<ConvexShape, ShapeError> {
        Polygon::make_box(v2(width, height)).map(ConvexShape::Polygon)
    }

    /// Constructs a capsule. `height` may be zero, which yields a circle.
    pub fn stadium(radius: f64, height: f64) -> Result<ConvexShape, ShapeError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ShapeError::InvalidRadius(radius));
        }
        if !(height >= 0.0 && height.is_finite()) {
            return Err(ShapeError::InvalidDimensions(radius * 2.0, height));
        }
        Ok(ConvexShape::Stadium(Stadium { radius, height }))
    }

    /// Returns the kind of shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ConvexShape::Ellipse(_) => ShapeKind::Ellipse,
            ConvexShape::Polygon(_) => ShapeKind::Polygon,
            ConvexShape::Stadium(_) => ShapeKind::Stadium,
            ConvexShape::Point => ShapeKind::Point,
        }
    }

    /// Returns the world-space point of this shape, placed by `transform`, that
    /// lies furthest along `direction`.
    ///
    /// `direction` need not be normalized. A zero direction yields an
    /// arbitrary point of the shape.
    pub fn furthest_vertex(&self, direction: Vec2, transform: &Transform) -> Vec2 {
        let local_dir = transform.local_direction(direction);
        transform.apply(self.local_support(local_dir))
    }

    fn local_support(&self, direction: Vec2) -> Vec2 {
        match self {
            ConvexShape::Ellipse(ellipse) => support::ellipse_support(ellipse, direction),
            ConvexShape::Polygon(polygon) => support::polygon_support(polygon, direction),
            ConvexShape::Stadium(stadium) => support::stadium_support(stadium, direction),
            ConvexShape::Point => Vec2::zero(),
        }
    }

    /// Returns the world-space axis-aligned bounds of this shape placed by `transform`.
    pub fn aabb(&self, transform: &Transform) -> Rect {
        let mut extents = [0.0; 4];
        for (extent, &card) in extents.iter_mut().zip(Card::values().iter()) {
            *extent = card.axis_value(self.furthest_vertex(card.into(), transform));
        }
        let [min_x, min_y, max_x, max_y] = extents;
        Rect::from_corners(v2(min_x, min_y), v2(max_x, max_y))
    }
}
