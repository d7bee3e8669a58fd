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

use crate::geom::{v2, Vec2};

/// An axis-aligned rectangle, described by its lowest corner and its dimensions.
///
/// Edges count as part of the rectangle, so two rectangles that share only an
/// edge are considered to intersect.
#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct Rect {
    /// The corner with the lowest x and y coordinates.
    pub min: Vec2,
    /// Width and height, both non-negative.
    pub dims: Vec2,
}

impl Rect {
    /// Constructs a rectangle from its lowest corner `(x, y)` and its `width` and `height`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        assert!(width >= 0.0 && height >= 0.0, "dims must be non-negative");
        Rect { min: v2(x, y), dims: v2(width, height) }
    }

    /// Constructs the smallest rectangle containing both corners.
    pub fn from_corners(a: Vec2, b: Vec2) -> Rect {
        let min = v2(a.x.min(b.x), a.y.min(b.y));
        let max = v2(a.x.max(b.x), a.y.max(b.y));
        Rect { min, dims: max - min }
    }

    /// Returns the lowest x coordinate.
    pub fn min_x(&self) -> f64 { self.min.x }

    /// Returns the lowest y coordinate.
    pub fn min_y(&self) -> f64 { self.min.y }

    /// Returns the highest x coordinate.
    pub fn max_x(&self) -> f64 { self.min.x + self.dims.x }

    /// Returns the highest y coordinate.
    pub fn max_y(&self) -> f64 { self.min.y + self.dims.y }

    /// Returns the center of the rectangle.
    pub fn center(&self) -> Vec2 {
        self.min + self.dims * 0.5
    }

    /// Returns `true` if the two rectangles intersect or touch.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    /// Returns `true` if `point` lies inside the rectangle or on its boundary.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let min = v2(self.min_x().min(other.min_x()), self.min_y().min(other.min_y()));
        let max = v2(self.max_x().max(other.max_x()), self.max_y().max(other.max_y()));
        Rect { min, dims: max - min }
    }
}
