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

use crate::geom::shape::{Ellipse, Polygon, Stadium};
use crate::geom::{v2, Vec2};

// This module contains the local-space support mapping of each shape variant:
// the point of the shape furthest along a (not necessarily unit) direction.

pub fn ellipse_support(ellipse: &Ellipse, dir: Vec2) -> Vec2 {
    let radii = ellipse.radii;
    let stretched = dir.mul_elem(radii);
    let len = stretched.len();
    if len == 0.0 {
        return v2(radii.x, 0.0);
    }
    let scaled = stretched.mul_elem(radii);
    v2(scaled.x / len, scaled.y / len)
}

pub fn polygon_support(polygon: &Polygon, dir: Vec2) -> Vec2 {
    let mut furthest = polygon.vertices[0];
    let mut best = furthest.dot(dir);
    for &vertex in &polygon.vertices[1..] {
        let dist = vertex.dot(dir);
        if dist > best {
            best = dist;
            furthest = vertex;
        }
    }
    furthest
}

pub fn stadium_support(stadium: &Stadium, dir: Vec2) -> Vec2 {
    let half_height = stadium.height * 0.5;
    if dir.is_zero() {
        return v2(0.0, half_height + stadium.radius);
    }
    let cap_center = v2(0.0, half_height.copysign(dir.y));
    cap_center + dir.normalize() * stadium.radius
}
