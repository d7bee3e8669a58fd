// Copyright 2016 Matthew D. Michelotti
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

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A 2D vector of `f64` coordinates.
#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct Vec2 {
    /// The x coordinate.
    pub x: f64,
    /// The y coordinate.
    pub y: f64,
}

/// Shorthand for `Vec2::new(x, y)`.
#[inline]
pub fn v2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}

impl Vec2 {
    /// Constructs a new vector.
    #[inline]
    pub fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    /// Returns the zero vector.
    #[inline]
    pub fn zero() -> Vec2 {
        Vec2::default()
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, rhs: Vec2) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// The z component of the 3D cross product of `self` and `rhs`.
    #[inline]
    pub fn cross(self, rhs: Vec2) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Returns this vector rotated a quarter turn counter-clockwise.
    #[inline]
    pub fn perp(self) -> Vec2 {
        v2(-self.y, self.x)
    }

    /// Returns the squared length of the vector.
    pub fn len_sq(self) -> f64 {
        self.dot(self)
    }

    /// Returns the length (magnitude) of the vector.
    pub fn len(self) -> f64 {
        self.len_sq().sqrt()
    }

    /// Returns `true` if both coordinates are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns a unit vector pointing in the same direction.
    ///
    /// Panics if the length is zero.
    pub fn normalize(self) -> Vec2 {
        let len = self.len();
        assert!(len > 0.0, "can only normalize vector if length is non-zero");
        v2(self.x / len, self.y / len)
    }

    /// Returns the distance between two points.
    pub fn dist(self, other: Vec2) -> f64 {
        (self - other).len()
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elem(self, rhs: Vec2) -> Vec2 {
        v2(self.x * rhs.x, self.y * rhs.y)
    }

    /// Returns this vector rotated counter-clockwise by `degrees`.
    pub fn rotate(self, degrees: f64) -> Vec2 {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        v2(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Linear interpolation from `self` (at `alpha == 0`) to `other` (at `alpha == 1`).
    pub fn lerp(self, other: Vec2, alpha: f64) -> Vec2 {
        self + (other - self) * alpha
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        v2(self.x * rhs, self.y * rhs)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        v2(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        v2(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        v2(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Vec2 {
        v2(x, y)
    }
}
