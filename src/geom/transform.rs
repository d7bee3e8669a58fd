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

/// A world-space placement: scale, then rotate, then translate.
///
/// Rotation is counter-clockwise in degrees. Scale may be non-uniform, and
/// must be non-zero on both axes for support queries to be meaningful.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Transform {
    /// Translation.
    pub position: Vec2,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
    /// Per-axis scale, applied before rotation.
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    /// Constructs a new `Transform`.
    pub fn new(position: Vec2, rotation: f64, scale: Vec2) -> Transform {
        Transform { position, rotation, scale }
    }

    /// The identity transform.
    pub fn identity() -> Transform {
        Transform::new(Vec2::zero(), 0.0, v2(1.0, 1.0))
    }

    /// An unrotated, unscaled transform at `position`.
    pub fn from_position(position: Vec2) -> Transform {
        Transform { position, ..Transform::identity() }
    }

    /// Maps a local-space point into world space.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        local.mul_elem(self.scale).rotate(self.rotation) + self.position
    }

    /// Maps a world-space direction into the local frame used for support
    /// queries (the transpose of the linear part of this transform).
    ///
    /// The result is not normalized.
    pub(crate) fn local_direction(&self, direction: Vec2) -> Vec2 {
        direction.rotate(-self.rotation).mul_elem(self.scale)
    }

    /// Places a child transform, given relative to `self`, into world space.
    ///
    /// Rotations add and scales multiply, which is exact unless a rotated child
    /// sits under a non-uniformly scaled parent.
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            position: self.apply(child.position),
            rotation: self.rotation + child.rotation,
            scale: self.scale.mul_elem(child.scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply() {
        let transform = Transform::new(v2(1.0, 2.0), 90.0, v2(2.0, 1.0));
        let point = transform.apply(v2(1.0, 0.0));
        assert_relative_eq!(point.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(point.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose() {
        let parent = Transform::new(v2(10.0, 0.0), 90.0, v2(2.0, 2.0));
        let child = Transform::new(v2(1.0, 0.0), 45.0, v2(0.5, 1.0));
        let world = parent.compose(&child);
        assert_relative_eq!(world.position.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(world.position.y, 2.0, epsilon = 1e-12);
        assert_eq!(world.rotation, 135.0);
        assert_eq!(world.scale, v2(1.0, 2.0));
        assert_eq!(Transform::identity().compose(&child), child);
    }
}
