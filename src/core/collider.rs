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

use crate::core::{Bitmask, ColliderHandle, Filter, OwnerId, ALL_CATEGORIES, DEFAULT_CATEGORY};
use crate::geom::{ConvexShape, Transform};
use fnv::FnvHashSet;

/// A shape attached to a collider, placed relative to the owner by `offset`.
#[derive(PartialEq, Clone, Debug)]
pub struct AttachedShape {
    /// The shape, in its local space.
    pub shape: ConvexShape,
    /// Placement of the shape relative to the owner's transform.
    pub offset: Transform,
}

impl AttachedShape {
    /// Constructs an attached shape with an identity offset.
    pub fn new(shape: ConvexShape) -> AttachedShape {
        AttachedShape { shape, offset: Transform::identity() }
    }

    /// Returns the world transform of the shape given its owner's transform.
    pub fn world_transform(&self, owner_transform: &Transform) -> Transform {
        owner_transform.compose(&self.offset)
    }
}

/// A set of convex shapes attached to an owner, with a category (what it
/// is) and a collision mask (what it notices).
///
/// Noticing is directional: `a` notices `b` iff
/// `a.collision_mask() & b.category() != 0`. A collider only receives
/// contact events about colliders it notices.
#[derive(Clone, Debug)]
pub struct Collider {
    owner: OwnerId,
    shapes: Vec<AttachedShape>,
    category: Bitmask,
    collision_mask: Bitmask,
    group: u32,
    pub(crate) touching: FnvHashSet<ColliderHandle>,
}

impl Collider {
    /// Constructs a shapeless collider owned by `owner`, in the default
    /// category and noticing every category.
    pub fn new(owner: OwnerId) -> Collider {
        Collider {
            owner,
            shapes: Vec::new(),
            category: DEFAULT_CATEGORY,
            collision_mask: ALL_CATEGORIES,
            group: 0,
            touching: FnvHashSet::default(),
        }
    }

    /// Builder form of `add_shape`.
    pub fn with_shape(mut self, shape: ConvexShape) -> Collider {
        self.add_shape(shape);
        self
    }

    /// Builder form of `add_shape_with_offset`.
    pub fn with_shape_offset(mut self, shape: ConvexShape, offset: Transform) -> Collider {
        self.add_shape_with_offset(shape, offset);
        self
    }

    /// Builder form of `set_category`.
    pub fn with_category(mut self, category: Bitmask) -> Collider {
        self.category = category;
        self
    }

    /// Builder form of `set_collision_mask`.
    pub fn with_collision_mask(mut self, collision_mask: Bitmask) -> Collider {
        self.collision_mask = collision_mask;
        self
    }

    /// Builder form of `set_group`.
    pub fn with_group(mut self, group: u32) -> Collider {
        self.group = group;
        self
    }

    /// The owner this collider is attached to.
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The attached shapes, in attachment order.
    pub fn shapes(&self) -> &[AttachedShape] {
        &self.shapes
    }

    /// Attaches a shape at the owner's origin and returns its index.
    pub fn add_shape(&mut self, shape: ConvexShape) -> usize {
        self.add_shape_with_offset(shape, Transform::identity())
    }

    /// Attaches a shape placed by `offset` relative to the owner and returns its index.
    pub fn add_shape_with_offset(&mut self, shape: ConvexShape, offset: Transform) -> usize {
        self.shapes.push(AttachedShape { shape, offset });
        self.shapes.len() - 1
    }

    /// Detaches the shape at `index`, shifting later shapes down.
    pub fn remove_shape(&mut self, index: usize) -> Option<AttachedShape> {
        if index < self.shapes.len() {
            Some(self.shapes.remove(index))
        } else {
            None
        }
    }

    /// Detaches every shape.
    pub fn clear_shapes(&mut self) -> Vec<AttachedShape> {
        std::mem::take(&mut self.shapes)
    }

    /// The categories this collider belongs to.
    pub fn category(&self) -> Bitmask {
        self.category
    }

    /// Replaces the category bits.
    pub fn set_category(&mut self, category: Bitmask) {
        self.category = category;
    }

    /// Sets the given bits in the category.
    pub fn add_category_layer(&mut self, layer: Bitmask) {
        self.category |= layer;
    }

    /// Clears the given bits in the category.
    pub fn remove_category_layer(&mut self, layer: Bitmask) {
        self.category &= !layer;
    }

    /// The categories this collider notices.
    pub fn collision_mask(&self) -> Bitmask {
        self.collision_mask
    }

    /// Replaces the collision mask.
    ///
    /// Touching pairs the collider stops noticing are dropped at the next
    /// step without an `OnSeparate` event.
    pub fn set_collision_mask(&mut self, collision_mask: Bitmask) {
        self.collision_mask = collision_mask;
    }

    /// Sets the given bits in the collision mask.
    pub fn add_collision_mask_layer(&mut self, layer: Bitmask) {
        self.collision_mask |= layer;
    }

    /// Clears the given bits in the collision mask.
    pub fn remove_collision_mask_layer(&mut self, layer: Bitmask) {
        self.collision_mask &= !layer;
    }

    /// Query group; see [`Filter`].
    pub fn group(&self) -> u32 {
        self.group
    }

    /// Sets the query group.
    pub fn set_group(&mut self, group: u32) {
        self.group = group;
    }

    /// Returns `true` if this collider notices `other`.
    pub fn compare_mask(&self, other: &Collider) -> bool {
        self.collision_mask & other.category != 0
    }

    /// The filter spatial queries match against.
    pub fn filter(&self) -> Filter {
        Filter::new(self.group, self.category, self.collision_mask)
    }
}
