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

pub mod broad;
mod collider;
mod events;
mod filter;
pub mod gjk;
mod query;
mod world;

pub use self::collider::{AttachedShape, Collider};
pub use self::events::{ContactEvent, ContactKind, ContactListener};
pub use self::filter::Filter;
pub use self::query::{PointInfo, SegmentInfo};
pub use self::world::CollisionWorld;

use crate::geom::Transform;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

/// Identifies the object that owns a collider. Chosen by the user.
pub type OwnerId = u64;

/// Bitmask type used for collider categories and masks.
pub type Bitmask = u32;

/// A mask with every category bit set.
pub const ALL_CATEGORIES: Bitmask = Bitmask::MAX;

/// Category assigned to colliders that do not specify one.
pub const DEFAULT_CATEGORY: Bitmask = 1;

/// Generation-checked reference to a collider stored in a `CollisionWorld`.
///
/// Once the collider is removed, its handle becomes stale and every lookup
/// through it fails, even if the underlying slot is reused.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ColliderHandle {
    index: u32,
    generation: u32,
}

impl ColliderHandle {
    pub(crate) fn new(index: u32, generation: u32) -> ColliderHandle {
        ColliderHandle { index, generation }
    }

    /// Index of the arena slot.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the arena slot at the time this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Tuning knobs for `CollisionWorld`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct WorldConfig {
    /// Maximum number of refinement iterations in a GJK overlap test. A test
    /// that has not resolved by then reports no overlap.
    pub gjk_max_iterations: usize,
    /// Minimum improvement, in world units, for the penetration expansion to
    /// keep growing its polytope.
    pub epa_tolerance: f64,
    /// Maximum number of points the penetration expansion adds before
    /// settling for the best edge found so far.
    pub epa_max_iterations: usize,
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        WorldConfig {
            gjk_max_iterations: gjk::GJK_MAX_ITERATIONS,
            epa_tolerance: gjk::EPA_TOLERANCE,
            epa_max_iterations: gjk::EPA_MAX_ITERATIONS,
        }
    }
}

/// Resolves the current world transform of a collider's owner.
///
/// Transforms are owned by the scene; the collision engine only reads them.
/// Returning `None` excludes the owner's colliders from the current step.
pub trait TransformSource {
    /// Returns the world transform of `owner`, if it can be resolved.
    fn world_transform(&self, owner: OwnerId) -> Option<Transform>;
}

impl<S: BuildHasher> TransformSource for HashMap<OwnerId, Transform, S> {
    fn world_transform(&self, owner: OwnerId) -> Option<Transform> {
        self.get(&owner).copied()
    }
}

impl TransformSource for BTreeMap<OwnerId, Transform> {
    fn world_transform(&self, owner: OwnerId) -> Option<Transform> {
        self.get(&owner).copied()
    }
}

impl<T: TransformSource + ?Sized> TransformSource for &T {
    fn world_transform(&self, owner: OwnerId) -> Option<Transform> {
        (**self).world_transform(owner)
    }
}
