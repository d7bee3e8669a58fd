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

//! 2D collision detection between convex shapes, with touch/separate contact
//! events computed one step at a time.
//!
//! Colliders are added to a [`CollisionWorld`], each attached to an owner
//! whose world transform is supplied on every [`CollisionWorld::step`]
//! through a [`TransformSource`]. A step prunes candidate pairs by their
//! bounds, tests the rest exactly with GJK, and queues `OnTouch`,
//! `WhileTouching` and `OnSeparate` events for every collider that notices
//! the other (see [`Collider::compare_mask`]).

pub mod geom;
mod core;
mod error;

pub use crate::core::*;
pub use crate::error::ShapeError;

#[cfg(test)]
mod tests;
