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

//! Broad phase: sweep-and-prune over per-collider world bounds.

use crate::core::{Bitmask, ColliderHandle};
use crate::geom::Rect;
use noisy_float::prelude::n64;

/// A collider as seen by the broad phase for a single tick.
#[derive(Clone, Debug)]
pub struct BroadEntry {
    handle: ColliderHandle,
    category: Bitmask,
    mask: Bitmask,
    shape_bounds: Vec<Rect>,
    bounds: Option<Rect>,
}

impl BroadEntry {
    /// Constructs an entry from the world bounds of each of the collider's shapes.
    pub fn new(
        handle: ColliderHandle,
        category: Bitmask,
        mask: Bitmask,
        shape_bounds: Vec<Rect>,
    ) -> BroadEntry {
        let bounds = shape_bounds
            .iter()
            .skip(1)
            .fold(shape_bounds.first().copied(), |acc, rect| acc.map(|acc| acc.union(rect)));
        BroadEntry { handle, category, mask, shape_bounds, bounds }
    }

    /// The collider this entry describes.
    pub fn handle(&self) -> ColliderHandle {
        self.handle
    }

    /// World bounds of each shape, in attachment order.
    pub fn shape_bounds(&self) -> &[Rect] {
        &self.shape_bounds
    }

    /// Union of all shape bounds, or `None` for a collider without shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn interacts(&self, other: &BroadEntry) -> bool {
        self.mask & other.category != 0 || other.mask & self.category != 0
    }

    fn shapes_overlap(&self, other: &BroadEntry) -> bool {
        self.shape_bounds
            .iter()
            .any(|rect| other.shape_bounds.iter().any(|other| rect.overlaps(other)))
    }
}

/// Returns every pair of entries that should reach the narrow phase, as
/// index pairs `(i, j)` with `i < j`, sorted.
///
/// A pair is kept when at least one side notices the other and some shape
/// bounds of the two intersect (edges touching counts).
pub fn candidates(entries: &[BroadEntry]) -> Vec<(usize, usize)> {
    let mut order: Vec<(usize, Rect)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.bounds().map(|bounds| (index, bounds)))
        .collect();
    order.sort_by_key(|&(index, bounds)| (n64(bounds.min_x()), index));

    let mut active: Vec<(usize, Rect)> = Vec::new();
    let mut result = Vec::new();
    for (index, bounds) in order {
        active.retain(|(_, other)| other.max_x() >= bounds.min_x());
        for &(other_index, other_bounds) in &active {
            if !bounds.overlaps(&other_bounds) {
                continue;
            }
            let (entry, other) = (&entries[index], &entries[other_index]);
            if entry.interacts(other) && entry.shapes_overlap(other) {
                result.push((index.min(other_index), index.max(other_index)));
            }
        }
        active.push((index, bounds));
    }
    result.sort_unstable();
    result
}
