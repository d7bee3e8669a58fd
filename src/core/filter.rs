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

use crate::core::{Bitmask, ALL_CATEGORIES, DEFAULT_CATEGORY};

/// Symmetric group/category/mask filter used by spatial queries.
///
/// Unlike the directional category/mask check that drives contact events,
/// a filter rejects a pair unless *both* sides accept each other.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Filter {
    /// Filters sharing the same non-zero group never match.
    pub group: u32,
    /// Categories the filtered object belongs to.
    pub category: Bitmask,
    /// Categories the filtered object accepts.
    pub mask: Bitmask,
}

impl Default for Filter {
    fn default() -> Filter {
        Filter::new(0, DEFAULT_CATEGORY, ALL_CATEGORIES)
    }
}

impl Filter {
    /// A filter that accepts everything and belongs to every category.
    pub const ALL: Filter = Filter { group: 0, category: ALL_CATEGORIES, mask: ALL_CATEGORIES };

    /// Constructs a new filter.
    pub const fn new(group: u32, category: Bitmask, mask: Bitmask) -> Filter {
        Filter { group, category, mask }
    }

    /// Returns `true` if the two filters must not be paired.
    pub fn rejects(&self, other: &Filter) -> bool {
        (self.group != 0 && self.group == other.group)
            || self.category & other.mask == 0
            || self.mask & other.category == 0
    }
}
