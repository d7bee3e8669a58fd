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

/// Represents the four cardinal directions in 2D space.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum Card {
    /// Negative X direction.
    MinusX,

    /// Negative Y direction.
    MinusY,

    /// Positive X direction.
    PlusX,

    /// Positive Y direction.
    PlusY,
}

impl Card {
    /// Returns all cardinal directions.
    #[inline]
    pub fn values() -> [Card; 4] {
        [Card::MinusX, Card::MinusY, Card::PlusX, Card::PlusY]
    }

    /// Picks the coordinate of `point` that lies along this direction's axis.
    pub(crate) fn axis_value(self, point: Vec2) -> f64 {
        match self {
            Card::MinusX | Card::PlusX => point.x,
            Card::MinusY | Card::PlusY => point.y,
        }
    }
}

impl From<Card> for Vec2 {
    fn from(card: Card) -> Vec2 {
        match card {
            Card::MinusX => v2(-1.0, 0.0),
            Card::MinusY => v2(0.0, -1.0),
            Card::PlusX => v2(1.0, 0.0),
            Card::PlusY => v2(0.0, 1.0),
        }
    }
}
