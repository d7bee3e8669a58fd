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

use thiserror::Error;

/// Reasons a shape is rejected at construction.
///
/// The narrow phase gives meaningless answers for these inputs, so they are
/// refused up front instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// A polygon needs at least three vertices.
    #[error("polygon requires at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },

    /// Polygon vertices do not wind consistently around a convex boundary.
    #[error("polygon vertices are not convex and consistently wound")]
    NotConvex,

    /// Polygon vertices enclose no area.
    #[error("polygon has zero area")]
    Degenerate,

    /// A radius was zero, negative or not finite.
    #[error("invalid radius {0}")]
    InvalidRadius(f64),

    /// A width, height or length was negative or not finite.
    #[error("invalid dimensions {0}x{1}")]
    InvalidDimensions(f64, f64),

    /// A vertex coordinate was NaN or infinite.
    #[error("non-finite vertex coordinate")]
    NonFinite,
}
