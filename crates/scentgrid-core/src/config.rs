//! Grid construction parameters.

use crate::geom::Adjacency;

/// Parameters for building a [`Grid`](crate::Grid).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Side length of the square grid.
    pub size: i32,
    /// Neighbor mode used until the caller switches it.
    pub adjacency: Adjacency,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 40,
            adjacency: Adjacency::Eight,
        }
    }
}
