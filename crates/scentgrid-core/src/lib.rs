//! **scentgrid-core**: grid model for scent-aware pathfinding.
//!
//! This crate owns the data every other part of *scentgrid* works on: cell
//! addressing, the square [`Grid`] with its cached neighbor lists, cell roles
//! and scent values, the text [layout](layout) format, and the shared
//! [`Error`] type. Search and diffusion live in `scentgrid-paths`.

pub mod cell;
pub mod config;
pub mod error;
pub mod geom;
pub mod grid;
pub mod layout;

pub use cell::{Cell, Role};
pub use config::GridConfig;
pub use error::{Error, Result};
pub use geom::{Adjacency, Point};
pub use grid::Grid;
pub use layout::Layout;
