//! Error type and result alias shared by the scentgrid crates.
//!
//! Search outcomes that are not failures (no path, cancelled) are not errors;
//! they are reported through `PathResult` in `scentgrid-paths`.

use thiserror::Error;

use crate::cell::Role;
use crate::geom::Point;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("{pos} is outside the {size}x{size} grid")]
    OutOfBounds { pos: Point, size: i32 },

    #[error("cannot make {pos} a {target} cell: it is the {occupant} cell")]
    InvalidPlacement {
        pos: Point,
        target: Role,
        occupant: Role,
    },

    #[error("search needs both a start and an end cell")]
    MissingEndpoints,

    #[error("grid size must be at least 1, got {0}")]
    EmptyGrid(i32),

    #[error("layout rows have inconsistent widths at line {line}")]
    InconsistentSize { line: usize },

    #[error("layout must be square, got {width}x{height}")]
    NotSquare { width: usize, height: usize },

    #[error("layout contains invalid glyph \u{201c}{glyph}\u{201d} at {pos}")]
    InvalidGlyph { glyph: char, pos: Point },

    #[error("layout has a second \u{201c}{glyph}\u{201d} at {pos}")]
    DuplicateGlyph { glyph: char, pos: Point },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
