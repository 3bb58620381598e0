//! Text layouts: build a [`Grid`] from ASCII art and print one back.
//!
//! One line per row, every line the same width, as many rows as columns.
//! Leading and trailing whitespace of the whole text is ignored.
//!
//! | glyph | meaning |
//! |---|---|
//! | `.` | empty |
//! | `#` | wall |
//! | `S` | start |
//! | `E` | end |
//! | `*` | scent source |
//!
//! Printing a grid (its [`Display`](fmt::Display) impl) uses the same
//! alphabet plus `o` (open), `x` (closed) and `+` (path).

use std::fmt;

use crate::error::{Error, Result};
use crate::geom::{Adjacency, Point};
use crate::grid::Grid;

/// A grid parsed from text, plus the scent sources it names.
///
/// Sources are returned rather than applied: diffusing them is the job of
/// `ScentField` in `scentgrid-paths`.
#[derive(Debug, Clone)]
pub struct Layout {
    grid: Grid,
    sources: Vec<Point>,
}

impl Layout {
    /// Parse `text` into a grid using `adjacency` for its neighbor lists.
    pub fn parse(text: &str, adjacency: Adjacency) -> Result<Self> {
        let text = text.trim();
        let rows: Vec<&str> = text.lines().collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(Error::EmptyGrid(0));
        }
        if let Some(line) = rows.iter().position(|r| r.chars().count() != width) {
            return Err(Error::InconsistentSize { line });
        }
        if rows.len() != width {
            return Err(Error::NotSquare {
                width,
                height: rows.len(),
            });
        }

        let mut grid = Grid::new(width as i32, adjacency)?;
        let mut sources = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            for (col, glyph) in line.chars().enumerate() {
                let pos = Point::new(row as i32, col as i32);
                match glyph {
                    '.' => {}
                    '#' => grid.set_wall(pos)?,
                    'S' if grid.start().is_some() => {
                        return Err(Error::DuplicateGlyph { glyph, pos });
                    }
                    'S' => grid.set_start(pos)?,
                    'E' if grid.end().is_some() => {
                        return Err(Error::DuplicateGlyph { glyph, pos });
                    }
                    'E' => grid.set_end(pos)?,
                    '*' => sources.push(pos),
                    _ => return Err(Error::InvalidGlyph { glyph, pos }),
                }
            }
        }
        Ok(Self { grid, sources })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Scent sources in reading order.
    #[inline]
    pub fn sources(&self) -> &[Point] {
        &self.sources
    }

    #[inline]
    pub fn into_parts(self) -> (Grid, Vec<Point>) {
        (self.grid, self.sources)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells().iter().enumerate() {
            if i > 0 && i % self.size() as usize == 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", cell.role().glyph())?;
        }
        Ok(())
    }
}
