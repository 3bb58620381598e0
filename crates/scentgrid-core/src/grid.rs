//! The [`Grid`] type: a square board of [`Cell`]s with cached neighbor lists.
//!
//! Cells are addressed by [`Point`] and stored row-major. Every cell keeps a
//! list of the passable cells one step away under the current [`Adjacency`].
//! The lists are derived data with one invalidation rule: whenever a cell
//! becomes or stops being a wall, the lists of that cell and of the cells
//! around it are rebuilt; switching adjacency with
//! [`compute_neighbors`](Grid::compute_neighbors) rebuilds all of them.

use log::{debug, trace};

use crate::cell::{Cell, Role};
use crate::config::GridConfig;
use crate::error::{Error, Result};
use crate::geom::{Adjacency, Point};

/// A square grid owning all of its cells.
///
/// At most one cell is the Start and at most one is the End; the editing
/// methods keep it that way.
#[derive(Debug, Clone)]
pub struct Grid {
    size: i32,
    adjacency: Adjacency,
    cells: Vec<Cell>,
    neighbors: Vec<Vec<Point>>,
    start: Option<Point>,
    end: Option<Point>,
    sources: Vec<Point>,
}

impl Grid {
    /// Create a `size`×`size` grid of Empty cells with neighbor lists
    /// computed for `adjacency`.
    pub fn new(size: i32, adjacency: Adjacency) -> Result<Self> {
        if size < 1 {
            return Err(Error::EmptyGrid(size));
        }
        Ok(Self::build(size, adjacency))
    }

    /// Create a grid from a [`GridConfig`].
    pub fn from_config(config: &GridConfig) -> Result<Self> {
        Self::new(config.size, config.adjacency)
    }

    fn build(size: i32, adjacency: Adjacency) -> Self {
        let n = size as usize;
        let cells = (0..n * n)
            .map(|i| Cell::new(Point::new((i / n) as i32, (i % n) as i32)))
            .collect();
        let mut grid = Self {
            size,
            adjacency,
            cells,
            neighbors: Vec::new(),
            start: None,
            end: None,
            sources: Vec::new(),
        };
        grid.compute_neighbors(adjacency);
        grid
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Side length.
    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Number of cells (`size * size`).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Current neighbor mode.
    #[inline]
    pub fn adjacency(&self) -> Adjacency {
        self.adjacency
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.in_square(self.size)
    }

    /// Flat row-major index of `p`, or `None` if out of bounds.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some(row_major(p, self.size))
    }

    /// Point at a flat index. `idx` must be below [`cell_count`](Self::cell_count).
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let n = self.size as usize;
        Point::new((idx / n) as i32, (idx % n) as i32)
    }

    /// The cell at `p`, if in bounds.
    #[inline]
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// All cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every position, row-major.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().map(Cell::pos)
    }

    /// Cached passable neighbors of `p`. Empty when `p` is out of bounds.
    #[inline]
    pub fn neighbors(&self, p: Point) -> &[Point] {
        match self.index(p) {
            Some(i) => &self.neighbors[i],
            None => &[],
        }
    }

    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Scent sources in the order they were marked.
    #[inline]
    pub fn sources(&self) -> &[Point] {
        &self.sources
    }

    fn checked_index(&self, p: Point) -> Result<usize> {
        self.index(p).ok_or(Error::OutOfBounds {
            pos: p,
            size: self.size,
        })
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Turn `p` into a wall. Walls cannot replace the Start or End cell.
    pub fn set_wall(&mut self, p: Point) -> Result<()> {
        let idx = self.checked_index(p)?;
        let occupant = self.cells[idx].role();
        if occupant.is_endpoint() {
            return Err(Error::InvalidPlacement {
                pos: p,
                target: Role::Wall,
                occupant,
            });
        }
        if occupant == Role::Wall {
            return Ok(());
        }
        self.sources.retain(|&s| s != p);
        self.cells[idx].set_role(Role::Wall);
        self.refresh_around(p);
        trace!("wall placed at {p}");
        Ok(())
    }

    /// Make `p` the Start cell, demoting any previous Start to Empty.
    ///
    /// Fails without side effects if `p` is the current End.
    pub fn set_start(&mut self, p: Point) -> Result<()> {
        self.place_endpoint(p, Role::Start)
    }

    /// Make `p` the End cell, demoting any previous End to Empty.
    ///
    /// Fails without side effects if `p` is the current Start.
    pub fn set_end(&mut self, p: Point) -> Result<()> {
        self.place_endpoint(p, Role::End)
    }

    fn place_endpoint(&mut self, p: Point, role: Role) -> Result<()> {
        let idx = self.checked_index(p)?;
        let (current, other) = match role {
            Role::Start => (self.start, self.end),
            _ => (self.end, self.start),
        };
        if other == Some(p) {
            return Err(Error::InvalidPlacement {
                pos: p,
                target: role,
                occupant: self.cells[idx].role(),
            });
        }
        if current == Some(p) {
            return Ok(());
        }
        if let Some(prev) = current.and_then(|q| self.index(q)) {
            self.cells[prev].reset();
        }

        let was_wall = self.cells[idx].is_wall();
        self.sources.retain(|&s| s != p);
        self.cells[idx].set_role(role);
        match role {
            Role::Start => self.start = Some(p),
            _ => self.end = Some(p),
        }
        if was_wall {
            self.refresh_around(p);
        }
        trace!("{role} moved to {p}");
        Ok(())
    }

    /// Reset `p` to an Empty, unscented cell, forgetting it as Start, End or
    /// scent source.
    pub fn clear(&mut self, p: Point) -> Result<()> {
        let idx = self.checked_index(p)?;
        let was_wall = self.cells[idx].is_wall();
        self.cells[idx].reset();
        if self.start == Some(p) {
            self.start = None;
        }
        if self.end == Some(p) {
            self.end = None;
        }
        self.sources.retain(|&s| s != p);
        if was_wall {
            self.refresh_around(p);
        }
        Ok(())
    }

    /// Record `p` as a scent source holding `seed` intensity.
    ///
    /// Returns `Ok(false)` if `p` already is a source. Diffusion is done by
    /// the caller (see `ScentField` in `scentgrid-paths`).
    pub fn add_source(&mut self, p: Point, seed: f64) -> Result<bool> {
        let idx = self.checked_index(p)?;
        let occupant = self.cells[idx].role();
        if occupant.blocks_scent() {
            return Err(Error::InvalidPlacement {
                pos: p,
                target: Role::Scented,
                occupant,
            });
        }
        if self.sources.contains(&p) {
            return Ok(false);
        }
        let cell = &mut self.cells[idx];
        cell.set_role(Role::Scented);
        cell.set_scent(seed);
        self.sources.push(p);
        Ok(true)
    }

    /// Add `amount` to the scent at `p`.
    ///
    /// Scent only grows here; negative amounts, out-of-bounds points and
    /// Wall/Start/End cells are ignored and return `false`.
    pub fn raise_scent(&mut self, p: Point, amount: f64) -> bool {
        let Some(idx) = self.index(p) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        if cell.role().blocks_scent() || amount < 0.0 {
            return false;
        }
        cell.set_scent(cell.scent() + amount);
        true
    }

    /// Write a search mark (Open, Closed or Path) on `p`.
    ///
    /// Start, End and Wall cells keep their role; returns whether the mark
    /// was written.
    pub fn mark_search(&mut self, p: Point, mark: Role) -> bool {
        debug_assert!(mark.is_search_mark(), "{mark} is not a search mark");
        let Some(idx) = self.index(p) else {
            return false;
        };
        let cell = &mut self.cells[idx];
        if !mark.is_search_mark() || cell.role().is_endpoint() || cell.is_wall() {
            return false;
        }
        cell.set_role(mark);
        true
    }

    /// Remove Open/Closed/Path marks left by a search. Walls, endpoints,
    /// sources and scent are untouched.
    pub fn clear_search(&mut self) {
        let Self { cells, sources, .. } = self;
        for cell in cells.iter_mut().filter(|c| c.role().is_search_mark()) {
            let role = if sources.contains(&cell.pos()) {
                Role::Scented
            } else {
                Role::Empty
            };
            cell.set_role(role);
        }
    }

    /// Replace the grid with a fresh one of the same size and adjacency.
    pub fn reset(&mut self) {
        *self = Self::build(self.size, self.adjacency);
        debug!("grid reset ({0}x{0}, {1})", self.size, self.adjacency);
    }

    // -----------------------------------------------------------------------
    // Neighbor cache
    // -----------------------------------------------------------------------

    /// Switch to `adjacency` and rebuild every neighbor list.
    pub fn compute_neighbors(&mut self, adjacency: Adjacency) {
        self.adjacency = adjacency;
        self.neighbors = (0..self.cells.len())
            .map(|i| self.collect_neighbors(self.point(i)))
            .collect();
        debug!("neighbor lists rebuilt ({adjacency})");
    }

    fn collect_neighbors(&self, p: Point) -> Vec<Point> {
        self.adjacency
            .offsets()
            .iter()
            .map(|&d| p + d)
            .filter(|&q| self.cell(q).is_some_and(|c| !c.is_wall()))
            .collect()
    }

    /// Rebuild the lists that can mention `p`: its own and those of every
    /// cell within one diagonal step.
    fn refresh_around(&mut self, p: Point) {
        for q in std::iter::once(p).chain(Adjacency::Eight.offsets().iter().map(|&d| p + d)) {
            if let Some(i) = self.index(q) {
                self.neighbors[i] = self.collect_neighbors(q);
            }
        }
    }
}

/// Flat index of an in-bounds `p`, computed in `usize` so that large
/// grids cannot overflow `i32`.
#[inline]
fn row_major(p: Point, size: i32) -> usize {
    p.row as usize * size as usize + p.col as usize
}
