//! Scent-weighted best-first search.
//!
//! The priority of a cell is
//!
//! ```text
//! f = g + manhattan(cell, end) + scent_weight * scent(cell)
//! ```
//!
//! where `g` counts moves from the start, each move costing 1 whatever its
//! direction. The frontier pops the smallest `(f, insertion sequence)` and
//! holds each cell at most once: when a queued cell gets a cheaper `g`, its
//! bookkeeping is updated but its queued priority is not. A popped cell may
//! be queued again if a cheaper route to it turns up later.

use log::{debug, trace};
use scentgrid_core::{Error, Grid, Point, Result, Role};

use crate::distance::manhattan;
use crate::frontier::{Frontier, NO_PARENT, Node};
use crate::observer::{CancelToken, Step, StepObserver};

/// Search constants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Multiplier applied to a cell's scent in its priority.
    pub scent_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { scent_weight: 1.5 }
    }
}

/// A found path, start and end included.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    cells: Vec<Point>,
}

impl Path {
    /// Cells from start to end.
    #[inline]
    pub fn cells(&self) -> &[Point] {
        &self.cells
    }

    /// Number of moves.
    #[inline]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// First cell. `None` only for an empty path, which a search never
    /// returns but deserialization can produce.
    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.cells.first().copied()
    }

    #[inline]
    pub fn end(&self) -> Option<Point> {
        self.cells.last().copied()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.cells.contains(&p)
    }

    pub fn into_vec(self) -> Vec<Point> {
        self.cells
    }
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathResult {
    Found(Path),
    /// The frontier emptied before the end was reached.
    NotFound,
    /// The observer or the cancel token asked to stop.
    Cancelled,
}

impl PathResult {
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// One frontier pop of the last run: the cell and the priority it was
/// queued with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expansion {
    pub pos: Point,
    pub f: f64,
}

/// Runs searches, reusing its node table and frontier between runs.
#[derive(Default)]
pub struct PathSearch {
    config: SearchConfig,
    nodes: Vec<Node>,
    generation: u32,
    frontier: Frontier,
    nbuf: Vec<Point>,
    expansions: Vec<Expansion>,
    cancel: Option<CancelToken>,
}

impl PathSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Also stop when `token` is cancelled (builder).
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Frontier pops of the most recent run, in order.
    #[inline]
    pub fn expansions(&self) -> &[Expansion] {
        &self.expansions
    }

    /// Search between the grid's own Start and End cells.
    pub fn run_marked<O>(&mut self, grid: &mut Grid, observer: &mut O) -> Result<PathResult>
    where
        O: StepObserver + ?Sized,
    {
        let (Some(start), Some(end)) = (grid.start(), grid.end()) else {
            return Err(Error::MissingEndpoints);
        };
        self.run(grid, start, end, observer)
    }

    /// Search from `start` to `end`.
    ///
    /// Writes Open, Closed and Path marks into `grid` as it goes and calls
    /// `observer` after every expansion and for every traced path cell. The
    /// marks stay behind whatever the outcome. Neighbor lists are used as
    /// cached; they are not recomputed here.
    ///
    /// `start` and `end` are never marked and never scored with scent, even
    /// when the grid does not tag them Start and End.
    pub fn run<O>(
        &mut self,
        grid: &mut Grid,
        start: Point,
        end: Point,
        observer: &mut O,
    ) -> Result<PathResult>
    where
        O: StepObserver + ?Sized,
    {
        let start_idx = Self::endpoint_index(grid, start, Role::Start)?;
        let end_idx = Self::endpoint_index(grid, end, Role::End)?;

        let generation = self.next_generation(grid.cell_count());
        let weight = self.config.scent_weight;
        self.expansions.clear();
        self.frontier.clear();

        {
            let node = &mut self.nodes[start_idx];
            node.touch(generation);
            node.g = 0;
            node.f = f64::from(manhattan(start, end));
            node.queued = true;
        }
        self.frontier.push(start_idx, self.nodes[start_idx].f);

        let mut nbuf = std::mem::take(&mut self.nbuf);

        let found = 'search: loop {
            if self.cancel_requested(&*observer) {
                debug!("search {start} -> {end} cancelled");
                self.nbuf = nbuf;
                return Ok(PathResult::Cancelled);
            }
            let Some(entry) = self.frontier.pop() else {
                break 'search false;
            };
            let ci = entry.idx;
            let current = grid.point(ci);
            self.nodes[ci].queued = false;
            self.expansions.push(Expansion {
                pos: current,
                f: entry.f,
            });

            if ci == end_idx {
                break 'search true;
            }

            let tentative = self.nodes[ci].g + 1;
            nbuf.clear();
            nbuf.extend_from_slice(grid.neighbors(current));

            for &np in nbuf.iter() {
                let Some(ni) = grid.index(np) else {
                    continue;
                };
                let node = &mut self.nodes[ni];
                node.touch(generation);
                if tentative >= node.g {
                    continue;
                }

                let endpoint = ni == start_idx || ni == end_idx;
                let h = manhattan(np, end);
                let scent = if endpoint { 0.0 } else { grid.cells()[ni].scent() };
                node.g = tentative;
                node.f = f64::from(tentative) + f64::from(h) + weight * scent;
                node.parent = ci;
                trace!(
                    "{np}: g={tentative} manhattan={h} scent={scent} f={}",
                    node.f
                );

                if !node.queued {
                    node.queued = true;
                    let f = node.f;
                    self.frontier.push(ni, f);
                    if !endpoint {
                        grid.mark_search(np, Role::Open);
                    }
                }
            }

            observer.on_step(grid, Step::Expanded(current));
            if ci != start_idx {
                grid.mark_search(current, Role::Closed);
            }
        };

        self.nbuf = nbuf;

        if !found {
            debug!(
                "no path {start} -> {end} after {} expansions",
                self.expansions.len()
            );
            return Ok(PathResult::NotFound);
        }

        let path = self.trace_back(grid, start_idx, end_idx, observer);
        debug!(
            "path {start} -> {end}: {} steps, {} expansions, {} left queued",
            path.steps(),
            self.expansions.len(),
            self.frontier.len()
        );
        Ok(PathResult::Found(path))
    }

    /// Walk predecessors from the end, marking intermediate cells as Path and
    /// reporting each cell before the start.
    fn trace_back<O>(
        &self,
        grid: &mut Grid,
        start_idx: usize,
        end_idx: usize,
        observer: &mut O,
    ) -> Path
    where
        O: StepObserver + ?Sized,
    {
        let mut cells = Vec::new();
        let mut ci = end_idx;
        while ci != start_idx && ci != NO_PARENT {
            let p = grid.point(ci);
            if ci != end_idx {
                grid.mark_search(p, Role::Path);
            }
            cells.push(p);
            observer.on_step(grid, Step::Traced(p));
            ci = self.nodes[ci].parent;
        }
        cells.push(grid.point(start_idx));
        cells.reverse();
        Path { cells }
    }

    fn endpoint_index(grid: &Grid, p: Point, role: Role) -> Result<usize> {
        let idx = grid.index(p).ok_or(Error::OutOfBounds {
            pos: p,
            size: grid.size(),
        })?;
        let occupant = grid.cells()[idx].role();
        if !occupant.is_passable() {
            return Err(Error::InvalidPlacement {
                pos: p,
                target: role,
                occupant,
            });
        }
        Ok(idx)
    }

    fn cancel_requested<O>(&self, observer: &O) -> bool
    where
        O: StepObserver + ?Sized,
    {
        observer.cancelled() || self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Bump the node generation, resizing the node table to `len`.
    fn next_generation(&mut self, len: usize) -> u32 {
        if self.nodes.len() != len {
            self.nodes.clear();
            self.nodes.resize(len, Node::default());
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{NoopObserver, RecordingObserver};
    use crate::scent::ScentField;
    use scentgrid_core::{Adjacency, Layout};

    fn p(row: i32, col: i32) -> Point {
        Point::new(row, col)
    }

    /// Parse a layout and diffuse its scent sources.
    fn scented(text: &str, adjacency: Adjacency) -> Grid {
        let (mut grid, sources) = Layout::parse(text, adjacency).unwrap().into_parts();
        let mut field = ScentField::default();
        for s in sources {
            field.mark_source(&mut grid, s).unwrap();
        }
        grid
    }

    fn role(g: &Grid, at: Point) -> Role {
        g.cell(at).unwrap().role()
    }

    fn assert_connected(g: &Grid, path: &Path) {
        for w in path.cells().windows(2) {
            assert!(
                g.neighbors(w[0]).contains(&w[1]),
                "{} -> {} is not a move",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn open_grid_paths_are_manhattan() {
        let pairs = [
            (p(0, 0), p(5, 5)),
            (p(5, 0), p(0, 5)),
            (p(2, 3), p(2, 3)),
            (p(1, 4), p(4, 0)),
            (p(3, 3), p(0, 3)),
        ];
        for (start, end) in pairs {
            let mut g = Grid::new(6, Adjacency::Four).unwrap();
            let mut search = PathSearch::default();
            let result = search.run(&mut g, start, end, &mut NoopObserver).unwrap();
            let path = result.path().expect("open grid must have a path");
            assert_eq!(path.steps() as i32, manhattan(start, end), "{start} -> {end}");
            assert_eq!(path.start(), Some(start));
            assert_eq!(path.end(), Some(end));
            assert_connected(&g, path);
        }
    }

    #[test]
    fn unmarked_endpoints_keep_their_roles() {
        let mut g = Grid::new(4, Adjacency::Four).unwrap();
        g.raise_scent(p(0, 0), 1.0);
        g.raise_scent(p(0, 3), 1.0);
        let mut search = PathSearch::default();
        let result = search.run(&mut g, p(0, 0), p(0, 3), &mut NoopObserver).unwrap();
        assert_eq!(result.path().unwrap().steps(), 3);

        assert_eq!(role(&g, p(0, 0)), Role::Empty);
        assert_eq!(role(&g, p(0, 3)), Role::Empty);
        assert_eq!(role(&g, p(0, 1)), Role::Path);
        assert_eq!(g.to_string(), ".++.\nooo.\n....\n....");
        // The end is queued on g + manhattan alone.
        let last = search.expansions().last().unwrap();
        assert_eq!(last.pos, p(0, 3));
        assert_eq!(last.f, 3.0);
    }

    #[test]
    fn five_by_five_scenario() {
        let mut g = Grid::new(5, Adjacency::Four).unwrap();
        g.set_start(p(0, 0)).unwrap();
        g.set_end(p(4, 4)).unwrap();
        let mut search = PathSearch::default();
        let result = search.run_marked(&mut g, &mut NoopObserver).unwrap();

        let path = result.path().unwrap();
        assert_eq!(path.steps(), 8);
        assert_connected(&g, path);
        let fs: Vec<f64> = search.expansions().iter().map(|e| e.f).collect();
        assert!(fs.windows(2).all(|w| w[0] >= w[1]), "popped f rose: {fs:?}");
        assert!(fs.iter().all(|&f| f == 8.0));
    }

    #[test]
    fn wall_row_forces_the_gap() {
        let mut g = scented(
            "
S....
.....
####.
.....
....E",
            Adjacency::Four,
        );
        let mut search = PathSearch::default();
        let result = search.run_marked(&mut g, &mut NoopObserver).unwrap();
        let path = result.path().unwrap();
        assert!(path.contains(p(2, 4)));
        assert_eq!(path.steps(), 8);
        assert_connected(&g, path);
    }

    #[test]
    fn walled_in_end_is_not_found() {
        let mut g = scented(
            "
S....
.....
..###
..#E#
..###",
            Adjacency::Eight,
        );
        let mut search = PathSearch::default();
        let mut rec = RecordingObserver::new();
        let result = search.run_marked(&mut g, &mut rec).unwrap();
        assert_eq!(result, PathResult::NotFound);
        assert_eq!(rec.traced(), 0);
        // 25 cells minus 8 walls minus the End: every reachable cell expanded.
        let mut expanded: Vec<Point> = rec.steps().iter().map(|s| s.pos()).collect();
        expanded.sort();
        expanded.dedup();
        assert_eq!(expanded.len(), 16);
        // Marks stay behind.
        assert_eq!(role(&g, p(0, 1)), Role::Closed);
        assert_eq!(role(&g, p(0, 0)), Role::Start);
        assert_eq!(role(&g, p(3, 3)), Role::End);
    }

    #[test]
    fn scent_bends_the_path() {
        let text = "
.....
.....
S.*.E
.....
.....";
        let mut plain = Layout::parse(text, Adjacency::Four).unwrap().into_parts().0;
        let mut search = PathSearch::default();
        let straight = search.run_marked(&mut plain, &mut NoopObserver).unwrap();
        assert_eq!(
            straight.path().unwrap().cells(),
            &[p(2, 0), p(2, 1), p(2, 2), p(2, 3), p(2, 4)]
        );

        let mut g = scented(text, Adjacency::Four);
        let result = search.run_marked(&mut g, &mut NoopObserver).unwrap();
        assert_eq!(
            result.path().unwrap().cells(),
            &[
                p(2, 0),
                p(1, 0),
                p(0, 0),
                p(0, 1),
                p(0, 2),
                p(0, 3),
                p(0, 4),
                p(1, 4),
                p(2, 4),
            ]
        );
    }

    #[test]
    fn diagonal_moves_cost_one() {
        let mut g = Grid::new(5, Adjacency::Eight).unwrap();
        let mut search = PathSearch::default();
        let result = search
            .run(&mut g, p(0, 0), p(4, 4), &mut NoopObserver)
            .unwrap();
        let path = result.path().unwrap();
        assert_eq!(path.steps(), 4);
        assert_eq!(path.cells(), &[p(0, 0), p(1, 1), p(2, 2), p(3, 3), p(4, 4)]);
    }

    #[test]
    fn observer_sees_expansions_then_trace() {
        let mut g = scented(
            "
S..#.
.#.#.
.#...
.#*#.
...#E",
            Adjacency::Four,
        );
        let mut search = PathSearch::default();
        let mut rec = RecordingObserver::new();
        let result = search.run_marked(&mut g, &mut rec).unwrap();
        let path = result.path().unwrap().clone();

        // The end is popped but not reported as an expansion.
        assert_eq!(rec.expanded() + 1, search.expansions().len());
        assert_eq!(rec.traced(), path.steps());
        let first_trace = rec
            .steps()
            .iter()
            .position(|s| matches!(s, Step::Traced(_)))
            .unwrap();
        assert!(rec.steps()[first_trace..].iter().all(|s| matches!(s, Step::Traced(_))));

        // Traced from the end back, stopping short of the start.
        let traced: Vec<Point> = rec.steps()[first_trace..].iter().map(|s| s.pos()).collect();
        let mut expected: Vec<Point> = path.cells()[1..].to_vec();
        expected.reverse();
        assert_eq!(traced, expected);

        for &c in &path.cells()[1..path.cells().len() - 1] {
            assert_eq!(role(&g, c), Role::Path, "at {c}");
        }
        assert_eq!(role(&g, path.start().unwrap()), Role::Start);
        assert_eq!(role(&g, path.end().unwrap()), Role::End);
    }

    #[test]
    fn runs_are_deterministic() {
        let text = "
S.....
.##...
...*#.
.#....
...#.*
.....E";
        let mut a = scented(text, Adjacency::Eight);
        let mut b = a.clone();
        let mut search = PathSearch::default();

        let mut rec_a = RecordingObserver::new();
        let first = search.run_marked(&mut a, &mut rec_a).unwrap();
        let pops_a = search.expansions().to_vec();

        let mut rec_b = RecordingObserver::new();
        let second = search.run_marked(&mut b, &mut rec_b).unwrap();

        assert!(first.is_found());
        assert_eq!(first, second);
        assert_eq!(rec_a, rec_b);
        assert_eq!(pops_a, search.expansions());

        // Rerunning on the already marked grid changes nothing either.
        let mut rec_c = RecordingObserver::new();
        let third = search.run_marked(&mut a, &mut rec_c).unwrap();
        assert_eq!(first, third);
        assert_eq!(rec_a, rec_c);
    }

    #[test]
    fn observer_can_cancel() {
        let mut g = Grid::new(8, Adjacency::Four).unwrap();
        let mut search = PathSearch::default();
        let mut rec = RecordingObserver::new().with_cancel_after(3);
        let result = search
            .run(&mut g, p(0, 0), p(7, 7), &mut rec)
            .unwrap();
        assert_eq!(result, PathResult::Cancelled);
        assert_eq!(rec.steps().len(), 3);
        assert_eq!(search.expansions().len(), 3);
    }

    #[test]
    fn token_cancels_before_first_pop() {
        let token = CancelToken::new();
        let mut search = PathSearch::default().with_cancel_token(token.clone());
        let mut g = Grid::new(4, Adjacency::Four).unwrap();
        token.cancel();
        let mut rec = RecordingObserver::new();
        let result = search.run(&mut g, p(0, 0), p(3, 3), &mut rec).unwrap();
        assert_eq!(result, PathResult::Cancelled);
        assert!(rec.steps().is_empty());

        token.reset();
        let result = search.run(&mut g, p(0, 0), p(3, 3), &mut rec).unwrap();
        assert!(result.is_found());
    }

    #[test]
    fn closures_see_marks_written_so_far() {
        let mut g = Grid::new(4, Adjacency::Four).unwrap();
        let mut search = PathSearch::default();
        let mut closed_seen = 0;
        let mut obs = |grid: &Grid, step: Step| {
            if let Step::Expanded(_) = step {
                closed_seen = grid
                    .cells()
                    .iter()
                    .filter(|c| c.role() == Role::Closed)
                    .count();
            }
        };
        let result = search.run(&mut g, p(0, 0), p(0, 3), &mut obs).unwrap();
        assert!(result.is_found());
        // The start is never closed and each popped cell is closed after its
        // own callback.
        assert_eq!(closed_seen + 2, search.expansions().len() - 1);
    }

    #[test]
    fn missing_endpoints() {
        let mut g = Grid::new(3, Adjacency::Four).unwrap();
        let mut search = PathSearch::default();
        assert!(matches!(
            search.run_marked(&mut g, &mut NoopObserver),
            Err(Error::MissingEndpoints)
        ));
        g.set_start(p(0, 0)).unwrap();
        assert!(matches!(
            search.run_marked(&mut g, &mut NoopObserver),
            Err(Error::MissingEndpoints)
        ));
        assert!(g.cells().iter().all(|c| !c.role().is_search_mark()));
    }

    #[test]
    fn bad_endpoints() {
        let mut g = Grid::new(3, Adjacency::Four).unwrap();
        g.set_wall(p(1, 1)).unwrap();
        let mut search = PathSearch::default();
        assert!(matches!(
            search.run(&mut g, p(0, 0), p(3, 0), &mut NoopObserver),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            search.run(&mut g, p(1, 1), p(2, 2), &mut NoopObserver),
            Err(Error::InvalidPlacement {
                target: Role::Start,
                occupant: Role::Wall,
                ..
            })
        ));
    }

    #[test]
    fn reuses_scratch_across_grid_sizes() {
        let mut search = PathSearch::default();
        let mut small = Grid::new(3, Adjacency::Four).unwrap();
        let mut big = Grid::new(10, Adjacency::Four).unwrap();
        assert!(search.run(&mut small, p(0, 0), p(2, 2), &mut NoopObserver).unwrap().is_found());
        let result = search.run(&mut big, p(9, 0), p(0, 9), &mut NoopObserver).unwrap();
        assert_eq!(result.path().unwrap().steps(), 18);
    }

    #[test]
    fn zero_weight_ignores_scent() {
        let text = "
.....
.....
S.*.E
.....
.....";
        let mut g = scented(text, Adjacency::Four);
        let mut search = PathSearch::new(SearchConfig { scent_weight: 0.0 });
        let result = search.run_marked(&mut g, &mut NoopObserver).unwrap();
        assert!(result.path().unwrap().contains(p(2, 2)));
    }
}
