//! Editing state behind the terminal front-end.

use log::{info, warn};

use scentgrid_core::{Adjacency, Grid, Point, Result, Role};
use scentgrid_paths::{
    CancelToken, PathResult, PathSearch, ScentConfig, ScentField, SearchConfig, StepObserver,
};

pub struct App {
    grid: Grid,
    field: ScentField,
    search: PathSearch,
    token: CancelToken,
    selected: Option<Point>,
    status: String,
}

impl App {
    /// Wrap `grid` and diffuse scent from each of `sources`.
    pub fn new(grid: Grid, field: ScentField, sources: &[Point]) -> Self {
        let token = CancelToken::new();
        let mut app = Self {
            grid,
            field,
            search: PathSearch::new(SearchConfig::default()).with_cancel_token(token.clone()),
            token,
            selected: None,
            status: String::from("place a start cell"),
        };
        for &p in sources {
            app.add_scent(p);
        }
        app
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn scent_config(&self) -> &ScentConfig {
        self.field.config()
    }

    #[inline]
    pub fn selected(&self) -> Option<Point> {
        self.selected
    }

    #[inline]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Shares the flag the search polls.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn has_endpoints(&self) -> bool {
        self.grid.start().is_some() && self.grid.end().is_some()
    }

    /// Primary click: the first free click places the Start, the next the
    /// End, every later one a wall. Clicking an endpoint only selects it.
    pub fn place(&mut self, p: Point) {
        self.selected = Some(p);
        let (start, end) = (self.grid.start(), self.grid.end());
        let edit = if start.is_none() && end != Some(p) {
            self.grid.set_start(p).map(|()| "start placed")
        } else if end.is_none() && start != Some(p) {
            self.grid.set_end(p).map(|()| "end placed")
        } else if start != Some(p) && end != Some(p) {
            self.grid.set_wall(p).map(|()| "wall placed")
        } else {
            Ok("endpoint selected")
        };
        self.report(p, edit);
    }

    /// Secondary click: back to Empty, whatever the cell was.
    pub fn erase(&mut self, p: Point) {
        self.selected = Some(p);
        let edit = self.grid.clear(p).map(|()| "cell cleared");
        self.report(p, edit);
    }

    /// Make `p` a scent source and diffuse from it.
    pub fn add_scent(&mut self, p: Point) {
        self.selected = Some(p);
        let edit = self
            .field
            .mark_source(&mut self.grid, p)
            .map(|raised| if raised > 0 { "scent spread" } else { "already a source" });
        self.report(p, edit);
    }

    /// Scent source on the last clicked cell.
    pub fn scent_selected(&mut self) {
        match self.selected {
            Some(p) => self.add_scent(p),
            None => self.status = String::from("click a cell first"),
        }
    }

    /// Turn each Empty, unscented cell into a wall with probability
    /// `density`. Returns the number of walls placed.
    pub fn scatter_walls(&mut self, density: f64) -> usize {
        let candidates: Vec<Point> = self
            .grid
            .cells()
            .iter()
            .filter(|c| c.role() == Role::Empty && c.scent() == 0.0)
            .map(|c| c.pos())
            .collect();
        let mut placed = 0;
        for p in candidates {
            if rand::random::<f64>() < density && self.grid.set_wall(p).is_ok() {
                placed += 1;
            }
        }
        self.status = format!("{placed} walls scattered");
        placed
    }

    pub fn clear_marks(&mut self) {
        self.grid.clear_search();
        self.status = String::from("search marks cleared");
    }

    pub fn reset(&mut self) {
        self.grid.reset();
        self.selected = None;
        self.status = String::from("grid reset, place a start cell");
    }

    /// Clear old marks, switch to `adjacency` and search between the
    /// endpoints, reporting each step to `observer`.
    ///
    /// Returns `None` if the search could not start.
    pub fn run_search<O>(
        &mut self,
        adjacency: Adjacency,
        observer: &mut O,
    ) -> Option<PathResult>
    where
        O: StepObserver,
    {
        self.grid.clear_search();
        self.grid.compute_neighbors(adjacency);
        self.token.reset();
        let result = match self.search.run_marked(&mut self.grid, observer) {
            Ok(result) => result,
            Err(err) => {
                warn!("search not started: {err}");
                self.status = err.to_string();
                return None;
            }
        };
        let expanded = self.search.expansions().len();
        self.status = match &result {
            PathResult::Found(path) => format!(
                "{adjacency}: path of {} steps, {expanded} cells expanded",
                path.steps()
            ),
            PathResult::NotFound => format!("{adjacency}: no path, {expanded} cells expanded"),
            PathResult::Cancelled => format!("{adjacency}: stopped after {expanded} cells"),
        };
        info!("{}", self.status);
        Some(result)
    }

    fn report(&mut self, p: Point, edit: Result<&str>) {
        match edit {
            Ok(what) => self.status = format!("{what} at {p}"),
            Err(err) => {
                warn!("edit rejected: {err}");
                self.status = err.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scentgrid_paths::{NoopObserver, RecordingObserver, Step};

    fn app(size: i32) -> App {
        let grid = Grid::new(size, Adjacency::Eight).unwrap();
        App::new(grid, ScentField::default(), &[])
    }

    fn role(app: &App, row: i32, col: i32) -> Role {
        app.grid().cell(Point::new(row, col)).unwrap().role()
    }

    #[test]
    fn clicks_place_start_end_then_walls() {
        let mut app = app(4);
        app.place(Point::new(0, 0));
        app.place(Point::new(0, 0));
        assert_eq!(app.grid().start(), Some(Point::new(0, 0)));
        assert_eq!(app.grid().end(), None);

        app.place(Point::new(3, 3));
        app.place(Point::new(1, 1));
        app.place(Point::new(3, 3));
        assert_eq!(app.grid().end(), Some(Point::new(3, 3)));
        assert_eq!(role(&app, 1, 1), Role::Wall);
        assert_eq!(role(&app, 3, 3), Role::End);
        assert!(app.has_endpoints());
    }

    #[test]
    fn erasing_the_start_frees_the_next_click() {
        let mut app = app(4);
        app.place(Point::new(0, 0));
        app.place(Point::new(3, 3));
        app.erase(Point::new(0, 0));
        assert_eq!(app.grid().start(), None);
        app.place(Point::new(2, 2));
        assert_eq!(app.grid().start(), Some(Point::new(2, 2)));
    }

    #[test]
    fn rejected_edits_show_in_status() {
        let mut app = app(4);
        app.place(Point::new(1, 1));
        app.add_scent(Point::new(1, 1));
        assert!(app.status().contains("start"));
        assert_eq!(app.grid().cell(Point::new(1, 1)).unwrap().scent(), 0.0);
        app.erase(Point::new(9, 9));
        assert!(app.status().contains("outside"));
    }

    #[test]
    fn scent_on_selected_cell() {
        let mut app = app(5);
        app.scent_selected();
        assert!(app.grid().sources().is_empty());
        app.erase(Point::new(2, 2));
        app.scent_selected();
        assert_eq!(app.grid().sources(), &[Point::new(2, 2)]);
        assert_eq!(role(&app, 2, 2), Role::Scented);
    }

    #[test]
    fn initial_sources_are_diffused() {
        let grid = Grid::new(5, Adjacency::Four).unwrap();
        let app = App::new(grid, ScentField::default(), &[Point::new(2, 2)]);
        assert_eq!(app.grid().cell(Point::new(2, 3)).unwrap().scent(), 3.0);
    }

    #[test]
    fn scatter_extremes() {
        let mut app = app(5);
        app.place(Point::new(0, 0));
        app.add_scent(Point::new(4, 4));
        assert_eq!(app.scatter_walls(0.0), 0);
        let placed = app.scatter_walls(1.0);
        let scented = app
            .grid()
            .cells()
            .iter()
            .filter(|c| c.scent() > 0.0)
            .count();
        // Everything but the Start and the scented cells.
        assert_eq!(placed, 25 - 1 - scented);
        assert_eq!(role(&app, 0, 0), Role::Start);
        assert_eq!(role(&app, 4, 4), Role::Scented);
    }

    #[test]
    fn search_needs_endpoints() {
        let mut app = app(4);
        assert!(app.run_search(Adjacency::Four, &mut NoopObserver).is_none());
        assert!(app.status().contains("start and an end"));
    }

    #[test]
    fn search_switches_adjacency() {
        let mut app = app(5);
        app.place(Point::new(0, 0));
        app.place(Point::new(4, 4));

        let result = app.run_search(Adjacency::Eight, &mut NoopObserver).unwrap();
        assert_eq!(result.path().unwrap().steps(), 4);
        assert_eq!(app.grid().adjacency(), Adjacency::Eight);

        let result = app.run_search(Adjacency::Four, &mut NoopObserver).unwrap();
        assert_eq!(result.path().unwrap().steps(), 8);
        assert!(app.status().starts_with("4-directional: path of 8 steps"));
    }

    #[test]
    fn token_stops_a_running_search() {
        let mut app = app(8);
        app.place(Point::new(0, 0));
        app.place(Point::new(7, 7));
        let token = app.cancel_token();
        let mut seen = 0;
        let mut stop_early = |_: &Grid, step: Step| {
            seen += 1;
            if matches!(step, Step::Expanded(_)) && seen == 2 {
                token.cancel();
            }
        };
        let result = app.run_search(Adjacency::Four, &mut stop_early).unwrap();
        assert_eq!(result, PathResult::Cancelled);
        assert_eq!(seen, 2);

        // The next run starts with a fresh token.
        let mut rec = RecordingObserver::new();
        assert!(app.run_search(Adjacency::Four, &mut rec).unwrap().is_found());
        assert!(rec.traced() > 0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut app = app(4);
        app.place(Point::new(0, 0));
        app.add_scent(Point::new(2, 2));
        app.reset();
        assert_eq!(app.grid().start(), None);
        assert!(app.grid().sources().is_empty());
        assert_eq!(app.selected(), None);
        assert_eq!(app.grid().size(), 4);
    }
}
