//! `scentgrid`: draw walls and scent sources with the mouse, then watch a
//! scent-weighted search cross the grid.
//!
//! ```text
//! scentgrid [LAYOUT_FILE]
//! ```

mod app;
mod screen;

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

use scentgrid_core::{Adjacency, Grid, GridConfig, Layout, Point, Result};
use scentgrid_paths::{CancelToken, ScentConfig, ScentField, Step, StepObserver};

use app::App;
use screen::{Screen, to_grid};

/// Pause between drawn search steps; key presses end it early.
const STEP_DELAY: Duration = Duration::from_millis(4);

/// Chance that `g` turns a free cell into a wall.
const WALL_DENSITY: f64 = 0.25;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("scentgrid: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let (grid, sources) = load(std::env::args().nth(1))?;
    let mut app = App::new(grid, ScentField::default(), &sources);
    let mut screen = Screen::open()?;
    event_loop(&mut app, &mut screen)
}

fn load(path: Option<String>) -> Result<(Grid, Vec<Point>)> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(Layout::parse(&text, Adjacency::default())?.into_parts())
        }
        None => Ok((Grid::from_config(&GridConfig::default())?, Vec::new())),
    }
}

fn event_loop(app: &mut App, screen: &mut Screen) -> Result<()> {
    loop {
        screen.draw(app.grid(), app.scent_config(), app.selected(), app.status())?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('s') => app.scent_selected(),
                KeyCode::Char('d') => {
                    if search(app, screen, Adjacency::Eight)? {
                        return Ok(());
                    }
                }
                KeyCode::Char('n') => {
                    if search(app, screen, Adjacency::Four)? {
                        return Ok(());
                    }
                }
                KeyCode::Char('c') => app.clear_marks(),
                KeyCode::Char('r') => app.reset(),
                KeyCode::Char('g') => {
                    app.scatter_walls(WALL_DENSITY);
                }
                _ => {}
            },
            Event::Mouse(me) => {
                let Some(p) = to_grid(app.grid(), me.column, me.row) else {
                    continue;
                };
                match me.kind {
                    MouseEventKind::Down(MouseButton::Left) => app.place(p),
                    MouseEventKind::Drag(MouseButton::Left) if app.has_endpoints() => {
                        app.place(p);
                    }
                    MouseEventKind::Down(MouseButton::Right)
                    | MouseEventKind::Drag(MouseButton::Right) => app.erase(p),
                    MouseEventKind::Down(MouseButton::Middle) => app.add_scent(p),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

/// Run one animated search. Returns `true` if the user asked to quit
/// while it ran.
fn search(app: &mut App, screen: &mut Screen, adjacency: Adjacency) -> Result<bool> {
    let mut live = LiveView {
        screen,
        scent: *app.scent_config(),
        token: app.cancel_token(),
        quit: false,
        error: None,
    };
    app.run_search(adjacency, &mut live);
    if let Some(err) = live.error {
        return Err(err.into());
    }
    Ok(live.quit)
}

/// Redraws the grid after every search step and watches the keyboard.
///
/// Space stops the search; `q` and Esc stop it and quit. A terminal error
/// also stops the search and is handed back once it has returned.
struct LiveView<'a> {
    screen: &'a mut Screen,
    scent: ScentConfig,
    token: CancelToken,
    quit: bool,
    error: Option<io::Error>,
}

impl LiveView<'_> {
    fn refresh(&mut self, grid: &Grid, step: Step) -> io::Result<()> {
        let status = match step {
            Step::Expanded(p) => format!("searching, expanded {p}  (space to stop)"),
            Step::Traced(p) => format!("tracing path through {p}"),
        };
        self.screen.draw(grid, &self.scent, None, &status)?;

        if !event::poll(STEP_DELAY)? {
            return Ok(());
        }
        let Event::Key(key) = event::read()? else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        match key.code {
            KeyCode::Char(' ') => self.token.cancel(),
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                self.token.cancel();
            }
            _ => {}
        }
        Ok(())
    }
}

impl StepObserver for LiveView<'_> {
    fn on_step(&mut self, grid: &Grid, step: Step) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.refresh(grid, step) {
            self.error = Some(err);
            self.token.cancel();
        }
    }
}
