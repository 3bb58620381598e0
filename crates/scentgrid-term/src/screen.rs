//! Terminal setup and grid rendering.
//!
//! Each cell is drawn as two blank columns with a background colour, so a
//! grid cell at `(row, col)` occupies terminal columns `2 * col` and
//! `2 * col + 1` of line `row`. Two status lines follow the grid.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor, event, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use scentgrid_core::{Cell, Grid, Point, Role};
use scentgrid_paths::ScentConfig;

const EMPTY: Color = Color::Rgb { r: 172, g: 112, b: 61 };
const START: Color = Color::Rgb { r: 0, g: 0, b: 255 };
const END: Color = Color::Rgb { r: 128, g: 0, b: 128 };
const WALL: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const OPEN: Color = Color::Rgb { r: 255, g: 0, b: 0 };
const CLOSED: Color = Color::Rgb { r: 128, g: 128, b: 128 };
const PATH: Color = Color::Rgb { r: 0, g: 255, b: 0 };
const CURSOR: Color = Color::Rgb { r: 255, g: 255, b: 255 };

/// Columns per grid cell.
pub const CELL_WIDTH: u16 = 2;

/// Orange shading from pale (`heat` 0) to saturated (`heat` 1).
fn scent_color(heat: f64) -> Color {
    let fade = 1.0 - heat.clamp(0.0, 1.0);
    Color::Rgb {
        r: 255,
        g: (165.0 + 35.0 * fade) as u8,
        b: (150.0 * fade) as u8,
    }
}

fn cell_color(cell: &Cell, scent: &ScentConfig) -> Color {
    match cell.role() {
        Role::Start => START,
        Role::End => END,
        Role::Wall => WALL,
        Role::Open => OPEN,
        Role::Closed => CLOSED,
        Role::Path => PATH,
        Role::Scented => scent_color(1.0),
        Role::Empty if cell.scent() > 0.0 => scent_color(scent.heat(cell.scent())),
        Role::Empty => EMPTY,
    }
}

/// Terminal column and line to grid point, if the position is on the grid.
pub fn to_grid(grid: &Grid, column: u16, row: u16) -> Option<Point> {
    let p = Point::new(i32::from(row), i32::from(column / CELL_WIDTH));
    grid.contains(p).then_some(p)
}

/// The terminal in raw mode on the alternate screen with mouse capture.
///
/// Restores the terminal when dropped, including on early returns and
/// panics unwinding through `main`.
pub struct Screen {
    out: Stdout,
}

impl Screen {
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        crossterm::execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture,
            terminal::Clear(ClearType::All)
        )?;
        Ok(Self { out })
    }

    /// Redraw every cell, highlighting `selected`, then the status lines.
    pub fn draw(
        &mut self,
        grid: &Grid,
        scent: &ScentConfig,
        selected: Option<Point>,
        status: &str,
    ) -> io::Result<()> {
        let size = grid.size() as usize;
        for (i, cell) in grid.cells().iter().enumerate() {
            if i % size == 0 {
                queue!(self.out, cursor::MoveTo(0, (i / size) as u16))?;
            }
            let mark = if selected == Some(cell.pos()) { "[]" } else { "  " };
            queue!(
                self.out,
                SetForegroundColor(CURSOR),
                SetBackgroundColor(cell_color(cell, scent)),
                Print(mark)
            )?;
        }
        queue!(self.out, ResetColor)?;
        self.status_lines(grid.size() as u16, status)?;
        self.out.flush()
    }

    fn status_lines(&mut self, top: u16, status: &str) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, top),
            terminal::Clear(ClearType::CurrentLine),
            Print(status),
            cursor::MoveTo(0, top + 1),
            terminal::Clear(ClearType::CurrentLine),
            Print(
                "click: start/end/wall  right: clear  middle/s: scent  \
                 d/n: search 8/4  space: stop  c: clear  g: walls  r: reset  q: quit"
            )
        )
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            self.out,
            ResetColor,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
