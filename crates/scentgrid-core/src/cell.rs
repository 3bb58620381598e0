//! The [`Cell`] type: one grid location with a [`Role`] and a scent value.

use std::fmt;

use crate::geom::Point;

/// What a cell currently is, as far as editing and searching are concerned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    #[default]
    Empty,
    Start,
    End,
    Wall,
    /// In the search frontier.
    Open,
    /// Expanded by the search.
    Closed,
    /// Part of the reconstructed path.
    Path,
    /// A scent source.
    Scented,
}

impl Role {
    /// Whether a search may step onto the cell.
    #[inline]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Walls, Start and End never carry scent and never relay it.
    #[inline]
    pub const fn blocks_scent(self) -> bool {
        matches!(self, Self::Wall | Self::Start | Self::End)
    }

    /// Start or End.
    #[inline]
    pub const fn is_endpoint(self) -> bool {
        matches!(self, Self::Start | Self::End)
    }

    /// Marks written by a search run.
    #[inline]
    pub const fn is_search_mark(self) -> bool {
        matches!(self, Self::Open | Self::Closed | Self::Path)
    }

    /// Character used by the [layout](crate::layout) text format.
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Start => 'S',
            Self::End => 'E',
            Self::Wall => '#',
            Self::Open => 'o',
            Self::Closed => 'x',
            Self::Path => '+',
            Self::Scented => '*',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Start => "start",
            Self::End => "end",
            Self::Wall => "wall",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Path => "path",
            Self::Scented => "scent source",
        };
        f.write_str(name)
    }
}

/// A single grid location.
///
/// Role and scent are independent: an Empty, Open, Closed or Path cell may
/// carry scent, while Wall, Start and End cells always read zero. Cells are
/// only mutated through [`Grid`](crate::Grid), which upholds that rule.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pos: Point,
    role: Role,
    scent: f64,
}

impl Cell {
    /// An Empty, unscented cell at `pos`.
    #[inline]
    pub const fn new(pos: Point) -> Self {
        Self {
            pos,
            role: Role::Empty,
            scent: 0.0,
        }
    }

    #[inline]
    pub const fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Current scent intensity, always `>= 0`.
    #[inline]
    pub const fn scent(&self) -> f64 {
        self.scent
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.role == Role::Wall
    }

    /// Set the role, zeroing scent when the new role cannot carry it.
    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
        if role.blocks_scent() {
            self.scent = 0.0;
        }
    }

    pub(crate) fn set_scent(&mut self, scent: f64) {
        self.scent = scent.max(0.0);
    }

    /// Back to Empty with no scent.
    pub(crate) fn reset(&mut self) {
        self.role = Role::Empty;
        self.scent = 0.0;
    }
}
