//! Maze grid: immutable walls plus consumable dots and power pellets
//!
//! Cells are addressed by integer `(x, y)`; anything outside the grid reads as
//! a wall. The counter of remaining collectibles is kept in lockstep with the
//! cell contents by every mutating method.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use crate::cell_of;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Dot,
    PowerPellet,
}

impl Cell {
    fn from_char(c: char) -> Self {
        match c {
            '#' => Cell::Wall,
            '.' => Cell::Dot,
            'o' => Cell::PowerPellet,
            _ => Cell::Empty,
        }
    }

    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Cell::Dot | Cell::PowerPellet)
    }

    /// Points awarded for consuming this cell
    pub fn score(self) -> u32 {
        match self {
            Cell::Dot => DOT_SCORE,
            Cell::PowerPellet => POWER_PELLET_SCORE,
            Cell::Empty | Cell::Wall => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    width: i32,
    height: i32,
    /// Row-major cell storage
    cells: Vec<Cell>,
    remaining: u32,
}

impl Default for Maze {
    fn default() -> Self {
        Self::classic()
    }
}

impl Maze {
    /// The built-in layout
    pub fn classic() -> Self {
        Self::from_rows(&MAZE_TEMPLATE)
    }

    /// Parse a layout from ASCII rows. Short rows are padded with walls.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;

        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let mut parsed: Vec<Cell> = row.chars().map(Cell::from_char).collect();
            parsed.resize(width as usize, Cell::Wall);
            cells.extend(parsed);
        }

        let remaining = cells.iter().filter(|c| c.is_collectible()).count() as u32;
        Self {
            width,
            height,
            cells,
            remaining,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Contents of a cell; out-of-bounds cells are walls
    pub fn cell_at(&self, x: i32, y: i32) -> Cell {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(Cell::Wall)
    }

    /// Whether the cell can be occupied
    pub fn is_open(&self, cell: IVec2) -> bool {
        !self.cell_at(cell.x, cell.y).is_wall()
    }

    /// Whether a continuous position lies in an open cell
    ///
    /// On the tunnel row positions past either edge wrap to the opposite side.
    pub fn is_walkable(&self, pos: Vec2) -> bool {
        let mut cell = cell_of(pos);
        if self.is_tunnel_row(cell.y) && self.width > 0 {
            cell.x = cell.x.rem_euclid(self.width);
        }
        self.is_open(cell)
    }

    /// Consume a dot or pellet, returning its score (0 if nothing was there)
    pub fn consume_collectible(&mut self, x: i32, y: i32) -> u32 {
        let Some(i) = self.index(x, y) else {
            return 0;
        };
        let cell = self.cells[i];
        if !cell.is_collectible() {
            return 0;
        }
        self.cells[i] = Cell::Empty;
        self.remaining -= 1;
        cell.score()
    }

    /// Overwrite a cell, keeping the collectible count exact
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i].is_collectible() {
            self.remaining -= 1;
        }
        if cell.is_collectible() {
            self.remaining += 1;
        }
        self.cells[i] = cell;
    }

    pub fn remaining_collectibles(&self) -> u32 {
        self.remaining
    }

    /// All cells in row-major order, for drawing
    pub fn cells(&self) -> impl Iterator<Item = (IVec2, Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (IVec2::new(i as i32 % width, i as i32 / width), c))
    }

    pub fn is_tunnel_row(&self, y: i32) -> bool {
        y == TUNNEL_ROW
    }

    /// Whether a cell lies inside the pursuer pen
    pub fn in_pen(&self, cell: IVec2) -> bool {
        cell.cmpge(PEN_MIN).all() && cell.cmple(PEN_MAX).all()
    }

    /// Adjacent cell, wrapping horizontally on the tunnel row
    pub fn neighbor(&self, cell: IVec2, dir: Direction) -> IVec2 {
        let mut next = cell + dir.offset();
        if self.is_tunnel_row(cell.y) && self.width > 0 {
            next.x = next.x.rem_euclid(self.width);
        }
        next
    }
}
