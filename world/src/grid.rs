//! Row-major storage for the downward-growing grid.

use std::ops::Range;

use rootbound_core::{Coord, EntityId};

use crate::{
    fluid::Water,
    tiles::{RootTile, Tile},
};

/// Contents of a single grid square.
#[derive(Clone, Debug)]
pub(crate) struct GridSquare {
    pub(crate) tile: Tile,
    /// Entities overlapping the square, in arrival order.
    pub(crate) entities: Vec<EntityId>,
    pub(crate) water: Water,
}

impl GridSquare {
    pub(crate) fn new(tile: Tile) -> Self {
        Self {
            tile,
            entities: Vec::new(),
            water: Water::default(),
        }
    }
}

/// Grid rows indexed by depth; row `r` holds the squares with `y == -r`.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    width: u32,
    rows: Vec<Vec<GridSquare>>,
}

impl Grid {
    pub(crate) fn new(width: u32) -> Self {
        Self {
            width,
            rows: Vec::new(),
        }
    }

    pub(crate) const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows generated so far.
    pub(crate) fn row_count(&self) -> u32 {
        u32::try_from(self.rows.len()).unwrap_or(u32::MAX)
    }

    /// Whether the coordinate lies inside the playable columns at or below the surface.
    pub(crate) fn in_bounds(&self, coord: Coord) -> bool {
        coord.y() <= 0 && coord.x() >= 0 && i64::from(coord.x()) < i64::from(self.width)
    }

    fn index(&self, coord: Coord) -> Option<(usize, usize)> {
        if !self.in_bounds(coord) {
            return None;
        }
        let row = usize::try_from(-i64::from(coord.y())).ok()?;
        let column = usize::try_from(coord.x()).ok()?;
        (row < self.rows.len()).then_some((row, column))
    }

    pub(crate) fn square(&self, coord: Coord) -> Option<&GridSquare> {
        let (row, column) = self.index(coord)?;
        self.rows.get(row)?.get(column)
    }

    pub(crate) fn square_mut(&mut self, coord: Coord) -> Option<&mut GridSquare> {
        let (row, column) = self.index(coord)?;
        self.rows.get_mut(row)?.get_mut(column)
    }

    pub(crate) fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.square(coord).map(|square| &square.tile)
    }

    pub(crate) fn root(&self, coord: Coord) -> Option<&RootTile> {
        self.tile(coord).and_then(Tile::as_root)
    }

    pub(crate) fn root_mut(&mut self, coord: Coord) -> Option<&mut RootTile> {
        self.square_mut(coord)
            .and_then(|square| square.tile.as_root_mut())
    }

    pub(crate) fn push_row(&mut self, row: Vec<GridSquare>) {
        debug_assert_eq!(row.len(), self.width as usize);
        self.rows.push(row);
    }

    /// Coordinates of every generated square in the provided rows, top to bottom.
    pub(crate) fn coords_in_rows(&self, rows: Range<u32>) -> Vec<Coord> {
        let end = rows.end.min(self.row_count());
        let mut coords = Vec::new();
        for row in rows.start..end {
            let y = -i32::try_from(row).unwrap_or(i32::MAX);
            for x in 0..self.width {
                coords.push(Coord::new(x as i32, y));
            }
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_rows(width: u32, rows: u32) -> Grid {
        let mut grid = Grid::new(width);
        for _ in 0..rows {
            grid.push_row((0..width).map(|_| GridSquare::new(Tile::Air)).collect());
        }
        grid
    }

    #[test]
    fn lookups_respect_bounds_and_generated_rows() {
        let grid = grid_with_rows(3, 2);
        assert!(grid.square(Coord::new(0, 0)).is_some());
        assert!(grid.square(Coord::new(2, -1)).is_some());
        assert!(grid.square(Coord::new(3, 0)).is_none());
        assert!(grid.square(Coord::new(-1, 0)).is_none());
        assert!(grid.square(Coord::new(0, 1)).is_none());
        assert!(grid.square(Coord::new(0, -2)).is_none());
        assert!(grid.in_bounds(Coord::new(0, -2)));
    }

    #[test]
    fn row_coordinates_are_clamped_to_generated_rows() {
        let grid = grid_with_rows(2, 2);
        let coords = grid.coords_in_rows(1..5);
        assert_eq!(coords, vec![Coord::new(0, -1), Coord::new(1, -1)]);
    }
}
