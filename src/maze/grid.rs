use super::{Maze, MazeKind};
use crate::{CellKind, CellSpec, Direction, MazeError, MazeResult, Position, WeightedPicker};
use rand::prelude::*;
use tracing::info;

impl Maze {
    /// Random `rows` x `cols` board with cell kinds drawn from `specs`.
    pub fn grid(
        rows: usize,
        cols: usize,
        specs: &[CellSpec],
        rng: &mut impl Rng,
    ) -> MazeResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::InvalidDimensions { rows, cols });
        }

        let picker = WeightedPicker::<CellKind>::new(specs)?;
        let layout = (0..rows)
            .map(|_| (0..cols).map(|_| picker.pick(rng)).collect())
            .collect();

        Self::from_rows(layout, rng)
    }

    /// Board with an explicit layout. Teleports are bound at random.
    pub fn from_rows(layout: Vec<Vec<CellKind>>, rng: &mut impl Rng) -> MazeResult<Self> {
        let rows = layout.len();
        let cols = layout.first().map_or(0, |r| r.len());
        if rows == 0 || cols == 0 {
            return Err(MazeError::InvalidDimensions { rows, cols });
        }
        if let Some((row, r)) = layout.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MazeError::InconsistentRows {
                row,
                expected: cols,
                found: r.len(),
            });
        }

        let positions = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Position::cell(row, col)))
            .collect::<Vec<_>>();
        let kinds = layout.into_iter().flatten().collect();

        let mut maze = Maze::new(MazeKind::Grid { rows, cols }, positions, kinds, rng)?;
        maze.connect_grid(rows, cols);
        info!(rows, cols, "Board maze created\n{maze}");

        Ok(maze)
    }

    fn connect_grid(&mut self, rows: usize, cols: usize) {
        for &pos in &self.positions {
            let Position::Cell { row, col } = pos else {
                continue;
            };

            let edges = self.connections.entry(pos).or_default();
            for direction in Direction::ALL {
                let next = neighbour(rows, cols, row, col, direction)
                    .filter(|n| self.cells.get(n).is_some_and(|c| c.is_steppable()))
                    .unwrap_or(pos);
                edges.insert(direction, next);
            }
        }
    }
}

fn neighbour(
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    direction: Direction,
) -> Option<Position> {
    let (dr, dc) = direction.offset();
    let row = row.checked_add_signed(dr).filter(|&r| r < rows)?;
    let col = col.checked_add_signed(dc).filter(|&c| c < cols)?;

    Some(Position::cell(row, col))
}
