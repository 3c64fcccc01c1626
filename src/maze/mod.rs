pub mod graph;
pub mod grid;

use crate::{Cell, CellKind, Direction, MazeError, MazeResult, Position};
use rand::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeKind {
    Grid { rows: usize, cols: usize },
    Graph { nodes: usize },
}

/// Cells of a maze and how they connect.
///
/// Connections are fixed at construction: a board always knows all four
/// directions of every cell (blocked moves lead back to the cell itself),
/// while a graph node only knows the directions it was given.
#[derive(Debug, Clone)]
pub struct Maze {
    kind: MazeKind,
    positions: Vec<Position>,
    cells: HashMap<Position, Cell>,
    connections: HashMap<Position, BTreeMap<Direction, Position>>,
}

impl Maze {
    pub fn kind(&self) -> MazeKind {
        self.kind
    }

    /// All positions, row-major for boards and by id for graphs.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn cell_at(&self, pos: Position) -> MazeResult<&Cell> {
        self.cells.get(&pos).ok_or(MazeError::UnknownPosition(pos))
    }

    pub fn directions_from(&self, pos: Position) -> MazeResult<Vec<Direction>> {
        self.connections
            .get(&pos)
            .map(|ds| ds.keys().copied().collect())
            .ok_or(MazeError::UnknownPosition(pos))
    }

    /// Raw neighbour in `direction`, before walls or teleports are taken into account.
    pub fn step(&self, pos: Position, direction: Direction) -> MazeResult<Position> {
        self.connections
            .get(&pos)
            .ok_or(MazeError::UnknownPosition(pos))?
            .get(&direction)
            .copied()
            .ok_or(MazeError::DirectionUnavailable {
                position: pos,
                direction,
            })
    }

    /// Where an agent stepping onto `pos` actually ends up.
    pub fn resolve(&self, pos: Position) -> MazeResult<Position> {
        Ok(self.cell_at(pos)?.teleport_target().unwrap_or(pos))
    }

    pub fn reward(&self, pos: Position) -> MazeResult<Option<f64>> {
        let target = self.resolve(pos)?;
        Ok(self.cell_at(target)?.reward())
    }

    pub fn is_terminal(&self, pos: Position) -> MazeResult<bool> {
        let target = self.resolve(pos)?;
        Ok(self.cell_at(target)?.is_terminal())
    }

    pub fn is_steppable(&self, pos: Position) -> MazeResult<bool> {
        let target = self.resolve(pos)?;
        Ok(self.cell_at(target)?.is_steppable())
    }

    /// Positions an agent can rest on: steppable cells that are not teleports.
    pub fn states(&self) -> Vec<Position> {
        self.positions
            .iter()
            .copied()
            .filter(|p| {
                self.cells
                    .get(p)
                    .is_some_and(|c| c.is_steppable() && c.teleport_target().is_none())
            })
            .collect()
    }

    pub fn bind_teleport(&mut self, teleport: Position, target: Position) -> MazeResult<()> {
        if self.cell_at(teleport)?.teleport_target().is_none() {
            return Err(MazeError::NotATeleport(teleport));
        }
        if !self.cell_at(target)?.is_teleport_target() {
            return Err(MazeError::InvalidTeleportTarget { teleport, target });
        }

        self.cells.insert(teleport, Cell::Teleport(target));
        Ok(())
    }

    fn new(
        kind: MazeKind,
        positions: Vec<Position>,
        kinds: Vec<CellKind>,
        rng: &mut impl Rng,
    ) -> MazeResult<Self> {
        let cells = bind_teleports(&positions, &kinds, rng)?;

        Ok(Self {
            kind,
            connections: positions.iter().map(|&p| (p, BTreeMap::new())).collect(),
            positions,
            cells,
        })
    }
}

/// Points every teleport at a uniformly chosen regular or terminal cell.
fn bind_teleports(
    positions: &[Position],
    kinds: &[CellKind],
    rng: &mut impl Rng,
) -> MazeResult<HashMap<Position, Cell>> {
    let targets = positions
        .iter()
        .zip(kinds)
        .filter(|(_, k)| k.is_teleport_target())
        .map(|(&p, _)| p)
        .collect::<Vec<_>>();

    positions
        .iter()
        .zip(kinds)
        .map(|(&p, &k)| {
            let target = match k {
                CellKind::Teleport => {
                    let target = *targets
                        .choose(rng)
                        .ok_or(MazeError::NoTeleportTarget(p))?;
                    debug!(teleport = %p, target = %target, "Teleport bound");
                    Some(target)
                }
                _ => None,
            };

            k.bind(target)
                .map(|c| (p, c))
                .ok_or(MazeError::NoTeleportTarget(p))
        })
        .collect()
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = |p: &Position| match self.cells.get(p) {
            Some(Cell::Regular(_)) => '.',
            Some(Cell::Terminal(_)) => 'T',
            Some(Cell::Wall) => '#',
            Some(Cell::Teleport(_)) => '@',
            None => '?',
        };

        match self.kind {
            MazeKind::Grid { cols, .. } => {
                let lines = self
                    .positions
                    .chunks(cols)
                    .map(|row| row.iter().map(symbol).collect::<String>())
                    .collect::<Vec<_>>();
                write!(f, "{}", lines.join("\n"))
            }
            MazeKind::Graph { .. } => {
                let lines = self
                    .positions
                    .iter()
                    .map(|p| {
                        let edges = self.connections[p]
                            .iter()
                            .map(|(d, t)| format!("{d:?}->{t}"))
                            .collect::<Vec<_>>();
                        format!("{p} {} {}", symbol(p), edges.join(" "))
                    })
                    .collect::<Vec<_>>();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}
