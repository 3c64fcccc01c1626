use super::{Maze, MazeKind};
use crate::{Cell, CellKind, CellSpec, Direction, MazeError, MazeResult, Position, WeightedPicker};
use rand::prelude::*;
use tracing::info;

impl Maze {
    /// Random graph of `nodes` nodes.
    ///
    /// Every regular node gets between one and four distinct directions, each
    /// leading to a uniformly chosen node (itself, walls and teleports
    /// included). Other nodes have no outgoing edges.
    pub fn graph(nodes: usize, specs: &[CellSpec], rng: &mut impl Rng) -> MazeResult<Self> {
        if nodes == 0 {
            return Err(MazeError::EmptyGraph);
        }

        let picker = WeightedPicker::<CellKind>::new(specs)?;
        let kinds = (0..nodes).map(|_| picker.pick(rng)).collect::<Vec<_>>();

        let mut maze = Self::graph_nodes(kinds, rng)?;
        for n in 0..nodes {
            let from = Position::Node(n);
            if !matches!(maze.cells[&from], Cell::Regular(_)) {
                continue;
            }

            let n_dirs = rng.gen_range(1..=Direction::ALL.len());
            let directions = Direction::ALL
                .choose_multiple(rng, n_dirs)
                .copied()
                .collect::<Vec<_>>();
            let edges = maze.connections.entry(from).or_default();
            for direction in directions {
                edges.insert(direction, Position::Node(rng.gen_range(0..nodes)));
            }
        }
        info!(nodes, "Graph maze created\n{maze}");

        Ok(maze)
    }

    /// Graph with explicit node kinds and `(from, direction, to)` edges.
    pub fn graph_from_edges(
        kinds: Vec<CellKind>,
        edges: &[(usize, Direction, usize)],
        rng: &mut impl Rng,
    ) -> MazeResult<Self> {
        if kinds.is_empty() {
            return Err(MazeError::EmptyGraph);
        }

        let mut maze = Self::graph_nodes(kinds, rng)?;
        for &(from, direction, to) in edges {
            let (from, to) = (Position::Node(from), Position::Node(to));
            if !matches!(maze.cell_at(from)?, Cell::Regular(_)) {
                return Err(MazeError::EdgeFromNonRegular(from));
            }
            maze.cell_at(to)?;

            maze.connections
                .entry(from)
                .or_default()
                .insert(direction, to);
        }

        Ok(maze)
    }

    fn graph_nodes(kinds: Vec<CellKind>, rng: &mut impl Rng) -> MazeResult<Self> {
        let nodes = kinds.len();
        let positions = (0..nodes).map(Position::Node).collect();

        Maze::new(MazeKind::Graph { nodes }, positions, kinds, rng)
    }
}
