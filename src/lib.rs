extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod cells;
pub mod config;
pub mod error;
pub mod maze;
pub mod mdps;
pub mod report;

pub use cells::*;
pub use config::*;
pub use error::*;
pub use maze::*;
pub use mdps::{
    maze_env::*,
    mdp::*,
    mdp_solver_policy::*,
    probability::*,
    solvers::{q_iteration::*, v_iteration::*, Convergence, MdpSolver, Phase},
};
pub use report::*;

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Location of a cell: a node id in a graph maze, a (row, col) pair on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Node(usize),
    Cell { row: usize, col: usize },
}

impl Position {
    pub fn cell(row: usize, col: usize) -> Self {
        Self::Cell { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => write!(f, "[{n}]"),
            Self::Cell { row, col } => write!(f, "[{row}, {col}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Right, Self::Left, Self::Up, Self::Down];

    /// (row, col) offset of a single move on a board.
    pub fn offset(&self) -> (isize, isize) {
        match self {
            Self::Right => (0, 1),
            Self::Left => (0, -1),
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
        }
    }
}

/// Agent-chosen actions. They are not directions: the environment decides
/// which direction an action ends up moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    A1,
    A2,
    A3,
    A4,
}

impl Action {
    pub const ALL: [Action; 4] = [Self::A1, Self::A2, Self::A3, Self::A4];

    /// Canonical direction used by deterministic environments.
    pub fn direction(&self) -> Direction {
        match self {
            Self::A1 => Direction::Right,
            Self::A2 => Direction::Left,
            Self::A3 => Direction::Up,
            Self::A4 => Direction::Down,
        }
    }
}

/// One possible outcome of taking an action in a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub direction: Direction,
    pub next_state: Position,
    pub reward: f64,
    pub probability: f64,
    pub is_terminal: bool,
}

pub type Transitions = BTreeMap<(Position, Action), Vec<Transition>>;

pub type QTable = BTreeMap<(Position, Action), f64>;

pub type VTable = BTreeMap<Position, f64>;

/// Builds the maze and environment described by `config`, solves it and
/// collects everything the presentation layer needs.
pub fn run(config: &MazeConfig) -> MazeResult<Report> {
    config.validate()?;

    let rng = &mut StdRng::seed_from_u64(config.seed);
    let env = Arc::new(config.build_environment(rng)?);
    info!(
        topology = ?env.maze().kind(),
        env_type = ?env.env_type(),
        states = env.states().len(),
        actions = env.actions().len(),
        "Environment ready"
    );

    let mdp = Arc::clone(&env) as Arc<dyn Mdp>;
    let mut solver: Box<dyn MdpSolver> = match config.method {
        Method::Q => Box::new(QIteration::new(Arc::clone(&mdp), config.gamma, rng)),
        Method::V => Box::new(VIteration::new(Arc::clone(&mdp), config.gamma, rng)),
    };

    let convergence = solver.exec(config.eps, config.iterations);
    Report::new(config, &*mdp, &*solver, convergence)
}
