pub mod common;
pub mod q_iteration;
pub mod v_iteration;

use crate::{Action, MazeResult, Position, QTable, VTable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initialized,
    Iterating,
    Converged,
    Exhausted,
}

/// How a run of value iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    /// Index of the sweep that changed no value by `eps` or more.
    Converged(usize),
    /// The iteration budget, which ran out first.
    Exhausted(usize),
}

impl Convergence {
    pub fn sweeps(&self) -> usize {
        match self {
            Self::Converged(k) | Self::Exhausted(k) => *k,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }
}

pub trait MdpSolver {
    fn v_star(&self, s: Position) -> MazeResult<f64>;

    fn q_star(&self, s: Position, a: Action) -> MazeResult<f64>;

    fn pi_star(&self, s: Position) -> MazeResult<Action>;

    fn exec(&mut self, eps: f64, iterations: usize) -> Convergence;

    fn phase(&self) -> Phase;

    fn gamma(&self) -> f64;

    fn v_table(&self) -> VTable;

    fn q_table(&self) -> QTable;
}
