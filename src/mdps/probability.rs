use crate::{Action, Direction, Maze, MazeError, MazeResult, Position};
use itertools::iproduct;
use rand::prelude::*;
use rand_distr::Dirichlet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvType {
    /// Every action moves in exactly one direction.
    Deterministic,
    /// Every action spreads over the available directions with frozen random weights.
    Stochastic,
}

pub type DirectionProbabilities = BTreeMap<Direction, f64>;

/// `p(direction | state, action)` for every state and action of an environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityTable {
    table: HashMap<(Position, Action), DirectionProbabilities>,
}

impl ProbabilityTable {
    pub fn new(
        maze: &Maze,
        states: &[Position],
        actions: &[Action],
        env_type: EnvType,
        rng: &mut impl Rng,
    ) -> MazeResult<Self> {
        let mut table = HashMap::new();
        for (s, a) in iproduct!(states.iter().copied(), actions.iter().copied()) {
            let directions = maze.directions_from(s)?;
            let row = match env_type {
                EnvType::Deterministic => deterministic(&directions, a, rng),
                EnvType::Stochastic => stochastic(&directions, rng)?,
            };
            trace!(state = %s, action = ?a, ?row, "Probabilities drawn");

            table.insert((s, a), row);
        }

        Ok(Self { table })
    }

    /// Table with hand-picked rows, for environments whose dynamics are known upfront.
    pub fn from_rows(
        rows: impl IntoIterator<Item = ((Position, Action), DirectionProbabilities)>,
    ) -> Self {
        Self {
            table: rows.into_iter().collect(),
        }
    }

    pub fn row(&self, state: Position, action: Action) -> MazeResult<&DirectionProbabilities> {
        self.table
            .get(&(state, action))
            .ok_or(MazeError::UnknownStateAction { state, action })
    }

    pub fn probability(
        &self,
        state: Position,
        action: Action,
        direction: Direction,
    ) -> MazeResult<f64> {
        self.row(state, action)?
            .get(&direction)
            .copied()
            .ok_or(MazeError::DirectionUnavailable {
                position: state,
                direction,
            })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Position, Action), &DirectionProbabilities)> {
        self.table.iter()
    }
}

/// Certainty on the action's canonical direction. Sparse graph nodes may not
/// have it, in which case a random available direction takes its place.
fn deterministic(
    directions: &[Direction],
    a: Action,
    rng: &mut impl Rng,
) -> DirectionProbabilities {
    let chosen = if directions.contains(&a.direction()) {
        Some(a.direction())
    } else {
        directions.choose(rng).copied()
    };

    directions
        .iter()
        .map(|&d| (d, if Some(d) == chosen { 1. } else { 0. }))
        .collect()
}

/// Dirichlet(1, ..., 1) weights rounded to three decimals. The rounding error
/// goes to the largest weight so that the row still sums to one.
fn stochastic(directions: &[Direction], rng: &mut impl Rng) -> MazeResult<DirectionProbabilities> {
    let mut probs = match directions.len() {
        0 => return Ok(DirectionProbabilities::new()),
        1 => vec![1.],
        n => Dirichlet::new(&vec![1.; n])
            .map_err(|e| MazeError::Sampling(e.to_string()))?
            .sample(rng)
            .into_iter()
            .map(round3)
            .collect(),
    };

    let largest = probs
        .iter()
        .enumerate()
        .max_by(|x, y| x.1.total_cmp(y.1))
        .map_or(0, |(i, _)| i);
    let rest: f64 = probs
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != largest)
        .map(|(_, p)| p)
        .sum();
    probs[largest] = round3(1. - rest);

    Ok(directions.iter().copied().zip(probs).collect())
}

fn round3(p: f64) -> f64 {
    (p * 1000.).round() / 1000.
}
