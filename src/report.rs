use crate::{
    greedy_policy, Action, Convergence, Direction, EnvType, MazeConfig, MazeResult, Mdp,
    MdpSolver, Method, Position,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRow {
    pub state: Position,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QValueRow {
    pub state: Position,
    pub action: Action,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRow {
    pub state: Position,
    pub action: Action,
}

/// One line of the probability audit: p(next_state, reward | state, action).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRow {
    pub state: Position,
    pub action: Action,
    pub direction: Direction,
    pub next_state: Position,
    pub reward: f64,
    pub probability: f64,
    pub is_terminal: bool,
}

/// Solver output for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub method: Method,
    pub env_type: EnvType,
    pub gamma: f64,
    pub convergence: Convergence,
    pub values: Vec<ValueRow>,
    pub q_values: Vec<QValueRow>,
    pub policy: Vec<PolicyRow>,
    pub transitions: Vec<TransitionRow>,
}

impl Report {
    pub fn new(
        config: &MazeConfig,
        mdp: &dyn Mdp,
        solver: &dyn MdpSolver,
        convergence: Convergence,
    ) -> MazeResult<Self> {
        let values = solver
            .v_table()
            .into_iter()
            .map(|(state, value)| ValueRow { state, value })
            .collect();
        let q_values = solver
            .q_table()
            .into_iter()
            .map(|((state, action), value)| QValueRow {
                state,
                action,
                value,
            })
            .collect();
        let policy = greedy_policy(mdp, solver)?
            .into_iter()
            .map(|(state, action)| PolicyRow { state, action })
            .collect();

        Ok(Self {
            method: config.method,
            env_type: config.env_type,
            gamma: solver.gamma(),
            convergence,
            values,
            q_values,
            policy,
            transitions: transition_rows(mdp),
        })
    }
}

pub fn transition_rows(mdp: &dyn Mdp) -> Vec<TransitionRow> {
    mdp.transitions()
        .iter()
        .flat_map(|(&(state, action), ts)| {
            ts.iter().map(move |t| TransitionRow {
                state,
                action,
                direction: t.direction,
                next_state: t.next_state,
                reward: t.reward,
                probability: t.probability,
                is_terminal: t.is_terminal,
            })
        })
        .collect()
}
