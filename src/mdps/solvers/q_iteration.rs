use super::{common::*, Convergence, MdpSolver, Phase};
use crate::{
    greedy_action_q, Action, MazeError, MazeResult, Mdp, Position, QTable, Transitions, VTable,
};
use rand::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

type Backup = ((Position, Action), f64);

/// Value iteration on Q alone:
/// q(s, a) = sum(p(s+, r | s, a) * (r + gamma * max_{a+}{q(s+, a+)}))
///
/// Sweeps are synchronous. Every backup reads the table produced by the
/// previous sweep, and the new table replaces it only once it is complete.
#[derive(Clone)]
pub struct QIteration {
    mdp: Arc<dyn Mdp>,
    transitions: Arc<Transitions>,
    gamma: f64,
    q: QTable,
    v: VTable,
    phase: Phase,
}

impl QIteration {
    pub fn new(mdp: Arc<dyn Mdp>, gamma: f64, rng: &mut impl Rng) -> Self {
        let mut q = QTable::new();
        for &s in mdp.states() {
            for &a in mdp.actions() {
                q.insert((s, a), seed_value(&*mdp, s, rng));
            }
        }
        let v = derive_v(&*mdp, &q);

        Self {
            transitions: mdp.transitions(),
            mdp,
            gamma,
            q,
            v,
            phase: Phase::Initialized,
        }
    }

    pub fn q(&self) -> &QTable {
        &self.q
    }

    /// max_a Q(s, a) for every state, refreshed after each sweep.
    pub fn v(&self) -> &VTable {
        &self.v
    }

    /// One synchronous Bellman backup over every non-terminal state. Returns
    /// the largest change to any Q value.
    pub fn sweep(&mut self) -> f64 {
        let updates = self.backups();
        self.apply(updates)
    }

    #[cfg(feature = "parallel")]
    fn backups(&self) -> Vec<Backup> {
        self.mdp
            .states()
            .par_iter()
            .flat_map_iter(|&s| self.backup(s))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn backups(&self) -> Vec<Backup> {
        self.mdp
            .states()
            .iter()
            .flat_map(|&s| self.backup(s))
            .collect()
    }

    /// Swaps in the table built from `updates`, leaving terminal entries alone.
    fn apply(&mut self, updates: Vec<Backup>) -> f64 {
        let mut next = self.q.clone();
        next.extend(updates);

        let delta = max_abs_diff(self.q.values().zip(next.values()));
        self.q = next;
        self.v = derive_v(&*self.mdp, &self.q);

        delta
    }

    fn backup(&self, s: Position) -> Vec<Backup> {
        if self.mdp.is_terminal(s) {
            return vec![];
        }

        self.mdp
            .actions()
            .iter()
            .map(|&a| {
                let ts = self
                    .transitions
                    .get(&(s, a))
                    .map_or(&[][..], |ts| ts.as_slice());
                // Successors are always states, so their V is always known.
                let q = expected_return(ts, self.gamma, |ns| {
                    self.v.get(&ns).copied().unwrap_or_default()
                });
                ((s, a), q)
            })
            .collect()
    }
}

fn derive_v(mdp: &dyn Mdp, q: &QTable) -> VTable {
    mdp.states()
        .iter()
        .map(|&s| {
            let v = mdp
                .actions()
                .iter()
                .filter_map(|&a| q.get(&(s, a)))
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            (s, v)
        })
        .collect()
}

impl MdpSolver for QIteration {
    fn v_star(&self, s: Position) -> MazeResult<f64> {
        self.v.get(&s).copied().ok_or(MazeError::UnknownState(s))
    }

    fn q_star(&self, s: Position, a: Action) -> MazeResult<f64> {
        self.q.get(&(s, a)).copied().ok_or(MazeError::UnknownState(s))
    }

    fn pi_star(&self, s: Position) -> MazeResult<Action> {
        greedy_action_q(&*self.mdp, &self.q, s, self.mdp.actions())
    }

    fn exec(&mut self, eps: f64, iterations: usize) -> Convergence {
        self.phase = Phase::Iterating;
        for iteration in 0..iterations {
            let err = self.sweep();
            debug!(iteration, err, "Q sweep done");

            if err < eps {
                self.phase = Phase::Converged;
                info!(iteration, eps, "Q iteration converged");
                return Convergence::Converged(iteration);
            }
        }

        self.phase = Phase::Exhausted;
        warn!(iterations, eps, "Q iteration ran out of iterations");
        Convergence::Exhausted(iterations)
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn v_table(&self) -> VTable {
        self.v.clone()
    }

    fn q_table(&self) -> QTable {
        self.q.clone()
    }
}
