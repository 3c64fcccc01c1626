use super::{common::*, Convergence, MdpSolver, Phase};
use crate::{
    greedy_action_v, Action, MazeError, MazeResult, Mdp, Position, QTable, Transitions, VTable,
};
use rand::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Value iteration on V:
/// v(s) = max_{a}{sum(p(s+, r | s, a) * (r + gamma * v(s+)))}
///
/// Q is never stored. It is recovered by one step lookahead when asked for.
pub struct VIteration {
    mdp: Arc<dyn Mdp>,
    transitions: Arc<Transitions>,
    gamma: f64,
    v: VTable,
    phase: Phase,
}

impl VIteration {
    pub fn new(mdp: Arc<dyn Mdp>, gamma: f64, rng: &mut impl Rng) -> Self {
        let v = mdp
            .states()
            .iter()
            .map(|&s| (s, seed_value(&*mdp, s, rng)))
            .collect();

        Self {
            transitions: mdp.transitions(),
            mdp,
            gamma,
            v,
            phase: Phase::Initialized,
        }
    }

    pub fn v(&self) -> &VTable {
        &self.v
    }

    pub fn sweep(&mut self) -> f64 {
        let next = self
            .mdp
            .states()
            .iter()
            .map(|&s| {
                if self.mdp.is_terminal(s) {
                    return (s, self.v[&s]);
                }

                let v = self
                    .mdp
                    .actions()
                    .iter()
                    .map(|&a| self.lookahead(s, a))
                    .fold(f64::NEG_INFINITY, f64::max);
                (s, v)
            })
            .collect::<VTable>();

        let err = max_abs_diff(self.v.values().zip(next.values()));
        self.v = next;

        err
    }

    fn lookahead(&self, s: Position, a: Action) -> f64 {
        let ts = self
            .transitions
            .get(&(s, a))
            .map_or(&[][..], |ts| ts.as_slice());

        expected_return(ts, self.gamma, |ns| {
            self.v.get(&ns).copied().unwrap_or_default()
        })
    }
}

impl MdpSolver for VIteration {
    fn v_star(&self, s: Position) -> MazeResult<f64> {
        self.v.get(&s).copied().ok_or(MazeError::UnknownState(s))
    }

    /// Zero for terminal states, as in the Q formulation.
    fn q_star(&self, s: Position, a: Action) -> MazeResult<f64> {
        if !self.transitions.contains_key(&(s, a)) {
            return Err(MazeError::UnknownState(s));
        }
        if self.mdp.is_terminal(s) {
            return Ok(0.);
        }

        Ok(self.lookahead(s, a))
    }

    fn pi_star(&self, s: Position) -> MazeResult<Action> {
        greedy_action_v(&*self.mdp, &self.v, self.gamma, s, self.mdp.actions())
    }

    fn exec(&mut self, eps: f64, iterations: usize) -> Convergence {
        self.phase = Phase::Iterating;
        for iteration in 0..iterations {
            let err = self.sweep();
            debug!(iteration, err, "V sweep done");

            if err < eps {
                self.phase = Phase::Converged;
                info!(iteration, eps, "V iteration converged");
                return Convergence::Converged(iteration);
            }
        }

        self.phase = Phase::Exhausted;
        warn!(iterations, eps, "V iteration ran out of iterations");
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
        self.transitions
            .keys()
            .filter_map(|&(s, a)| self.q_star(s, a).ok().map(|q| ((s, a), q)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellKind::*, EnvType, Maze, MazeEnvironment};
    use float_eq::*;

    #[test]
    fn corridor_values() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze = Maze::from_rows(
            vec![vec![Regular(-1.), Regular(-1.), Terminal(10.)]],
            rng,
        )
        .unwrap();
        let mdp: Arc<dyn Mdp> =
            Arc::new(MazeEnvironment::new(maze, EnvType::Deterministic, rng).unwrap());

        let mut vi = VIteration::new(Arc::clone(&mdp), 1., rng);
        let ret = vi.exec(1e-9, 100);

        assert!(ret.is_converged());
        assert_float_eq!(vi.v_star(Position::cell(0, 2)).unwrap(), 0., abs <= 1e-12);
        assert_float_eq!(vi.v_star(Position::cell(0, 1)).unwrap(), 10., abs <= 1e-9);
        assert_float_eq!(vi.v_star(Position::cell(0, 0)).unwrap(), 9., abs <= 1e-9);
        assert_float_eq!(vi.q_star(Position::cell(0, 0), Action::A2).unwrap(), 8., abs <= 1e-9);
        assert_eq!(vi.q_star(Position::cell(0, 2), Action::A2).unwrap(), 0.);
        assert_eq!(vi.pi_star(Position::cell(0, 0)).unwrap(), Action::A1);
        assert!(matches!(
            vi.pi_star(Position::cell(0, 2)),
            Err(MazeError::TerminalState(_))
        ));
    }
}
