use super::solvers::{common::expected_return, MdpSolver};
use crate::{Action, MazeError, MazeResult, Mdp, Position, QTable, VTable};
use std::collections::BTreeMap;

pub trait Policy {
    fn policy(&self, s: Position) -> MazeResult<Action>;
}

pub struct MdpSolverPolicy<'a> {
    pub mdp_solver: &'a dyn MdpSolver,
}

impl Policy for MdpSolverPolicy<'_> {
    fn policy(&self, s: Position) -> MazeResult<Action> {
        self.mdp_solver.pi_star(s)
    }
}

/// argmax_a Q(s, a). Ties go to the earliest action in `actions`.
pub fn greedy_action_q(
    mdp: &dyn Mdp,
    q: &QTable,
    s: Position,
    actions: &[Action],
) -> MazeResult<Action> {
    check_non_terminal(mdp, s, actions)?;

    argmax(actions, |a| {
        q.get(&(s, a)).copied().ok_or(MazeError::UnknownState(s))
    })
}

/// argmax_a sum(p(s+, r | s, a) * (r + gamma * V(s+))). V alone says nothing
/// about actions, hence the one step lookahead through the model.
pub fn greedy_action_v(
    mdp: &dyn Mdp,
    v: &VTable,
    gamma: f64,
    s: Position,
    actions: &[Action],
) -> MazeResult<Action> {
    if !v.contains_key(&s) {
        return Err(MazeError::UnknownState(s));
    }
    check_non_terminal(mdp, s, actions)?;

    argmax(actions, |a| {
        let ts = mdp.step(s, a)?;
        Ok(expected_return(&ts, gamma, |ns| {
            v.get(&ns).copied().unwrap_or_default()
        }))
    })
}

/// Greedy action for every non-terminal state.
pub fn greedy_policy(
    mdp: &dyn Mdp,
    solver: &dyn MdpSolver,
) -> MazeResult<BTreeMap<Position, Action>> {
    let policy = MdpSolverPolicy { mdp_solver: solver };

    mdp.states()
        .iter()
        .filter(|&&s| !mdp.is_terminal(s))
        .map(|&s| Ok((s, policy.policy(s)?)))
        .collect()
}

fn check_non_terminal(mdp: &dyn Mdp, s: Position, actions: &[Action]) -> MazeResult<()> {
    if mdp.is_terminal(s) {
        return Err(MazeError::TerminalState(s));
    }
    if actions.is_empty() {
        return Err(MazeError::NoActions);
    }

    Ok(())
}

fn argmax(
    actions: &[Action],
    value: impl Fn(Action) -> MazeResult<f64>,
) -> MazeResult<Action> {
    let mut best: Option<(Action, f64)> = None;
    for &a in actions {
        let x = value(a)?;
        if best.map_or(true, |(_, b)| x > b) {
            best = Some((a, x));
        }
    }

    best.map(|(a, _)| a).ok_or(MazeError::NoActions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellKind::*, EnvType, Maze, MazeEnvironment};
    use rand::prelude::*;

    fn corridor() -> MazeEnvironment {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze =
            Maze::from_rows(vec![vec![Terminal(0.), Regular(-1.), Regular(-1.), Terminal(5.)]], rng)
                .unwrap();
        MazeEnvironment::new(maze, EnvType::Deterministic, rng).unwrap()
    }

    #[test]
    fn q_ties_go_to_the_first_action() {
        let env = corridor();
        let s = Position::cell(0, 1);
        let q = QTable::from([
            ((s, Action::A1), 2.),
            ((s, Action::A2), 3.),
            ((s, Action::A3), 3.),
            ((s, Action::A4), 1.),
        ]);

        assert_eq!(greedy_action_q(&env, &q, s, &Action::ALL).unwrap(), Action::A2);
        assert_eq!(
            greedy_action_q(&env, &q, s, &[Action::A3, Action::A2]).unwrap(),
            Action::A3
        );
    }

    #[test]
    fn v_lookahead_picks_the_best_neighbour() {
        let env = corridor();
        let v = VTable::from([
            (Position::cell(0, 0), 0.),
            (Position::cell(0, 1), 3.),
            (Position::cell(0, 2), 5.),
            (Position::cell(0, 3), 0.),
        ]);

        // Right from (0, 2) lands on the +5 terminal.
        assert_eq!(
            greedy_action_v(&env, &v, 1., Position::cell(0, 2), &Action::ALL).unwrap(),
            Action::A1
        );
        // From (0, 1): right gives -1 + 5, left gives 0 + 0.
        assert_eq!(
            greedy_action_v(&env, &v, 1., Position::cell(0, 1), &Action::ALL).unwrap(),
            Action::A1
        );
    }

    #[test]
    fn preconditions_are_reported() {
        let env = corridor();
        let v = VTable::from([(Position::cell(0, 1), 0.)]);
        let q = QTable::from([((Position::cell(0, 1), Action::A1), 0.)]);

        assert!(matches!(
            greedy_action_q(&env, &q, Position::cell(0, 0), &Action::ALL),
            Err(MazeError::TerminalState(_))
        ));
        assert!(matches!(
            greedy_action_q(&env, &q, Position::cell(0, 2), &Action::ALL),
            Err(MazeError::UnknownState(_))
        ));
        assert!(matches!(
            greedy_action_q(&env, &q, Position::cell(0, 1), &[]),
            Err(MazeError::NoActions)
        ));
        assert!(matches!(
            greedy_action_v(&env, &v, 1., Position::cell(0, 2), &Action::ALL),
            Err(MazeError::UnknownState(_))
        ));
    }
}
