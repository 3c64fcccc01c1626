use crate::{
    Action, Direction, EnvType, Maze, MazeError, MazeResult, Mdp, Position, ProbabilityTable,
    Transition, Transitions,
};
use itertools::{iproduct, Itertools};
use rand::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Wraps a maze into an MDP: given a state and an action it tells where the
/// agent may end up, with what reward and with what probability.
#[derive(Debug)]
pub struct MazeEnvironment {
    maze: Maze,
    env_type: EnvType,
    states: Vec<Position>,
    actions: Vec<Action>,
    terminals: HashSet<Position>,
    probabilities: ProbabilityTable,
    transitions: Arc<Transitions>,
}

impl MazeEnvironment {
    pub fn new(maze: Maze, env_type: EnvType, rng: &mut impl Rng) -> MazeResult<Self> {
        Self::with_actions(maze, env_type, &Action::ALL, rng)
    }

    pub fn with_actions(
        maze: Maze,
        env_type: EnvType,
        actions: &[Action],
        rng: &mut impl Rng,
    ) -> MazeResult<Self> {
        let states = maze.states();
        let probabilities = ProbabilityTable::new(&maze, &states, actions, env_type, rng)?;

        Self::with_probabilities(maze, env_type, actions, probabilities)
    }

    /// Environment over an already drawn probability table, e.g. to compare
    /// solvers on identical dynamics.
    pub fn with_probabilities(
        maze: Maze,
        env_type: EnvType,
        actions: &[Action],
        probabilities: ProbabilityTable,
    ) -> MazeResult<Self> {
        if actions.is_empty() || !actions.iter().all_unique() {
            return Err(MazeError::InvalidActions);
        }

        let states = maze.states();
        let mut terminals = HashSet::new();
        for &s in &states {
            if maze.is_terminal(s)? {
                terminals.insert(s);
            }
        }

        let mut transitions = Transitions::new();
        for (s, a) in iproduct!(states.iter().copied(), actions.iter().copied()) {
            let ts = maze
                .directions_from(s)?
                .into_iter()
                .map(|d| {
                    let p = probabilities.probability(s, a, d)?;
                    resolve_transition(&maze, s, d, p)
                })
                .collect::<MazeResult<Vec<_>>>()?;
            transitions.insert((s, a), ts);
        }
        debug!(
            states = states.len(),
            pairs = transitions.len(),
            ?env_type,
            "Transition model built"
        );

        Ok(Self {
            maze,
            env_type,
            states,
            actions: actions.to_vec(),
            terminals,
            probabilities,
            transitions: Arc::new(transitions),
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn env_type(&self) -> EnvType {
        self.env_type
    }

    pub fn probabilities(&self) -> &ProbabilityTable {
        &self.probabilities
    }

    pub fn probability(
        &self,
        state: Position,
        action: Action,
        direction: Direction,
    ) -> MazeResult<f64> {
        self.probabilities.probability(state, action, direction)
    }
}

/// Outcome of moving from `s` in direction `d`. Walls bounce the agent back
/// to `s` (with the reward of `s`), teleports hand it over to their target.
fn resolve_transition(
    maze: &Maze,
    s: Position,
    d: Direction,
    probability: f64,
) -> MazeResult<Transition> {
    let next = maze.step(s, d)?;
    let next_state = if maze.is_steppable(next)? {
        maze.resolve(next)?
    } else {
        s
    };

    Ok(Transition {
        direction: d,
        next_state,
        reward: maze
            .reward(next_state)?
            .ok_or(MazeError::NotSteppable(next_state))?,
        probability,
        is_terminal: maze.is_terminal(next_state)?,
    })
}

impl Mdp for MazeEnvironment {
    fn states(&self) -> &[Position] {
        &self.states
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn is_terminal(&self, s: Position) -> bool {
        self.terminals.contains(&s)
    }

    fn step(&self, s: Position, a: Action) -> MazeResult<Vec<Transition>> {
        self.transitions
            .get(&(s, a))
            .cloned()
            .ok_or(MazeError::UnknownStateAction {
                state: s,
                action: a,
            })
    }

    fn transitions(&self) -> Arc<Transitions> {
        Arc::clone(&self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_specs, CellKind::*};
    use float_eq::*;
    use rstest::*;

    #[test]
    fn moving_into_wall_keeps_origin_and_its_reward() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze = Maze::from_rows(vec![vec![Regular(-3.), Wall]], rng).unwrap();
        let env = MazeEnvironment::new(maze, EnvType::Deterministic, rng).unwrap();

        let origin = Position::cell(0, 0);
        let ts = env.step(origin, Action::A1).unwrap();
        let right = ts.iter().find(|t| t.direction == Direction::Right).unwrap();

        assert_eq!(right.next_state, origin);
        assert_eq!(right.reward, -3.);
        assert_eq!(right.probability, 1.);
        assert!(!right.is_terminal);
    }

    #[test]
    fn graph_edge_into_wall_bounces_back() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze = Maze::graph_from_edges(
            vec![Regular(-2.), Wall],
            &[(0, Direction::Up, 1)],
            rng,
        )
        .unwrap();
        let env = MazeEnvironment::new(maze, EnvType::Stochastic, rng).unwrap();

        let ts = env.step(Position::Node(0), Action::A4).unwrap();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].next_state, Position::Node(0));
        assert_eq!(ts[0].reward, -2.);
        assert_eq!(ts[0].probability, 1.);
    }

    #[test]
    fn teleport_hands_over_to_its_target() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let mut maze =
            Maze::from_rows(vec![vec![Regular(-1.), Teleport, Regular(-5.), Terminal(7.)]], rng)
                .unwrap();
        maze.bind_teleport(Position::cell(0, 1), Position::cell(0, 3))
            .unwrap();
        let env = MazeEnvironment::new(maze, EnvType::Deterministic, rng).unwrap();

        let ts = env.step(Position::cell(0, 0), Action::A1).unwrap();
        let right = ts.iter().find(|t| t.direction == Direction::Right).unwrap();

        assert_eq!(right.next_state, Position::cell(0, 3));
        assert_eq!(right.reward, 7.);
        assert!(right.is_terminal);
        assert!(!env.states().contains(&Position::cell(0, 1)));
    }

    #[rstest]
    #[case(EnvType::Deterministic)]
    #[case(EnvType::Stochastic)]
    fn transitions_never_rest_on_teleports_or_walls(#[case] env_type: EnvType) {
        for seed in 0..20 {
            let rng = &mut StdRng::seed_from_u64(seed);
            let maze = Maze::graph(15, &default_specs(), rng).unwrap();
            let env = MazeEnvironment::new(maze, env_type, rng).unwrap();

            for ((s, a), ts) in env.transitions().iter() {
                for t in ts {
                    assert!(env.states().contains(&t.next_state), "{s} {a:?} -> {t:?}");
                }
                if !ts.is_empty() {
                    let total = ts.iter().map(|t| t.probability).sum::<f64>();
                    assert_float_eq!(total, 1., abs <= 1e-6);
                }
            }
        }
    }

    #[rstest]
    #[case(EnvType::Deterministic)]
    #[case(EnvType::Stochastic)]
    fn terminal_flags_follow_the_maze(#[case] env_type: EnvType) {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze =
            Maze::from_rows(vec![vec![Regular(-1.), Terminal(2.), Teleport]], rng).unwrap();
        let env = MazeEnvironment::new(maze, env_type, rng).unwrap();

        assert_eq!(env.env_type(), env_type);
        assert!(env.is_terminal(Position::cell(0, 1)));
        assert!(!env.is_terminal(Position::cell(0, 0)));
        // Teleports are not states, whatever they point to.
        assert!(!env.is_terminal(Position::cell(0, 2)));
    }

    #[test]
    fn bad_action_sets_are_rejected() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze = Maze::from_rows(vec![vec![Regular(-1.)]], rng).unwrap();

        assert!(matches!(
            MazeEnvironment::with_actions(maze.clone(), EnvType::Stochastic, &[], rng),
            Err(MazeError::InvalidActions)
        ));
        assert!(matches!(
            MazeEnvironment::with_actions(
                maze,
                EnvType::Stochastic,
                &[Action::A2, Action::A2],
                rng,
            ),
            Err(MazeError::InvalidActions)
        ));
    }

    #[test]
    fn unknown_pairs_are_usage_errors() {
        let rng = &mut StdRng::seed_from_u64(2718);
        let maze = Maze::from_rows(vec![vec![Regular(-1.), Terminal(1.)]], rng).unwrap();
        let env = MazeEnvironment::with_actions(maze, EnvType::Deterministic, &[Action::A1], rng)
            .unwrap();

        assert!(matches!(
            env.step(Position::cell(0, 0), Action::A2),
            Err(MazeError::UnknownStateAction { .. })
        ));
        assert!(matches!(
            env.step(Position::cell(4, 4), Action::A1),
            Err(MazeError::UnknownStateAction { .. })
        ));
    }
}
