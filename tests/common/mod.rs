use maze_mdp::*;
use rand::prelude::*;
use std::sync::Arc;

pub const SEED: u64 = 2718;

#[allow(dead_code)]
pub fn seeded() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

#[allow(dead_code)]
pub fn board_env(
    layout: Vec<Vec<CellKind>>,
    env_type: EnvType,
    actions: &[Action],
) -> Arc<dyn Mdp> {
    let rng = &mut seeded();
    let maze = Maze::from_rows(layout, rng).unwrap();
    Arc::new(MazeEnvironment::with_actions(maze, env_type, actions, rng).unwrap())
}

#[allow(dead_code)]
pub fn random_env(topology: TopologyConfig, env_type: EnvType, seed: u64) -> Arc<MazeEnvironment> {
    let config = MazeConfig {
        topology,
        env_type,
        ..Default::default()
    };
    let rng = &mut StdRng::seed_from_u64(seed);
    Arc::new(config.build_environment(rng).unwrap())
}

/// max_a Q(s, a) straight from the solver's Q values.
#[allow(dead_code)]
pub fn max_q(solver: &dyn MdpSolver, mdp: &dyn Mdp, s: Position) -> f64 {
    mdp.actions()
        .iter()
        .map(|&a| solver.q_star(s, a).unwrap())
        .fold(f64::NEG_INFINITY, f64::max)
}
