pub mod maze_env;
pub mod mdp;
pub mod mdp_solver_policy;
pub mod probability;
pub mod solvers;
