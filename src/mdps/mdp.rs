use crate::{Action, MazeResult, Position, Transition, Transitions};
use std::sync::Arc;

/// Markov Decision Process - Sutton & Barto 2018.
pub trait Mdp: Send + Sync {
    fn states(&self) -> &[Position];

    fn actions(&self) -> &[Action];

    fn is_terminal(&self, s: Position) -> bool;

    fn step(&self, s: Position, a: Action) -> MazeResult<Vec<Transition>>;

    /// Every `(state, action)` pair with its possible outcomes. Frozen once
    /// the environment is built.
    fn transitions(&self) -> Arc<Transitions>;
}
