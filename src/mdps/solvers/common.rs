use crate::{Mdp, Position, Transition};
use rand::prelude::*;

/// sum(p(s+, r | s, a) * (r + gamma * v(s+)))
pub fn expected_return(ts: &[Transition], gamma: f64, v: impl Fn(Position) -> f64) -> f64 {
    ts.iter()
        .map(|t| t.probability * (t.reward + gamma * v(t.next_state)))
        .sum()
}

/// Starting estimate: zero for terminal states, a random negative value otherwise.
pub fn seed_value(mdp: &dyn Mdp, s: Position, rng: &mut impl Rng) -> f64 {
    if mdp.is_terminal(s) {
        0.
    } else {
        -10. * rng.gen::<f64>()
    }
}

pub fn max_abs_diff<'a>(xs: impl Iterator<Item = (&'a f64, &'a f64)>) -> f64 {
    xs.map(|(x, y)| (x - y).abs()).fold(0., f64::max)
}
