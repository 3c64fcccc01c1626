use crate::{Action, Direction, Position};
use thiserror::Error;

pub type MazeResult<T> = Result<T, MazeError>;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("Maze dimensions must be positive, got {rows}x{cols}.")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Row {row} has {found} columns, expected {expected}.")]
    InconsistentRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("A graph maze needs at least one node.")]
    EmptyGraph,

    #[error("Invalid cell specification: {0}")]
    InvalidCellSpecs(String),

    #[error("No regular or terminal cell exists for the teleport at {0} to point to.")]
    NoTeleportTarget(Position),

    #[error("Teleport at {teleport} cannot point to {target}: not a regular or terminal cell.")]
    InvalidTeleportTarget { teleport: Position, target: Position },

    #[error("Cell at {0} is not a teleport.")]
    NotATeleport(Position),

    #[error("Only regular nodes can have outgoing edges, {0} is not regular.")]
    EdgeFromNonRegular(Position),

    #[error("Unknown position {0}.")]
    UnknownPosition(Position),

    #[error("Cell at {0} is not steppable and has no reward.")]
    NotSteppable(Position),

    #[error("Direction {direction:?} is not available from {position}.")]
    DirectionUnavailable {
        position: Position,
        direction: Direction,
    },

    #[error("No transition model for state {state} and action {action:?}.")]
    UnknownStateAction { state: Position, action: Action },

    #[error("State {0} has no value estimate.")]
    UnknownState(Position),

    #[error("State {0} is terminal and has no greedy action.")]
    TerminalState(Position),

    #[error("No candidate actions were given.")]
    NoActions,

    #[error("Action set must be non-empty and free of duplicates.")]
    InvalidActions,

    #[error("Sampling failed: {0}")]
    Sampling(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
