use crate::{MazeError, MazeResult, Position};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// A maze cell with its teleport (if any) already bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Regular(f64),
    Terminal(f64),
    Wall,
    Teleport(Position),
}

impl Cell {
    /// Reward for stepping onto this cell. Walls have none, and a teleport
    /// borrows its target's reward, which only the maze can look up.
    pub fn reward(&self) -> Option<f64> {
        match self {
            Self::Regular(r) | Self::Terminal(r) => Some(*r),
            Self::Wall | Self::Teleport(_) => None,
        }
    }

    /// Teleports are always steppable since they only ever point to regular
    /// or terminal cells.
    pub fn is_steppable(&self) -> bool {
        !matches!(self, Self::Wall)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    pub fn is_teleport_target(&self) -> bool {
        matches!(self, Self::Regular(_) | Self::Terminal(_))
    }

    pub fn teleport_target(&self) -> Option<Position> {
        if let Self::Teleport(target) = self {
            Some(*target)
        } else {
            None
        }
    }
}

/// Cell template sampled while generating a maze. Teleports get their target
/// once every cell of the maze is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Regular(f64),
    Terminal(f64),
    Wall,
    Teleport,
}

impl CellKind {
    pub fn is_teleport_target(&self) -> bool {
        matches!(self, Self::Regular(_) | Self::Terminal(_))
    }

    pub(crate) fn bind(self, target: Option<Position>) -> Option<Cell> {
        match (self, target) {
            (Self::Regular(r), _) => Some(Cell::Regular(r)),
            (Self::Terminal(r), _) => Some(Cell::Terminal(r)),
            (Self::Wall, _) => Some(Cell::Wall),
            (Self::Teleport, Some(target)) => Some(Cell::Teleport(target)),
            (Self::Teleport, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub weight: f64,
    pub kind: CellKind,
}

impl CellSpec {
    pub fn new(weight: f64, kind: CellKind) -> Self {
        Self { weight, kind }
    }
}

pub trait Weighted<S> {
    fn item(&self) -> S;

    fn weight(&self) -> f64;
}

impl Weighted<CellKind> for CellSpec {
    fn item(&self) -> CellKind {
        self.kind
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Categorical sampler over weighted items.
#[derive(Debug, Clone)]
pub struct WeightedPicker<S> {
    items: Vec<S>,
    dist: WeightedIndex<f64>,
}

impl<S: Copy> WeightedPicker<S> {
    pub fn new<T: Weighted<S>>(ts: &[T]) -> MazeResult<Self> {
        let dist = WeightedIndex::new(ts.iter().map(|t| t.weight()))
            .map_err(|e| MazeError::InvalidCellSpecs(e.to_string()))?;

        Ok(Self {
            items: ts.iter().map(|t| t.item()).collect(),
            dist,
        })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> S {
        self.items[self.dist.sample(rng)]
    }
}

/// Default cell mix: mostly cheap regular cells.
pub fn default_specs() -> Vec<CellSpec> {
    vec![
        CellSpec::new(10., CellKind::Regular(-1.)),
        CellSpec::new(2., CellKind::Regular(-10.)),
        CellSpec::new(2., CellKind::Wall),
        CellSpec::new(1., CellKind::Terminal(-1.)),
        CellSpec::new(1., CellKind::Teleport),
    ]
}
