use crate::{default_specs, CellSpec, EnvType, Maze, MazeEnvironment, MazeError, MazeResult};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopologyConfig {
    Grid { rows: usize, cols: usize },
    Graph { nodes: usize },
}

/// Which table value iteration runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Q,
    V,
}

/// Everything needed to build and solve one maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub topology: TopologyConfig,
    pub specs: Vec<CellSpec>,
    pub env_type: EnvType,
    pub gamma: f64,
    pub eps: f64,
    pub iterations: usize,
    pub seed: u64,
    pub method: Method,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            topology: TopologyConfig::Grid { rows: 8, cols: 8 },
            specs: default_specs(),
            env_type: EnvType::Stochastic,
            gamma: 0.9,
            eps: 0.01,
            iterations: 1000,
            seed: 2718,
            method: Method::Q,
        }
    }
}

impl MazeConfig {
    pub fn from_json(json: &str) -> MazeResult<Self> {
        let config = serde_json::from_str::<Self>(json)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MazeResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> MazeResult<()> {
        if !(self.gamma > 0. && self.gamma <= 1.) {
            return Err(MazeError::Config(format!(
                "gamma must be in (0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.eps > 0.) {
            return Err(MazeError::Config(format!(
                "eps must be positive, got {}",
                self.eps
            )));
        }
        if self.iterations == 0 {
            return Err(MazeError::Config("iterations must be at least 1".into()));
        }

        Ok(())
    }

    pub fn build_maze(&self, rng: &mut impl Rng) -> MazeResult<Maze> {
        match self.topology {
            TopologyConfig::Grid { rows, cols } => Maze::grid(rows, cols, &self.specs, rng),
            TopologyConfig::Graph { nodes } => Maze::graph(nodes, &self.specs, rng),
        }
    }

    pub fn build_environment(&self, rng: &mut impl Rng) -> MazeResult<MazeEnvironment> {
        let maze = self.build_maze(rng)?;
        MazeEnvironment::new(maze, self.env_type, rng)
    }
}
