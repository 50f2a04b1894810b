#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A 2D position in world coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrt(dx * dx + dy * dy)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Control-law gains and tick length
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormationSettings {
    pub k_formation: f64,
    pub k_velocity: f64,
    pub max_speed: f64,
    pub time_step: f64,
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            k_formation: 0.0001,
            k_velocity: 0.30,
            max_speed: 100.0,
            time_step: 1.0 / 60.0,
        }
    }
}

/// On-disk description of a formation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormationFile {
    pub agent_count: usize,
    pub neighbor_lists: Vec<Vec<usize>>,
    pub desired_distances: Vec<Vec<f64>>,
    #[serde(default)]
    pub settings: FormationSettings,
}

#[cfg(feature = "std")]
impl FormationFile {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Positions published once per reported tick for a renderer to draw
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwarmSnapshot {
    pub tick: u64,
    /// Simulated seconds since start
    pub time: f64,
    pub positions: Vec<Position>,
    /// Camera focus point
    pub centroid: Position,
}

#[cfg(feature = "std")]
impl SwarmSnapshot {
    /// Single-line JSON encoding
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Convergence report at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub agent_count: usize,
    pub formation_error: f64,
    pub velocity_spread: f64,
    pub centroid: Position,
}
