#![cfg_attr(not(feature = "std"), no_std)]

//! Distributed formation control for a swarm of point agents.
//!
//! Each agent is pulled toward a rigid shape by a potential on squared
//! pairwise distances and toward a common velocity by a consensus term.
//! [`Simulation`] owns the agents and the static [`FormationGraph`] and
//! advances everything one fixed tick at a time.

extern crate alloc;

pub mod agent;
pub mod dynamics;
pub mod error;
pub mod graph;
pub mod simulation;
pub mod topology;

pub use agent::{Agent, AgentId, SpawnBounds};
pub use dynamics::Gains;
pub use error::{ConfigError, ConfigResult};
pub use graph::{build_formation, Coupling, FormationGraph};
pub use simulation::{FormationConfig, Simulation, UpdateMode};

#[cfg(feature = "std")]
pub use agent::{generate_agent, generate_agents, os_seed};

/// Default tick duration, one frame at 60 Hz.
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;

pub(crate) fn sqrt(value: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrt(value)
    }
}

pub(crate) fn abs(value: f64) -> f64 {
    #[cfg(feature = "std")]
    {
        value.abs()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::fabs(value)
    }
}

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        sqrt(self.x * self.x + self.y * self.y)
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(&self, other: &Vector2D) -> f64 {
        (*self - *other).magnitude()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}
