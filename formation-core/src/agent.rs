use crate::error::{ConfigError, ConfigResult};
use crate::Vector2D;

#[cfg(feature = "std")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use rand::Rng;

/// Index of an agent inside the simulation's agent collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for AgentId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Kinematic state of a single agent.
///
/// Agents do not know their neighbors; coupling lives in
/// [`FormationGraph`](crate::FormationGraph) and refers to agents by [`AgentId`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Agent {
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Agent {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Self { position, velocity }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }
}

/// Region and speed range used when spawning random agents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    pub width: f64,
    pub height: f64,
    pub max_initial_speed: f64,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            max_initial_speed: 100.0,
        }
    }
}

impl SpawnBounds {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(ConfigError::InvalidBounds("width must be finite and positive"));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ConfigError::InvalidBounds("height must be finite and positive"));
        }
        if !self.max_initial_speed.is_finite() || self.max_initial_speed < 0.0 {
            return Err(ConfigError::InvalidBounds(
                "max_initial_speed must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Spawns an agent uniformly inside `[0, bounds_x) x [0, bounds_y)`.
///
/// Both velocity components are drawn from `[0, max_initial_speed)`. The
/// distribution is not centered on zero, so a fresh swarm
/// drifts toward +x/+y.
#[cfg(feature = "std")]
pub fn generate_agent<R: Rng + ?Sized>(
    rng: &mut R,
    bounds_x: f64,
    bounds_y: f64,
    max_initial_speed: f64,
) -> Agent {
    let position = Vector2D::new(rng.gen::<f64>() * bounds_x, rng.gen::<f64>() * bounds_y);
    let velocity = Vector2D::new(
        rng.gen::<f64>() * max_initial_speed,
        rng.gen::<f64>() * max_initial_speed,
    );
    Agent::new(position, velocity)
}

#[cfg(feature = "std")]
pub fn generate_agents<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: &SpawnBounds) -> Vec<Agent> {
    (0..count)
        .map(|_| generate_agent(rng, bounds.width, bounds.height, bounds.max_initial_speed))
        .collect()
}

/// Seed drawn from the operating system's entropy source
#[cfg(feature = "std")]
pub fn os_seed() -> Result<u64, getrandom::Error> {
    let mut bytes = [0u8; 8];
    getrandom::getrandom(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}
