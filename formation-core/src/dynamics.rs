//! Formation control law.
//!
//! With `p` positions, `v` velocities and `δij` the desired separations, the
//! swarm descends
//!
//! ```text
//! J = K_for * Σ 1/4 (|pi - pj|² - δij²)²  +  K_vel * Σ |vi - vj|²
//! ```
//!
//! and agent `i` applies
//!
//! ```text
//! u_i = -K_for * Σ (|pi - pj|² - δij²) * (pi - pj)  -  K_vel * Σ (vi - vj)
//! ```
//!
//! The consensus term carries no factor of 2; the gain absorbs it.

use crate::agent::Agent;
use crate::error::{ConfigError, ConfigResult};
use crate::Vector2D;

/// Tunable gains of the control law
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    /// Weight of the shape (formation) potential, `K_for`
    pub k_formation: f64,
    /// Weight of the velocity consensus potential, `K_vel`
    pub k_velocity: f64,
    pub max_speed: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            k_formation: 0.0001,
            k_velocity: 0.30,
            max_speed: 100.0,
        }
    }
}

impl Gains {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.k_formation.is_finite() || self.k_formation < 0.0 {
            return Err(ConfigError::InvalidGains("k_formation must be finite and non-negative"));
        }
        if !self.k_velocity.is_finite() || self.k_velocity < 0.0 {
            return Err(ConfigError::InvalidGains("k_velocity must be finite and non-negative"));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigError::InvalidGains("max_speed must be finite and positive"));
        }
        Ok(())
    }
}

/// Net control input for `agent` given each neighbor's state and desired distance
pub fn acceleration<I>(agent: &Agent, neighbors: I, gains: &Gains) -> Vector2D
where
    I: IntoIterator<Item = (Agent, f64)>,
{
    let mut formation = Vector2D::zero();
    let mut consensus = Vector2D::zero();

    for (neighbor, desired_distance) in neighbors {
        let offset = neighbor.position - agent.position;
        let distance = offset.magnitude();

        // misalignment between realized and desired squared distance
        let delta = distance * distance - desired_distance * desired_distance;
        formation += offset * -delta;

        consensus += (neighbor.velocity - agent.velocity) * -1.0;
    }

    formation * -gains.k_formation + consensus * -gains.k_velocity
}

/// Rescales `velocity` onto the `max_speed` circle when it is faster than that.
pub fn clamp_speed(velocity: Vector2D, max_speed: f64) -> Vector2D {
    let speed = velocity.magnitude();
    if speed > max_speed {
        (velocity / speed) * max_speed
    } else {
        velocity
    }
}

/// Advances one agent by `ts`.
///
/// Position integrates the velocity from before this step; the new velocity
/// integrates the control input and is then speed-limited.
pub fn step<I>(agent: &Agent, neighbors: I, gains: &Gains, ts: f64) -> Agent
where
    I: IntoIterator<Item = (Agent, f64)>,
{
    let acc = acceleration(agent, neighbors, gains);

    let position = agent.position + agent.velocity * ts;
    let velocity = clamp_speed(agent.velocity + acc * ts, gains.max_speed);

    Agent { position, velocity }
}
