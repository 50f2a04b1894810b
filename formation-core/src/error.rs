//! Setup errors for formation graphs and simulations

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected configuration. Nothing is constructed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("expected {expected} {kind}, got {actual}")]
    AgentCountMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("agent {agent} has {neighbors} neighbors but {distances} desired distances")]
    LengthMismatch {
        agent: usize,
        neighbors: usize,
        distances: usize,
    },

    #[error("agent {agent} references neighbor {neighbor}, but only {agent_count} agents exist")]
    NeighborOutOfRange {
        agent: usize,
        neighbor: usize,
        agent_count: usize,
    },

    #[error("agent {0} lists itself as a neighbor")]
    SelfReference(usize),

    #[error("agent {agent} has invalid desired distance {distance} to neighbor {neighbor}")]
    InvalidDistance {
        agent: usize,
        neighbor: usize,
        distance: f64,
    },

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("invalid gains: {0}")]
    InvalidGains(&'static str),

    #[error("invalid spawn bounds: {0}")]
    InvalidBounds(&'static str),
}
