use alloc::vec::Vec;

use crate::agent::AgentId;
use crate::error::{ConfigError, ConfigResult};

/// One directed coupling: the owning agent is pulled toward `desired_distance` from `neighbor`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coupling {
    pub neighbor: AgentId,
    pub desired_distance: f64,
}

/// Static neighbor graph of a formation.
///
/// Built once by [`build_formation`] and never mutated afterwards. The
/// relation does not have to be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationGraph {
    couplings: Vec<Vec<Coupling>>,
}

impl FormationGraph {
    pub fn agent_count(&self) -> usize {
        self.couplings.len()
    }

    /// Couplings of `agent` in neighbor-list order.
    ///
    /// Panics if `agent` is outside the graph.
    pub fn couplings(&self, agent: AgentId) -> &[Coupling] {
        &self.couplings[agent.index()]
    }

    pub fn neighbors(&self, agent: AgentId) -> impl Iterator<Item = AgentId> + '_ {
        self.couplings(agent).iter().map(|c| c.neighbor)
    }

    pub fn desired_distances(&self, agent: AgentId) -> impl Iterator<Item = f64> + '_ {
        self.couplings(agent).iter().map(|c| c.desired_distance)
    }

    /// Every `(agent, neighbor, desired_distance)` triple, in agent order
    pub fn edges(&self) -> impl Iterator<Item = (AgentId, AgentId, f64)> + '_ {
        self.couplings.iter().enumerate().flat_map(|(agent, couplings)| {
            couplings
                .iter()
                .map(move |c| (AgentId(agent), c.neighbor, c.desired_distance))
        })
    }

    pub fn coupling_count(&self) -> usize {
        self.couplings.iter().map(Vec::len).sum()
    }
}

/// Validates neighbor and distance lists and builds the formation graph.
///
/// `neighbor_lists[i][k]` is coupled to agent `i` at `desired_distance_lists[i][k]`.
pub fn build_formation(
    agent_count: usize,
    neighbor_lists: &[Vec<usize>],
    desired_distance_lists: &[Vec<f64>],
) -> ConfigResult<FormationGraph> {
    if neighbor_lists.len() != agent_count {
        return Err(ConfigError::AgentCountMismatch {
            kind: "neighbor lists",
            expected: agent_count,
            actual: neighbor_lists.len(),
        });
    }
    if desired_distance_lists.len() != agent_count {
        return Err(ConfigError::AgentCountMismatch {
            kind: "desired distance lists",
            expected: agent_count,
            actual: desired_distance_lists.len(),
        });
    }

    let mut couplings = Vec::with_capacity(agent_count);
    for (agent, (neighbors, distances)) in neighbor_lists
        .iter()
        .zip(desired_distance_lists.iter())
        .enumerate()
    {
        if neighbors.len() != distances.len() {
            return Err(ConfigError::LengthMismatch {
                agent,
                neighbors: neighbors.len(),
                distances: distances.len(),
            });
        }

        let mut agent_couplings = Vec::with_capacity(neighbors.len());
        for (&neighbor, &distance) in neighbors.iter().zip(distances.iter()) {
            if neighbor == agent {
                return Err(ConfigError::SelfReference(agent));
            }
            if neighbor >= agent_count {
                return Err(ConfigError::NeighborOutOfRange {
                    agent,
                    neighbor,
                    agent_count,
                });
            }
            if !distance.is_finite() || distance < 0.0 {
                return Err(ConfigError::InvalidDistance {
                    agent,
                    neighbor,
                    distance,
                });
            }
            agent_couplings.push(Coupling {
                neighbor: AgentId(neighbor),
                desired_distance: distance,
            });
        }
        couplings.push(agent_couplings);
    }

    let graph = FormationGraph { couplings };
    log::debug!(
        "built formation graph: {} agents, {} couplings",
        graph.agent_count(),
        graph.coupling_count()
    );
    Ok(graph)
}
