use alloc::vec::Vec;

use crate::agent::{Agent, AgentId};
use crate::dynamics::{self, Gains};
use crate::error::{ConfigError, ConfigResult};
use crate::graph::{build_formation, FormationGraph};
use crate::{topology, Vector2D, DEFAULT_TIME_STEP};

#[cfg(feature = "std")]
use crate::agent::{generate_agents, SpawnBounds};
#[cfg(feature = "std")]
use rand::Rng;

/// How agents observe each other within a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Agents are updated in place in index order, so agent `i` already sees
    /// the new state of every neighbor with a lower index.
    #[default]
    Sequential,
    /// Every agent reads the state from before the tick.
    DoubleBuffered,
}

/// Everything needed to set up a formation simulation
#[derive(Debug, Clone, PartialEq)]
pub struct FormationConfig {
    pub agent_count: usize,
    pub neighbor_lists: Vec<Vec<usize>>,
    pub desired_distances: Vec<Vec<f64>>,
    pub gains: Gains,
    pub time_step: f64,
}

impl FormationConfig {
    /// Seven agents in a hexagon of side 80 around a center agent
    pub fn hexagon() -> Self {
        let (neighbor_lists, desired_distances) = topology::hexagon(80.0);
        Self {
            agent_count: neighbor_lists.len(),
            neighbor_lists,
            desired_distances,
            gains: Gains::default(),
            time_step: DEFAULT_TIME_STEP,
        }
    }

    pub fn build_graph(&self) -> ConfigResult<FormationGraph> {
        build_formation(self.agent_count, &self.neighbor_lists, &self.desired_distances)
    }
}

/// Owns the swarm and advances it one fixed tick at a time
#[derive(Debug, Clone)]
pub struct Simulation {
    agents: Vec<Agent>,
    graph: FormationGraph,
    gains: Gains,
    time_step: f64,
    mode: UpdateMode,
    snapshot: Vec<Agent>,
    ticks: u64,
    elapsed: f64,
}

impl Simulation {
    pub fn new(
        graph: FormationGraph,
        agents: Vec<Agent>,
        gains: Gains,
        time_step: f64,
    ) -> ConfigResult<Self> {
        if agents.len() != graph.agent_count() {
            return Err(ConfigError::AgentCountMismatch {
                kind: "agents",
                expected: graph.agent_count(),
                actual: agents.len(),
            });
        }
        validate_time_step(time_step)?;
        gains.validate()?;

        log::debug!(
            "simulation ready: {} agents, ts={}, k_for={}, k_vel={}, max_speed={}",
            agents.len(),
            time_step,
            gains.k_formation,
            gains.k_velocity,
            gains.max_speed
        );

        Ok(Self {
            agents,
            graph,
            gains,
            time_step,
            mode: UpdateMode::default(),
            snapshot: Vec::new(),
            ticks: 0,
            elapsed: 0.0,
        })
    }

    /// Builds the graph from `config` and spawns its agents at random inside `bounds`.
    #[cfg(feature = "std")]
    pub fn from_config<R: Rng + ?Sized>(
        config: &FormationConfig,
        bounds: &SpawnBounds,
        rng: &mut R,
    ) -> ConfigResult<Self> {
        let graph = config.build_graph()?;
        bounds.validate()?;
        let agents = generate_agents(rng, config.agent_count, bounds);
        Self::new(graph, agents, config.gains, config.time_step)
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Advances every agent by the configured time step
    pub fn tick(&mut self) {
        self.tick_with(self.time_step);
    }

    /// Advances every agent by `dt`, in agent-index order
    pub fn tick_with(&mut self, dt: f64) {
        match self.mode {
            UpdateMode::Sequential => self.tick_sequential(dt),
            UpdateMode::DoubleBuffered => self.tick_double_buffered(dt),
        }
        self.ticks += 1;
        self.elapsed += dt;
    }

    fn tick_sequential(&mut self, dt: f64) {
        for index in 0..self.agents.len() {
            let agents = &self.agents;
            let neighbors = self
                .graph
                .couplings(AgentId(index))
                .iter()
                .map(|c| (agents[c.neighbor.index()], c.desired_distance));
            let next = dynamics::step(&agents[index], neighbors, &self.gains, dt);
            self.agents[index] = next;
        }
    }

    fn tick_double_buffered(&mut self, dt: f64) {
        self.snapshot.clear();
        self.snapshot.extend_from_slice(&self.agents);

        let snapshot = &self.snapshot;
        for (index, agent) in self.agents.iter_mut().enumerate() {
            let neighbors = self
                .graph
                .couplings(AgentId(index))
                .iter()
                .map(|c| (snapshot[c.neighbor.index()], c.desired_distance));
            *agent = dynamics::step(&snapshot[index], neighbors, &self.gains, dt);
        }
    }

    /// Current `(x, y)` of every agent, in agent order.
    ///
    /// The iterator is cheap to clone, and calling this again restarts it.
    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + Clone + '_ {
        self.agents.iter().map(|a| (a.position.x, a.position.y))
    }

    /// Mean position of the swarm; the origin for an empty swarm
    pub fn centroid(&self) -> Vector2D {
        if self.agents.is_empty() {
            return Vector2D::zero();
        }
        let mut sum = Vector2D::zero();
        for agent in &self.agents {
            sum += agent.position;
        }
        sum / self.agents.len() as f64
    }

    /// Largest gap between realized and desired distance over all couplings
    pub fn formation_error(&self) -> f64 {
        self.graph
            .edges()
            .map(|(agent, neighbor, desired)| {
                let realized = self.agents[agent.index()]
                    .position
                    .distance(&self.agents[neighbor.index()].position);
                crate::abs(realized - desired)
            })
            .fold(0.0, f64::max)
    }

    /// Largest velocity difference between any two agents
    pub fn velocity_spread(&self) -> f64 {
        let mut spread: f64 = 0.0;
        for (i, a) in self.agents.iter().enumerate() {
            for b in &self.agents[i + 1..] {
                spread = spread.max(a.velocity.distance(&b.velocity));
            }
        }
        spread
    }

    pub fn agent(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn graph(&self) -> &FormationGraph {
        &self.graph
    }

    pub fn gains(&self) -> &Gains {
        &self.gains
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

fn validate_time_step(time_step: f64) -> ConfigResult<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeStep(time_step))
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const H: f64 = 69.282_032_302_755_09; // 40 * sqrt(3)

    /// Hexagon agents placed exactly on their desired distances, all moving with `velocity`
    fn exact_hexagon(velocity: Vector2D) -> Vec<Agent> {
        let (cx, cy) = (300.0, 200.0);
        [
            (cx - 40.0, cy - H),
            (cx + 40.0, cy - H),
            (cx + 80.0, cy),
            (cx + 40.0, cy + H),
            (cx - 40.0, cy + H),
            (cx - 80.0, cy),
            (cx, cy),
        ]
        .iter()
        .map(|&(x, y)| Agent::new(Vector2D::new(x, y), velocity))
        .collect()
    }

    fn hexagon_simulation(agents: Vec<Agent>, mode: UpdateMode) -> Simulation {
        let config = FormationConfig::hexagon();
        Simulation::new(config.build_graph().unwrap(), agents, config.gains, config.time_step)
            .unwrap()
            .with_update_mode(mode)
    }

    fn random_hexagon(seed: u64, mode: UpdateMode) -> Simulation {
        let mut rng = StdRng::seed_from_u64(seed);
        Simulation::from_config(&FormationConfig::hexagon(), &SpawnBounds::default(), &mut rng)
            .unwrap()
            .with_update_mode(mode)
    }

    #[test]
    fn test_exact_hexagon_has_no_formation_error() {
        let sim = hexagon_simulation(exact_hexagon(Vector2D::zero()), UpdateMode::Sequential);
        assert!(sim.formation_error() < 1e-9);
        assert_eq!(sim.velocity_spread(), 0.0);
    }

    #[test]
    fn test_double_buffered_fixed_point_translates() {
        let velocity = Vector2D::new(10.0, -4.0);
        let before = exact_hexagon(velocity);
        let mut sim = hexagon_simulation(before.clone(), UpdateMode::DoubleBuffered);
        let ts = sim.time_step();

        sim.tick();

        for (old, new) in before.iter().zip(sim.agents()) {
            let expected = old.position + velocity * ts;
            assert!(new.position.distance(&expected) < 1e-9);
            assert!(new.velocity.distance(&velocity) < 1e-9);
        }
    }

    #[test]
    fn test_sequential_fixed_point_at_rest() {
        let before = exact_hexagon(Vector2D::zero());
        let mut sim = hexagon_simulation(before.clone(), UpdateMode::Sequential);

        sim.tick();

        for (old, new) in before.iter().zip(sim.agents()) {
            assert!(new.position.distance(&old.position) < 1e-12);
            assert!(new.velocity.magnitude() < 1e-9);
        }
    }

    #[test]
    fn test_sequential_later_agents_see_updated_neighbors() {
        let velocity = Vector2D::new(10.0, 0.0);
        let before = exact_hexagon(velocity);
        let mut sim = hexagon_simulation(before.clone(), UpdateMode::Sequential);
        let ts = sim.time_step();

        sim.tick();

        // positions always move by the pre-tick velocity
        for (old, new) in before.iter().zip(sim.agents()) {
            assert!(new.position.distance(&(old.position + velocity * ts)) < 1e-9);
        }
        // agent 0 reads only pre-tick neighbors, the center reads six updated ones
        assert!(sim.agents()[0].velocity.distance(&velocity) < 1e-9);
        let center_drift = sim.agents()[6].velocity.distance(&velocity);
        assert!(center_drift > 1e-3);
        assert!(center_drift < 0.05);
    }

    #[test]
    fn test_sequential_tick_matches_in_place_fold() {
        let mut sim = random_hexagon(5, UpdateMode::Sequential);
        let graph = sim.graph().clone();
        let gains = *sim.gains();
        let ts = sim.time_step();
        let mut expected: Vec<Agent> = sim.agents().to_vec();

        for _ in 0..20 {
            for index in 0..expected.len() {
                let neighbors: Vec<(Agent, f64)> = graph
                    .neighbors(AgentId(index))
                    .zip(graph.desired_distances(AgentId(index)))
                    .map(|(neighbor, distance)| (expected[neighbor.index()], distance))
                    .collect();
                expected[index] = dynamics::step(&expected[index], neighbors, &gains, ts);
            }
            sim.tick();

            assert_eq!(sim.agents(), &expected[..]);
        }
    }

    #[test]
    fn test_modes_agree_on_first_agent() {
        let mut sequential = random_hexagon(11, UpdateMode::Sequential);
        let mut buffered = random_hexagon(11, UpdateMode::DoubleBuffered);

        sequential.tick();
        buffered.tick();

        assert_eq!(sequential.agents()[0], buffered.agents()[0]);
        assert_ne!(sequential.agents()[6], buffered.agents()[6]);
    }

    #[test]
    fn test_hexagon_converges_double_buffered() {
        let mut sim = random_hexagon(7, UpdateMode::DoubleBuffered);

        for _ in 0..10_000 {
            sim.tick_with(1.0 / 60.0);
        }

        assert!(sim.formation_error() < 1.0, "formation error {}", sim.formation_error());
        assert!(sim.velocity_spread() < 0.01, "velocity spread {}", sim.velocity_spread());
    }

    #[test]
    fn test_hexagon_converges_sequential() {
        let mut sim = random_hexagon(7, UpdateMode::Sequential);

        for _ in 0..10_000 {
            sim.tick_with(1.0 / 60.0);
        }

        // in-place reads skew the settled shape by roughly ts * max_speed
        assert!(sim.formation_error() < 3.0, "formation error {}", sim.formation_error());
        assert!(sim.velocity_spread() < 0.01, "velocity spread {}", sim.velocity_spread());
    }

    #[test]
    fn test_runs_are_deterministic() {
        let mut first = random_hexagon(99, UpdateMode::Sequential);
        let mut second = random_hexagon(99, UpdateMode::Sequential);

        for _ in 0..500 {
            first.tick();
            second.tick();
        }

        assert_eq!(first.agents(), second.agents());
        assert_eq!(
            first.positions().collect::<Vec<_>>(),
            second.positions().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_positions_and_centroid() {
        let graph = build_formation(2, &[vec![1], vec![0]], &[vec![2.0], vec![2.0]]).unwrap();
        let agents = vec![
            Agent::new(Vector2D::new(0.0, 0.0), Vector2D::zero()),
            Agent::new(Vector2D::new(4.0, 2.0), Vector2D::zero()),
        ];
        let sim = Simulation::new(graph, agents, Gains::default(), DEFAULT_TIME_STEP).unwrap();

        let positions = sim.positions();
        assert_eq!(positions.clone().count(), 2);
        assert_eq!(positions.collect::<Vec<_>>(), vec![(0.0, 0.0), (4.0, 2.0)]);
        assert_eq!(sim.centroid(), Vector2D::new(2.0, 1.0));
    }

    #[test]
    fn test_empty_swarm() {
        let graph = build_formation(0, &[], &[]).unwrap();
        let mut sim = Simulation::new(graph, Vec::new(), Gains::default(), DEFAULT_TIME_STEP).unwrap();

        sim.tick();

        assert_eq!(sim.centroid(), Vector2D::zero());
        assert_eq!(sim.positions().count(), 0);
        assert_eq!(sim.formation_error(), 0.0);
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn test_tick_bookkeeping() {
        let mut sim = random_hexagon(1, UpdateMode::Sequential);
        sim.tick();
        sim.tick_with(0.5);

        assert_eq!(sim.tick_count(), 2);
        assert!((sim.elapsed() - (DEFAULT_TIME_STEP + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_self_reference_builds_nothing() {
        let mut config = FormationConfig::hexagon();
        config.neighbor_lists[3][0] = 3;
        let mut rng = StdRng::seed_from_u64(5);

        let result = Simulation::from_config(&config, &SpawnBounds::default(), &mut rng);
        assert_eq!(result.unwrap_err(), ConfigError::SelfReference(3));
    }

    #[test]
    fn test_agent_count_must_match_graph() {
        let graph = FormationConfig::hexagon().build_graph().unwrap();
        let agents = exact_hexagon(Vector2D::zero())[..6].to_vec();

        let err = Simulation::new(graph, agents, Gains::default(), DEFAULT_TIME_STEP).unwrap_err();
        assert!(matches!(err, ConfigError::AgentCountMismatch { expected: 7, actual: 6, .. }));
    }

    #[test]
    fn test_invalid_spawn_bounds_rejected() {
        let bounds = SpawnBounds {
            width: -640.0,
            ..SpawnBounds::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let err = Simulation::from_config(&FormationConfig::hexagon(), &bounds, &mut rng).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds(_)));

        let bounds = SpawnBounds {
            max_initial_speed: f64::NAN,
            ..SpawnBounds::default()
        };
        let err = Simulation::from_config(&FormationConfig::hexagon(), &bounds, &mut rng).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds(_)));
    }

    #[test]
    fn test_invalid_time_step_rejected() {
        let graph = FormationConfig::hexagon().build_graph().unwrap();
        let err = Simulation::new(graph, exact_hexagon(Vector2D::zero()), Gains::default(), 0.0)
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeStep(0.0));
    }
}
