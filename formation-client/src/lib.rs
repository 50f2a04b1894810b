//! Headless driver for the formation simulation.
//!
//! Stands in for a renderer: it ticks the swarm at a fixed rate and
//! publishes per-tick positions as JSON lines.

pub mod config;
pub mod runner;

pub use config::{into_config, load_formation};
pub use runner::{snapshot, FormationRunner, RunOptions};
