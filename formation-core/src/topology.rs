//! Ready-made formation topologies
//!
//! The hexagon preset is laid out as
//!
//! ```text
//!       0 ------- 1
//!      / \       / \
//!     /   \     /   \
//!    5 --- 6 ------- 2
//!     \   /     \   /
//!      \ /       \ /
//!       4 ------- 3
//! ```
//!
//! with agent 6 at the center, every hexagon edge and spoke at `side` and
//! the three long diagonals (0-3, 1-4, 2-5) at `2 * side`.

use alloc::vec;
use alloc::vec::Vec;

/// Neighbor lists and desired distances for the seven-agent hexagon-plus-center
pub fn hexagon(side: f64) -> (Vec<Vec<usize>>, Vec<Vec<f64>>) {
    let s = side;
    let d = 2.0 * side;

    let neighbors = vec![
        vec![1, 3, 5, 6],
        vec![0, 2, 4, 6],
        vec![1, 3, 5, 6],
        vec![0, 2, 4, 6],
        vec![1, 3, 5, 6],
        vec![0, 2, 4, 6],
        vec![0, 1, 2, 3, 4, 5],
    ];
    let distances = vec![
        vec![s, d, s, s],
        vec![s, s, d, s],
        vec![s, s, d, s],
        vec![d, s, s, s],
        vec![d, s, s, s],
        vec![s, d, s, s],
        vec![s; 6],
    ];

    (neighbors, distances)
}

/// Evenly spaced ring where every agent is coupled to both ring neighbors
pub fn ring(agent_count: usize, side: f64) -> (Vec<Vec<usize>>, Vec<Vec<f64>>) {
    if agent_count < 2 {
        return (vec![Vec::new(); agent_count], vec![Vec::new(); agent_count]);
    }
    if agent_count == 2 {
        return (vec![vec![1], vec![0]], vec![vec![side], vec![side]]);
    }

    let neighbors = (0..agent_count)
        .map(|i| vec![(i + agent_count - 1) % agent_count, (i + 1) % agent_count])
        .collect();
    let distances = vec![vec![side, side]; agent_count];

    (neighbors, distances)
}
