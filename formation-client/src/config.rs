use anyhow::{Context, Result};
use formation_core::{FormationConfig, Gains};
use formation_shared::{FormationFile, FormationSettings};
use std::fs;
use std::path::Path;

/// Reads a JSON formation description from `path`
pub fn load_formation(path: &Path) -> Result<FormationConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read formation file {}", path.display()))?;
    let file = FormationFile::from_json(&text)
        .with_context(|| format!("Failed to parse formation file {}", path.display()))?;

    log::debug!(
        "Loaded {} agents from {}",
        file.agent_count,
        path.display()
    );
    Ok(into_config(file))
}

/// Converts the serialized form into a core configuration.
///
/// Nothing is validated here; the core rejects bad graphs and gains when the
/// simulation is built.
pub fn into_config(file: FormationFile) -> FormationConfig {
    let FormationSettings {
        k_formation,
        k_velocity,
        max_speed,
        time_step,
    } = file.settings;

    FormationConfig {
        agent_count: file.agent_count,
        neighbor_lists: file.neighbor_lists,
        desired_distances: file.desired_distances,
        gains: Gains {
            k_formation,
            k_velocity,
            max_speed,
        },
        time_step,
    }
}
