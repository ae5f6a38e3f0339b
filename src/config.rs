//! Engine tuning
//!
//! The knobs a game is likely to override per title, with engine defaults
//! from `consts`. Overrides load from JSON; missing fields keep their
//! defaults so a config file only names what it changes.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Engine tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Centroid distance below which newtonian gravity skips a tick instead
    /// of diverging
    pub min_gravity_distance: f32,
    /// Fixed timestep for callers driving the engine at a fixed rate
    pub fixed_dt: f32,
    /// Maximum substeps per frame to prevent spiral of death
    pub max_substeps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_gravity_distance: consts::MIN_GRAVITY_DISTANCE,
            fixed_dt: consts::SIM_DT,
            max_substeps: consts::MAX_SUBSTEPS,
        }
    }
}

impl SimConfig {
    /// Parse overrides from a JSON document
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_consts() {
        let config = SimConfig::default();
        assert_eq!(config.fixed_dt, consts::SIM_DT);
        assert_eq!(config.max_substeps, consts::MAX_SUBSTEPS);
        assert_eq!(config.min_gravity_distance, consts::MIN_GRAVITY_DISTANCE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{"min_gravity_distance": 0.5}"#).unwrap();
        assert_eq!(config.min_gravity_distance, 0.5);
        assert_eq!(config.fixed_dt, consts::SIM_DT);
    }

    #[test]
    fn test_settings_roundtrip() {
        let config = SimConfig {
            min_gravity_distance: 2.0,
            fixed_dt: 1.0 / 60.0,
            max_substeps: 4,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back = SimConfig::from_json(&json).unwrap();
        assert_eq!(back.fixed_dt, config.fixed_dt);
        assert_eq!(back.max_substeps, config.max_substeps);
    }
}
