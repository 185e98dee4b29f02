//! Gameplay tunables
//!
//! Every constant the gameplay code depends on lives here, with defaults
//! matching the shipped balance. A `config.ron` file next to the binary
//! overrides individual fields (RON + serde, any missing field keeps its
//! default).

use serde::{Serialize, Deserialize};

/// All gameplay tunables in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Downward gravity in physics units (m/s^2, Y-down screen coords)
    pub gravity: f32,
    /// Physics solver velocity iterations per step
    pub velocity_iterations: u32,
    /// Physics solver position iterations per step
    pub position_iterations: u32,

    /// Maximum slingshot pull radius around the anchor, in pixels
    pub max_pull_distance: f32,
    /// Cap on the squared pull distance used as launch force
    pub launch_force_cap: f32,
    /// Scale applied to the capped force before it becomes an impulse
    pub launch_impulse_multiplier: f32,
    /// Seconds between a launch and the respawn/reset of the launcher
    pub reset_delay: f32,
    /// Birds available per launcher before it goes idle
    pub max_throws: u32,
    /// Sling spring stiffness (soft on purpose - the tether is visual aid,
    /// the drag logic positions the bird directly)
    pub sling_stiffness: f32,
    /// Sling spring damping
    pub sling_damping: f32,

    /// Impact speed (m/s) above which collisions deal damage
    pub damage_speed_threshold: f32,
    /// Default restitution for new rigid bodies
    pub default_restitution: f32,
    /// Default max speed clamp for steered bodies (m/s)
    pub default_max_speed: f32,

    /// Velocity multiplier for the boost ability
    pub boost_factor: f32,
    /// Total bird count after the split ability fires (original included)
    pub split_count: u32,

    /// Starting health for pigs
    pub pig_health: f32,
    /// Starting health for breakable platforms
    pub platform_health: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            velocity_iterations: 8,
            position_iterations: 3,

            max_pull_distance: 100.0,
            launch_force_cap: 100.0,
            launch_impulse_multiplier: 0.1,
            reset_delay: 3.0,
            max_throws: 3,
            sling_stiffness: 0.01,
            sling_damping: 25.0,

            damage_speed_threshold: 3.0,
            default_restitution: 0.5,
            default_max_speed: 10.0,

            boost_factor: 2.0,
            split_count: 3,

            pig_health: 20.0,
            platform_health: 20.0,
        }
    }
}

impl GameConfig {
    /// Load the config from a RON file, falling back to defaults if the
    /// file is absent or malformed. A malformed file is logged - silently
    /// playing with different balance than the player asked for is worse
    /// than starting with defaults.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match ron::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse {}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_balance() {
        let config = GameConfig::default();
        assert_eq!(config.max_pull_distance, 100.0);
        assert_eq!(config.max_throws, 3);
        assert_eq!(config.reset_delay, 3.0);
        assert_eq!(config.launch_impulse_multiplier, 0.1);
    }

    #[test]
    fn test_partial_ron_override() {
        // Only override one field; everything else keeps defaults
        let config: GameConfig = ron::from_str("(max_throws: 5)").unwrap();
        assert_eq!(config.max_throws, 5);
        assert_eq!(config.max_pull_distance, 100.0);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = GameConfig::default();
        let text = ron::to_string(&config).unwrap();
        let back: GameConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.gravity, config.gravity);
        assert_eq!(back.split_count, config.split_count);
    }
}
