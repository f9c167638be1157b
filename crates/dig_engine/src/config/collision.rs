//! Tunables for the XZ-plane collision resolver and its debug overlay

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Collision tolerances
///
/// Defaults match the values the resolver was tuned with; a partial file
/// only overrides the fields it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Shrinks every obstacle boundary slightly so mesh noise does not
    /// register as contact
    pub hull_padding: f32,
    /// Extra push added on top of the penetration depth so a resolved
    /// shape ends strictly outside, not tangent
    pub separation_epsilon: f32,
    /// Vertices below this height are dropped from filtered obstacle
    /// silhouettes (below-ground mesh artifacts)
    pub obstacle_min_y: f32,
    /// Height at which obstacle hull outlines are drawn
    pub rock_debug_height: f32,
    /// Height at which vehicle-part hull outlines are drawn
    pub part_debug_height: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            hull_padding: 0.005,
            separation_epsilon: 1e-3,
            obstacle_min_y: -0.1,
            rock_debug_height: 0.1,
            part_debug_height: 0.2,
        }
    }
}

impl CollisionConfig {
    /// Reject tolerances the resolver cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hull_padding.is_finite() || self.hull_padding < 0.0 {
            return Err(ConfigError::Invalid {
                field: "hull_padding",
                reason: format!("must be a finite value >= 0, got {}", self.hull_padding),
            });
        }
        if !self.separation_epsilon.is_finite() || self.separation_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                field: "separation_epsilon",
                reason: format!("must be a finite value >= 0, got {}", self.separation_epsilon),
            });
        }
        Ok(())
    }
}

impl Config for CollisionConfig {}
