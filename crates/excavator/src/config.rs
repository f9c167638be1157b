//! Game configuration
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the values it changes. Loading goes through the engine's
//! [`Config`] trait (TOML or RON by extension).

use dig_engine::config::{CollisionConfig, Config, ConfigError};
use serde::{Deserialize, Serialize};

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena layout
    pub arena: ArenaConfig,

    /// Dig pile and scooping
    pub dig: DigConfig,

    /// Excavator drive and joints
    pub excavator: ExcavatorConfig,

    /// Collision tolerances
    pub collision: CollisionConfig,
}

impl Config for GameConfig {}

impl GameConfig {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.collision.validate()?;

        if !(self.dig.dig_fraction > 0.0 && self.dig.dig_fraction < 1.0) {
            return Err(invalid("dig.dig_fraction", format!("must be in (0, 1), got {}", self.dig.dig_fraction)));
        }
        if self.dig.scoops_to_deplete == 0 {
            return Err(invalid("dig.scoops_to_deplete", "must be at least 1".to_string()));
        }
        if self.dig.pile_radius <= 0.0 {
            return Err(invalid("dig.pile_radius", format!("must be positive, got {}", self.dig.pile_radius)));
        }
        if self.excavator.track_width <= 0.0 {
            return Err(invalid("excavator.track_width", format!("must be positive, got {}", self.excavator.track_width)));
        }
        if self.excavator.track_circumference <= 0.0 {
            return Err(invalid(
                "excavator.track_circumference",
                format!("must be positive, got {}", self.excavator.track_circumference),
            ));
        }
        for (field, limits) in [
            ("excavator.boom_limits", self.excavator.boom_limits),
            ("excavator.stick_limits", self.excavator.stick_limits),
            ("excavator.bucket_limits", self.excavator.bucket_limits),
        ] {
            if limits.min > limits.max {
                return Err(invalid(field, format!("min {} is above max {}", limits.min, limits.max)));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Arena layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Radius of the ring of perimeter rocks
    pub arena_radius: f32,

    /// Number of perimeter rocks
    pub perimeter_rock_count: u32,

    /// Uniform scale applied to every rock
    pub rock_scale: f32,

    /// Seed for rock orientation
    pub random_seed: u64,

    /// Number of rail segments on the inner ring
    pub rail_count: u32,

    /// Radius of the inner rail ring
    pub rail_radius: f32,

    /// Gate center X
    pub gate_x: f32,

    /// Gate center Z
    pub gate_z: f32,

    /// Half the doorway width between the gate towers
    pub doorway_half_width: f32,

    /// Half depth of the pass-through zone across the doorway
    pub doorway_zone_half_depth: f32,

    /// Distance from the gate toward the arena center where the pile sits
    pub pile_offset: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            arena_radius: 30.0,
            perimeter_rock_count: 20,
            rock_scale: 0.5,
            random_seed: 12345,
            rail_count: 8,
            rail_radius: 20.0,
            gate_x: 0.0,
            gate_z: 18.0,
            doorway_half_width: 1.2,
            doorway_zone_half_depth: 3.5,
            pile_offset: 2.3,
        }
    }
}

/// Dig pile and scooping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigConfig {
    /// Base radius of a full pile
    pub pile_radius: f32,

    /// Fraction of the pile scale removed per scoop
    pub dig_fraction: f32,

    /// Scoops after which the pile is gone
    pub scoops_to_deplete: u32,

    /// Smallest scale the pile shrinks to
    pub pile_min_scale: f32,
}

impl Default for DigConfig {
    fn default() -> Self {
        Self {
            pile_radius: 3.0,
            dig_fraction: 0.21,
            scoops_to_deplete: 5,
            pile_min_scale: 0.05,
        }
    }
}

/// Inclusive joint range in radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl JointLimits {
    /// Create a range; the bounds are swapped if given in the wrong order
    pub fn new(a: f32, b: f32) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Clamp an angle into the range
    pub fn clamp(&self, radians: f32) -> f32 {
        radians.clamp(self.min, self.max)
    }
}

/// Excavator drive and joints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcavatorConfig {
    /// Track speed ramp, m/s²
    pub acceleration: f32,

    /// Distance between the tracks, used for turning
    pub track_width: f32,

    /// Track travel per full animation cycle
    pub track_circumference: f32,

    /// Boom pitch range
    pub boom_limits: JointLimits,

    /// Stick pitch range
    pub stick_limits: JointLimits,

    /// Bucket curl range
    pub bucket_limits: JointLimits,
}

impl Default for ExcavatorConfig {
    fn default() -> Self {
        Self {
            acceleration: 1.5,
            track_width: 1.0,
            track_circumference: 0.3,
            boom_limits: JointLimits::new(-0.2, 0.2),
            stick_limits: JointLimits::new(-0.5, 1.2),
            bucket_limits: JointLimits::new(0.0, 0.5),
        }
    }
}
