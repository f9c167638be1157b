//! # Excavator
//!
//! Sandbox game layer on top of `dig_engine`: an articulated excavator,
//! an arena ringed with rocks and rails, a gate with a pass-through
//! doorway, and a pile to dig away.
//!
//! ```rust,no_run
//! use dig_engine::physics::collision::ColliderRegistry;
//! use dig_engine::scene::SceneGraph;
//! use excavator::{Environment, Excavator, GameConfig};
//!
//! fn main() -> Result<(), excavator::GameError> {
//!     let config = GameConfig::default();
//!     let mut scene = SceneGraph::new();
//!     let mut registry = ColliderRegistry::new();
//!
//!     let mut env = Environment::new(&config);
//!     env.generate(&mut scene, &mut registry)?;
//!
//!     let mut rig = Excavator::new(
//!         &mut scene,
//!         &config.excavator,
//!         &config.collision,
//!         Default::default(),
//!         std::f32::consts::FRAC_PI_2,
//!     )?;
//!     rig.set_track_speeds(1.0, 1.0);
//!     rig.update(1.0 / 60.0, &mut scene, &registry);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod config;
pub mod dig_pile;
pub mod environment;
pub mod error;
pub mod excavator;

pub use config::{ArenaConfig, DigConfig, ExcavatorConfig, GameConfig, JointLimits};
pub use dig_pile::DigPile;
pub use environment::{Environment, ScoopOutcome};
pub use error::{GameError, GameResult};
pub use excavator::Excavator;
