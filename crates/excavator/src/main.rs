//! Headless excavator demo
//!
//! Drives the excavator from the arena center toward the gate, digs the
//! pile away one scoop at a time, then carries on through the doorway
//! until the perimeter rocks stop it.
//!
//! Usage: `excavator [config.toml|config.ron]`

use dig_engine::config::Config;
use dig_engine::debug::CollisionDebugVisualizer;
use dig_engine::foundation::logging;
use dig_engine::foundation::math::{constants, Vec3};
use dig_engine::physics::collision::ColliderRegistry;
use dig_engine::scene::SceneGraph;
use excavator::{Environment, Excavator, GameConfig, GameResult, ScoopOutcome};

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 60;
const DRIVE_SPEED: f32 = 1.2;
const HOLD_TIME: f32 = 0.5;
const LIFTED_BOOM: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// Drive forward until the bucket reaches the pile
    Approach,
    /// Bucket raised with a load; counts down to the dump
    Hold(f32),
    /// Pile gone; drive on through the gate
    Leave,
}

struct Demo {
    scene: SceneGraph,
    registry: ColliderRegistry,
    environment: Environment,
    rig: Excavator,
    visualizer: CollisionDebugVisualizer,
    phase: Phase,
    adjustments: u32,
}

impl Demo {
    fn new(config: &GameConfig) -> GameResult<Self> {
        let mut scene = SceneGraph::new();
        let mut registry = ColliderRegistry::new();
        let mut environment = Environment::new(config);
        environment.generate(&mut scene, &mut registry)?;

        let rig = Excavator::new(&mut scene, &config.excavator, &config.collision, Vec3::zeros(), constants::HALF_PI)?;

        let mut visualizer = CollisionDebugVisualizer::new(&config.collision);
        let hulls = visualizer.draw_obstacle_hulls(&registry);
        let zones = visualizer.draw_zones(&registry);
        log::info!("Debug outlines: {} obstacle hulls, {} zones", hulls, zones);

        Ok(Self {
            scene,
            registry,
            environment,
            rig,
            visualizer,
            phase: Phase::Approach,
            adjustments: 0,
        })
    }

    fn step(&mut self, frame: u32) {
        self.phase = match self.phase {
            Phase::Approach => self.approach(),
            Phase::Hold(remaining) => self.hold(remaining - FRAME_DT),
            Phase::Leave => Phase::Leave,
        };

        if self.rig.update(FRAME_DT, &mut self.scene, &self.registry) {
            self.adjustments += 1;
            if self.adjustments % 60 == 1 {
                if let Some(p) = self.rig.position(&self.scene) {
                    log::info!("Frame {}: pushed out of an obstacle at ({:.2}, {:.2})", frame, p.x, p.z);
                }
            }
        }

        self.visualizer.draw_part_hulls(&self.scene, self.rig.parts());
        self.visualizer.update(FRAME_DT);
    }

    fn approach(&mut self) -> Phase {
        self.rig.set_track_speeds(DRIVE_SPEED, DRIVE_SPEED);
        match self.environment.scoop(&mut self.scene, &mut self.registry, &mut self.rig) {
            ScoopOutcome::Missed => Phase::Approach,
            ScoopOutcome::Scooped { scoops } => {
                log::info!("Scooped ({} so far), lifting", scoops);
                self.rig.set_track_speeds(0.0, 0.0);
                self.rig.set_boom_angle(&mut self.scene, LIFTED_BOOM);
                Phase::Hold(HOLD_TIME)
            }
            ScoopOutcome::Depleted => {
                log::info!("Pile cleared, heading through the gate");
                self.rig.set_boom_angle(&mut self.scene, LIFTED_BOOM);
                self.rig.unload_bucket();
                Phase::Leave
            }
        }
    }

    fn hold(&mut self, remaining: f32) -> Phase {
        if remaining > 0.0 {
            return Phase::Hold(remaining);
        }
        self.rig.unload_bucket();
        self.rig.set_boom_angle(&mut self.scene, 0.0);
        Phase::Approach
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            GameConfig::load_from_file(&path)?
        }
        None => GameConfig::default(),
    };
    config.validate()?;

    let mut demo = Demo::new(&config)?;
    for frame in 0..MAX_FRAMES {
        demo.step(frame);
    }

    let end = demo.rig.position(&demo.scene).unwrap_or_default();
    log::info!(
        "Finished after {} frames at ({:.2}, {:.2}): {} collision adjustments, {} scoops, pile {}",
        MAX_FRAMES,
        end.x,
        end.z,
        demo.adjustments,
        demo.environment.scoops(),
        if demo.environment.is_pile_gone() { "cleared" } else { "remaining" }
    );
    log::debug!("Debug shapes alive: {}", demo.visualizer.shapes().len());
    Ok(())
}
