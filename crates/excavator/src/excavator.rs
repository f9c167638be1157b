//! Articulated excavator rig
//!
//! The rig is a chain of scene nodes built from procedural boxes:
//!
//! ```text
//! root ─┬─ base
//!       ├─ left_track, right_track
//!       └─ turret_pivot ─┬─ body
//!                        └─ boom_pivot ─┬─ boom
//!                                       └─ stick_pivot ─┬─ stick
//!                                                       └─ bucket_pivot ── bucket
//! ```
//!
//! Local forward is -X, so a root yaw of `θ` drives along
//! `(-cos θ, sin θ)` on the XZ plane. Arm joints pitch about local Z.

use dig_engine::config::CollisionConfig;
use dig_engine::foundation::math::{Quat, Transform, Vec3};
use dig_engine::physics::collision::{ColliderRegistry, CollisionResolver, VehicleParts};
use dig_engine::scene::{MeshData, NodeKey, SceneGraph};

use crate::config::{ExcavatorConfig, JointLimits};
use crate::error::{GameError, GameResult};

/// Animation frames per track cycle
const TRACK_FRAMES: usize = 3;

/// Speeds closer than this to their target snap to it
const SPEED_SNAP: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joint {
    Boom,
    Stick,
    Bucket,
}

/// Drivable excavator with boom, stick and bucket
#[derive(Debug)]
pub struct Excavator {
    root: NodeKey,
    parts: VehicleParts<NodeKey>,
    left_track: NodeKey,
    right_track: NodeKey,
    turret_pivot: NodeKey,
    boom_pivot: NodeKey,
    stick_pivot: NodeKey,
    bucket_pivot: NodeKey,

    config: ExcavatorConfig,
    resolver: CollisionResolver,
    spawn_position: Vec3,
    spawn_yaw: f32,

    yaw: f32,
    target_left_speed: f32,
    target_right_speed: f32,
    left_speed: f32,
    right_speed: f32,
    left_distance: f32,
    right_distance: f32,
    left_frame: usize,
    right_frame: usize,

    turret_yaw: f32,
    boom_angle: f32,
    stick_angle: f32,
    bucket_angle: f32,
    bucket_loaded: bool,
}

impl Excavator {
    /// Build the rig in `scene` at `position`, facing `yaw`
    pub fn new(
        scene: &mut SceneGraph,
        config: &ExcavatorConfig,
        collision: &CollisionConfig,
        position: Vec3,
        yaw: f32,
    ) -> GameResult<Self> {
        let root = scene.add_node("excavator_root", Transform::from_position(position).with_yaw(yaw), None);
        let half_track = config.track_width * 0.5;

        let base = child(scene, root, "base", Vec3::new(0.0, 0.6, 0.0), Some(MeshData::cuboid(Vec3::new(1.0, 0.15, 0.6))))?;
        let track_mesh = MeshData::cuboid(Vec3::new(1.3, 0.25, 0.2));
        let left_track = child(scene, root, "left_track", Vec3::new(0.0, 0.25, half_track), Some(track_mesh.clone()))?;
        let right_track = child(scene, root, "right_track", Vec3::new(0.0, 0.25, -half_track), Some(track_mesh))?;

        let turret_pivot = child(scene, root, "turret_pivot", Vec3::new(0.0, 0.75, 0.0), None)?;
        let body = child(scene, turret_pivot, "body", Vec3::new(0.2, 0.45, 0.0), Some(MeshData::cuboid(Vec3::new(0.9, 0.45, 0.65))))?;

        let boom_pivot = child(scene, turret_pivot, "boom_pivot", Vec3::new(-0.5, 0.9, 0.0), None)?;
        let boom = child(scene, boom_pivot, "boom", Vec3::new(-1.2, 0.25, 0.0), Some(MeshData::cuboid(Vec3::new(1.2, 0.15, 0.15))))?;

        let stick_pivot = child(scene, boom_pivot, "stick_pivot", Vec3::new(-2.4, 0.25, 0.0), None)?;
        let stick = child(scene, stick_pivot, "stick", Vec3::new(0.0, -0.6, 0.0), Some(MeshData::cuboid(Vec3::new(0.12, 0.6, 0.12))))?;

        let bucket_pivot = child(scene, stick_pivot, "bucket_pivot", Vec3::new(0.0, -1.2, 0.0), None)?;
        let bucket = child(scene, bucket_pivot, "bucket", Vec3::new(0.0, -0.25, 0.0), Some(MeshData::cuboid(Vec3::new(0.35, 0.25, 0.45))))?;

        log::info!("Excavator built at ({:.2}, {:.2}, {:.2}), yaw {:.3}", position.x, position.y, position.z, yaw);

        Ok(Self {
            root,
            parts: VehicleParts {
                base: Some(base),
                body: Some(body),
                boom: Some(boom),
                stick: Some(stick),
                bucket: Some(bucket),
            },
            left_track,
            right_track,
            turret_pivot,
            boom_pivot,
            stick_pivot,
            bucket_pivot,
            config: config.clone(),
            resolver: CollisionResolver::new(collision),
            spawn_position: position,
            spawn_yaw: yaw,
            yaw,
            target_left_speed: 0.0,
            target_right_speed: 0.0,
            left_speed: 0.0,
            right_speed: 0.0,
            left_distance: 0.0,
            right_distance: 0.0,
            left_frame: 0,
            right_frame: 0,
            turret_yaw: 0.0,
            boom_angle: 0.0,
            stick_angle: 0.0,
            bucket_angle: 0.0,
            bucket_loaded: false,
        })
    }

    /// Root node; moving it moves the whole rig
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Part handles, for collision and debug drawing
    pub fn parts(&self) -> &VehicleParts<NodeKey> {
        &self.parts
    }

    /// Track nodes `(left, right)`
    pub fn tracks(&self) -> (NodeKey, NodeKey) {
        (self.left_track, self.right_track)
    }

    /// Set target track speeds in m/s; actual speeds ramp toward them
    pub fn set_track_speeds(&mut self, left: f32, right: f32) {
        self.target_left_speed = left;
        self.target_right_speed = right;
    }

    /// Current (ramped) track speeds `(left, right)`
    pub fn track_speeds(&self) -> (f32, f32) {
        (self.left_speed, self.right_speed)
    }

    /// Current track animation frames `(left, right)`
    pub fn track_frames(&self) -> (usize, usize) {
        (self.left_frame, self.right_frame)
    }

    /// Heading about the vertical axis, radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Advance the drive by `dt` seconds, then push out of obstacles
    ///
    /// Returns whether the collision step moved the rig.
    pub fn update(&mut self, dt: f32, scene: &mut SceneGraph, registry: &ColliderRegistry) -> bool {
        let step = self.config.acceleration * dt;
        self.left_speed = ramp(self.left_speed, self.target_left_speed, step);
        self.right_speed = ramp(self.right_speed, self.target_right_speed, step);

        self.left_distance += self.left_speed * dt;
        self.right_distance += self.right_speed * dt;
        self.left_frame = track_frame(self.left_distance, self.config.track_circumference);
        self.right_frame = track_frame(self.right_distance, self.config.track_circumference);

        let linear = (self.left_speed + self.right_speed) * 0.5;
        let angular = (self.right_speed - self.left_speed) / self.config.track_width;
        self.yaw += angular * dt;
        scene.set_rotation(self.root, yaw_rotation(self.yaw));
        let delta = Vec3::new(-self.yaw.cos() * linear * dt, 0.0, self.yaw.sin() * linear * dt);
        scene.translate(self.root, delta);

        let adjusted = self.resolver.resolve_vehicle(registry, scene, self.root, &self.parts);
        if adjusted {
            log::debug!("Excavator pushed back at {:?}", self.position(scene).map(|p| (p.x, p.z)));
        }
        adjusted
    }

    /// World position of the root
    pub fn position(&self, scene: &SceneGraph) -> Option<Vec3> {
        scene.world_position(self.root)
    }

    /// World position of the bucket's origin
    pub fn bucket_world_position(&self, scene: &SceneGraph) -> Option<Vec3> {
        self.parts.bucket.and_then(|bucket| scene.world_position(bucket))
    }

    /// Rotate the turret about the vertical axis; unlimited
    pub fn set_turret_yaw(&mut self, scene: &mut SceneGraph, radians: f32) {
        self.turret_yaw = radians;
        scene.set_rotation(self.turret_pivot, yaw_rotation(radians));
    }

    /// Pitch the boom; positive raises it
    ///
    /// The angle is clamped to the boom limits. Returns false, leaving the
    /// boom where it was, if the move would put the bucket below ground.
    pub fn set_boom_angle(&mut self, scene: &mut SceneGraph, radians: f32) -> bool {
        self.move_joint(scene, Joint::Boom, radians)
    }

    /// Pitch the stick; positive swings the bucket forward and up
    pub fn set_stick_angle(&mut self, scene: &mut SceneGraph, radians: f32) -> bool {
        self.move_joint(scene, Joint::Stick, radians)
    }

    /// Curl the bucket
    pub fn set_bucket_angle(&mut self, scene: &mut SceneGraph, radians: f32) -> bool {
        self.move_joint(scene, Joint::Bucket, radians)
    }

    /// Current joint angles `(turret, boom, stick, bucket)`
    pub fn joint_angles(&self) -> (f32, f32, f32, f32) {
        (self.turret_yaw, self.boom_angle, self.stick_angle, self.bucket_angle)
    }

    fn move_joint(&mut self, scene: &mut SceneGraph, joint: Joint, radians: f32) -> bool {
        let target = self.limits(joint).clamp(radians);
        let previous = self.angle(joint);
        self.write_joint(scene, joint, target);

        if self.bucket_below_ground(scene) {
            log::trace!("{:?} to {:.3} rejected, bucket would dig below ground", joint, target);
            self.write_joint(scene, joint, previous);
            return false;
        }
        true
    }

    fn limits(&self, joint: Joint) -> JointLimits {
        match joint {
            Joint::Boom => self.config.boom_limits,
            Joint::Stick => self.config.stick_limits,
            Joint::Bucket => self.config.bucket_limits,
        }
    }

    fn angle(&self, joint: Joint) -> f32 {
        match joint {
            Joint::Boom => self.boom_angle,
            Joint::Stick => self.stick_angle,
            Joint::Bucket => self.bucket_angle,
        }
    }

    fn write_joint(&mut self, scene: &mut SceneGraph, joint: Joint, radians: f32) {
        let (slot, pivot) = match joint {
            Joint::Boom => (&mut self.boom_angle, self.boom_pivot),
            Joint::Stick => (&mut self.stick_angle, self.stick_pivot),
            Joint::Bucket => (&mut self.bucket_angle, self.bucket_pivot),
        };
        *slot = radians;
        scene.set_rotation(pivot, pitch_rotation(radians));
    }

    fn bucket_below_ground(&self, scene: &SceneGraph) -> bool {
        self.parts
            .bucket
            .and_then(|bucket| scene.world_aabb(bucket))
            .is_some_and(|aabb| aabb.min.y < ColliderRegistry::ground_level())
    }

    /// Mark the bucket as carrying material
    pub fn load_bucket(&mut self) {
        self.bucket_loaded = true;
    }

    /// Empty the bucket
    pub fn unload_bucket(&mut self) {
        self.bucket_loaded = false;
    }

    /// Check whether the bucket carries material
    pub fn is_bucket_loaded(&self) -> bool {
        self.bucket_loaded
    }

    /// Return to the spawn pose with tracks stopped, joints zeroed and an
    /// empty bucket
    pub fn reset(&mut self, scene: &mut SceneGraph) {
        self.yaw = self.spawn_yaw;
        scene.set_position(self.root, self.spawn_position);
        scene.set_rotation(self.root, yaw_rotation(self.yaw));

        self.target_left_speed = 0.0;
        self.target_right_speed = 0.0;
        self.left_speed = 0.0;
        self.right_speed = 0.0;
        self.left_distance = 0.0;
        self.right_distance = 0.0;
        self.left_frame = 0;
        self.right_frame = 0;

        self.set_turret_yaw(scene, 0.0);
        for joint in [Joint::Boom, Joint::Stick, Joint::Bucket] {
            self.write_joint(scene, joint, 0.0);
        }
        self.bucket_loaded = false;
    }
}

fn child(
    scene: &mut SceneGraph,
    parent: NodeKey,
    name: &'static str,
    position: Vec3,
    mesh: Option<MeshData>,
) -> GameResult<NodeKey> {
    scene
        .add_child(parent, name, Transform::from_position(position), mesh)
        .ok_or(GameError::MissingNode(name))
}

fn yaw_rotation(radians: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), radians)
}

// Rotating about -Z lifts a -X pointing arm for positive angles
fn pitch_rotation(radians: f32) -> Quat {
    Quat::from_axis_angle(&Vec3::z_axis(), -radians)
}

fn ramp(current: f32, target: f32, step: f32) -> f32 {
    let diff = target - current;
    if diff.abs() < SPEED_SNAP {
        return target;
    }
    if diff > 0.0 {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

fn track_frame(distance: f32, circumference: f32) -> usize {
    let phase = (distance / circumference).rem_euclid(1.0);
    (phase * TRACK_FRAMES as f32) as usize % TRACK_FRAMES
}
