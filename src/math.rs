//! Math types for lipsonic

pub use glam::{Quat, Vec3};

/// Position and orientation of the listener (the virtual "ears").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * (-Vec3::Z)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Aim the pose at `target`, keeping the default up direction.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize();
        self.rotation = Quat::from_rotation_arc(Vec3::Z, -forward);
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// One frame's worth of 3D transform data: the listener pose and the
/// position of the sound-emitting character. Produced by the rendering
/// layer every frame; nothing here is retained across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPose {
    pub listener: Pose,
    pub emitter: Vec3,
}

impl SpatialPose {
    pub fn new(listener: Pose, emitter: Vec3) -> Self {
        Self { listener, emitter }
    }

    /// Listener-to-emitter distance in scene units.
    pub fn distance(&self) -> f32 {
        self.listener.position.distance(self.emitter)
    }
}

impl Default for SpatialPose {
    fn default() -> Self {
        Self {
            listener: Pose::identity(),
            emitter: Vec3::ZERO,
        }
    }
}
