//! Per-joint channel evaluation

use glam::{Mat4, Quat, Vec3};

use super::keyframe::{QuatKey, Vec3Key};
use super::transform::Transform;
use crate::core::{Error, TrackKind};

/// One skeleton joint's authored keys within a clip, plus its last evaluated pose
#[derive(Clone, Debug)]
pub struct AnimationNode {
    pub translation_keys: Vec3Key,
    pub rotation_keys: QuatKey,
    pub scale_keys: Vec3Key,

    /// Local transform from the last `update`
    pub local_transform: Mat4,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl AnimationNode {
    pub fn new(translation_keys: Vec3Key, rotation_keys: QuatKey, scale_keys: Vec3Key) -> Self {
        Self {
            translation_keys,
            rotation_keys,
            scale_keys,
            local_transform: Mat4::IDENTITY,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Validate all three tracks
    ///
    /// Returns the tracks that contain duplicate timestamps (lenient mode only).
    pub fn validate(&self, node: &str, strict: bool) -> Result<Vec<(TrackKind, usize)>, Error> {
        let translation = self.translation_keys.validate(node, TrackKind::Translation, strict)?;
        let rotation = self.rotation_keys.validate(node, TrackKind::Rotation, strict)?;
        let scale = self.scale_keys.validate(node, TrackKind::Scale, strict)?;

        let checks = [
            (TrackKind::Translation, translation),
            (TrackKind::Rotation, rotation),
            (TrackKind::Scale, scale),
        ];

        Ok(checks
            .into_iter()
            .filter_map(|(kind, degenerate)| degenerate.map(|index| (kind, index)))
            .collect())
    }

    /// Evaluate the channel at `time` (in ticks) and cache the result
    pub fn update(&mut self, time: f32) {
        self.translation = self.translation_keys.sample(time);
        self.rotation = self.rotation_keys.sample(time);
        self.scale = self.scale_keys.sample(time);

        self.local_transform = Mat4::from_translation(self.translation)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale);
    }

    /// Cached components of the last evaluation
    pub fn pose(&self) -> Transform {
        Transform::new(self.translation, self.rotation, self.scale)
    }

    /// Latest key time across the three tracks
    pub fn end_time(&self) -> f32 {
        self.translation_keys
            .end_time()
            .max(self.rotation_keys.end_time())
            .max(self.scale_keys.end_time())
    }
}
