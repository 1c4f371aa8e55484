//! Engine-owned copies of imported animation data
//!
//! The importer copies keyframes, hierarchy and bone offsets into these value
//! types once, so nothing downstream depends on the importer's object lifetime.
//! A whole rig can also be stored as a JSON sidecar next to the model.

use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::clip::SkeletalAnimation;
use super::keyframe::KeyFrame;
use super::skeleton::{BoneTable, Skeleton, SkeletonNode};
use crate::core::{AnimationConfig, Error};

/// Current version of the rig file format
pub const RIG_FORMAT_VERSION: u32 = 1;

/// Raw keys for one animated node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    pub node_name: String,
    pub position_keys: Vec<KeyFrame<Vec3>>,
    pub rotation_keys: Vec<KeyFrame<Quat>>,
    pub scale_keys: Vec<KeyFrame<Vec3>>,
}

/// Raw clip as reported by the importer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    pub name: String,
    pub duration_in_ticks: f32,
    /// 0 when the source file does not specify it
    #[serde(default)]
    pub ticks_per_second: f32,
    pub channels: Vec<ChannelData>,
}

/// Skinned bone with its inverse bind pose
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneData {
    pub name: String,
    pub offset_matrix: Mat4,
}

/// Everything the animation core needs from one imported model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigAsset {
    pub version: u32,
    pub skeleton: SkeletonNode,
    /// Order defines palette slots
    pub bones: Vec<BoneData>,
    #[serde(default)]
    pub clips: Vec<ClipData>,
}

impl RigAsset {
    pub fn new(skeleton: SkeletonNode, bones: Vec<BoneData>, clips: Vec<ClipData>) -> Self {
        Self {
            version: RIG_FORMAT_VERSION,
            skeleton,
            bones,
            clips,
        }
    }

    /// Load from a JSON file
    pub fn load_json(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        let asset: Self = serde_json::from_str(&json)?;

        if asset.version != RIG_FORMAT_VERSION {
            return Err(Error::InvalidArgument(format!(
                "{}: unsupported rig version {} (expected {})",
                path.display(),
                asset.version,
                RIG_FORMAT_VERSION
            )));
        }

        Ok(asset)
    }

    /// Save as pretty-printed JSON
    pub fn save_json(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Build the shared skeleton and validated clips
    ///
    /// Fails on the first malformed clip or when the bone count exceeds
    /// `config.max_bones`.
    pub fn build(
        &self,
        config: &AnimationConfig,
    ) -> Result<(Arc<Skeleton>, Vec<SkeletalAnimation>), Error> {
        if self.bones.len() > config.max_bones {
            return Err(Error::CapacityExceeded {
                count: self.bones.len(),
                capacity: config.max_bones,
            });
        }

        let mut table = BoneTable::new(config.max_bones);
        for bone in &self.bones {
            table.add_bone(bone.name.clone(), bone.offset_matrix)?;
        }

        let skeleton = Arc::new(Skeleton::new(self.skeleton.clone(), table));

        let clips = self
            .clips
            .iter()
            .map(|clip| SkeletalAnimation::from_data(clip, config))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Rig built: {} nodes, {} bones, {} clips",
            self.skeleton.node_count(),
            skeleton.bone_count(),
            clips.len()
        );

        Ok((skeleton, clips))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rig() -> RigAsset {
        let skeleton = SkeletonNode::new("root", Mat4::IDENTITY)
            .with_child(SkeletonNode::new("arm", Mat4::from_translation(Vec3::X)));

        let bones = vec![
            BoneData {
                name: "root".to_string(),
                offset_matrix: Mat4::IDENTITY,
            },
            BoneData {
                name: "arm".to_string(),
                offset_matrix: Mat4::from_translation(-Vec3::X),
            },
        ];

        let clip = ClipData {
            name: "wave".to_string(),
            duration_in_ticks: 4.0,
            ticks_per_second: 2.0,
            channels: vec![ChannelData {
                node_name: "arm".to_string(),
                position_keys: vec![KeyFrame::new(Vec3::X, 0.0)],
                rotation_keys: vec![
                    KeyFrame::new(Quat::IDENTITY, 0.0),
                    KeyFrame::new(Quat::from_rotation_z(1.0), 4.0),
                ],
                scale_keys: vec![KeyFrame::new(Vec3::ONE, 0.0)],
            }],
        };

        RigAsset::new(skeleton, bones, vec![clip])
    }

    #[test]
    fn test_build() {
        let (skeleton, clips) = test_rig().build(&AnimationConfig::default()).unwrap();

        assert_eq!(skeleton.bone_count(), 2);
        assert_eq!(skeleton.bones().index_of("arm"), Some(1));
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name(), "wave");
        assert_eq!(clips[0].duration_in_seconds(), 2.0);
    }

    #[test]
    fn test_build_capacity_exceeded() {
        let config = AnimationConfig {
            max_bones: 1,
            ..Default::default()
        };
        let result = test_rig().build(&config);
        assert!(matches!(result, Err(Error::CapacityExceeded { count: 2, capacity: 1 })));
    }

    #[test]
    fn test_build_reports_bad_clip() {
        let mut rig = test_rig();
        rig.clips[0].channels[0].rotation_keys.swap(0, 1);

        let result = rig.build(&AnimationConfig::default());
        assert!(matches!(result, Err(Error::UnsortedKeyframes { .. })));
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rigs").join("wave.rig.json");

        let rig = test_rig();
        rig.save_json(&path).unwrap();
        let loaded = RigAsset::load_json(&path).unwrap();

        assert_eq!(loaded, rig);
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.rig.json");

        let mut rig = test_rig();
        rig.version = 99;
        rig.save_json(&path).unwrap();

        assert!(matches!(RigAsset::load_json(&path), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.rig.json");
        std::fs::write(&path, "{ \"version\": 1, ").unwrap();

        assert!(matches!(RigAsset::load_json(&path), Err(Error::Json(_))));
    }
}
