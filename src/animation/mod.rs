//! Skeletal animation system

pub mod transform;
pub mod keyframe;
pub mod node;
pub mod skeleton;
pub mod clip;
pub mod asset;
pub mod palette;
pub mod state;
pub mod animator;
pub mod blender;

pub use transform::Transform;
pub use keyframe::{KeyFrame, KeyTrack, QuatKey, TrackValue, Vec3Key};
pub use node::AnimationNode;
pub use skeleton::{BoneInfo, BoneTable, Skeleton, SkeletonNode};
pub use clip::SkeletalAnimation;
pub use asset::{BoneData, ChannelData, ClipData, RigAsset, RIG_FORMAT_VERSION};
pub use palette::{GpuBoneTransform, SkinningPalette};
pub use state::{AnimationState, AnimationStates};
pub use animator::Animator;
pub use blender::{AnimationBlender, BlendState};
