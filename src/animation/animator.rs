//! Single-clip playback producing the skinning palette

use std::sync::Arc;

use glam::Mat4;

use super::clip::SkeletalAnimation;
use super::palette::SkinningPalette;
use super::skeleton::{BoneTable, Skeleton, SkeletonNode};
use super::state::AnimationStates;
use crate::core::Error;

/// Runtime animator: walks the skeleton once per frame for the bound clip
#[derive(Clone, Debug)]
pub struct Animator {
    skeleton: Arc<Skeleton>,
    clips: Vec<SkeletalAnimation>,
    current: Option<usize>,
    palette: SkinningPalette,
}

impl Animator {
    /// Create an animator with no clips; the palette starts at the rest pose
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let mut palette = SkinningPalette::new(skeleton.bone_count());
        for (index, matrix) in skeleton.rest_pose_palette().into_iter().enumerate() {
            palette.set(index, matrix);
        }

        Self {
            skeleton,
            clips: Vec::new(),
            current: None,
            palette,
        }
    }

    /// Create an animator owning the given clips, none of them playing
    pub fn with_clips(skeleton: Arc<Skeleton>, clips: Vec<SkeletalAnimation>) -> Self {
        let mut animator = Self::new(skeleton);
        animator.clips = clips;
        animator
    }

    /// Add an animation clip to this animator
    /// Returns the index of the added clip
    pub fn add_clip(&mut self, clip: SkeletalAnimation) -> usize {
        let index = self.clips.len();
        self.clips.push(clip);
        index
    }

    /// Get a reference to a clip by index
    pub fn clip(&self, index: usize) -> Option<&SkeletalAnimation> {
        self.clips.get(index)
    }

    /// Get the number of clips in this animator
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_clip(&self) -> Option<&SkeletalAnimation> {
        self.current.and_then(|index| self.clips.get(index))
    }

    /// Bind a clip and rewind it to the start
    ///
    /// This is a hard cut: the next update shows the new clip's first pose with
    /// no blend from the previous one. Use [`Animator::update_crossfade`] for a
    /// transition.
    pub fn play_animation(&mut self, index: usize) -> Result<(), Error> {
        let count = self.clips.len();
        let clip = self.clips.get_mut(index).ok_or_else(|| {
            Error::InvalidArgument(format!("clip index {} out of range ({} clips)", index, count))
        })?;

        clip.reset_time();
        self.current = Some(index);
        Ok(())
    }

    /// Play the clip bound to the active state
    pub fn play_state(&mut self, states: &AnimationStates) -> Result<(), Error> {
        let index = states
            .current_clip()
            .ok_or_else(|| Error::InvalidState("no active animation state".to_string()))?;
        self.play_animation(index)
    }

    /// Make `index` the current clip without rewinding it
    ///
    /// Ends a crossfade: the target clip keeps the time it reached while fading in.
    pub fn complete_crossfade(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.clips.len() {
            return Err(Error::InvalidArgument(format!(
                "clip index {} out of range ({} clips)",
                index,
                self.clips.len()
            )));
        }
        self.current = Some(index);
        Ok(())
    }

    /// Unbind the current clip; the next update writes the rest pose
    pub fn stop(&mut self) {
        self.current = None;
    }

    /// Advance the current clip and rebuild the palette
    pub fn update_animation(&mut self, delta_time: f32, speed: f32) {
        let bone_count = self.skeleton.bone_count();
        self.palette.reset(bone_count);

        let skeleton = &self.skeleton;
        let bones = skeleton.bones();
        let palette = &mut self.palette;

        let Some(clip) = self.current.and_then(|index| self.clips.get_mut(index)) else {
            skeleton.walk(|node, parent| {
                let global = *parent * node.rest_transform;
                write_bone(palette, bones, node, global);
                global
            });
            return;
        };

        clip.update_time(delta_time, speed);

        skeleton.walk(|node, parent| {
            let global = *parent * clip.local_transform(node);
            write_bone(palette, bones, node, global);
            global
        });
    }

    /// Advance the current clip and `target`, and write a palette that blends
    /// their local poses by `factor` (0 = current only, 1 = target only)
    ///
    /// Both clips advance on their own time cursors. With no current clip the
    /// target plays alone; an out-of-range target falls back to
    /// [`Animator::update_animation`].
    pub fn update_crossfade(&mut self, delta_time: f32, speed: f32, target: usize, factor: f32) {
        if target >= self.clips.len() {
            log::warn!("Crossfade target {} out of range ({} clips)", target, self.clips.len());
            self.update_animation(delta_time, speed);
            return;
        }

        let Some(current) = self.current.filter(|&index| index != target) else {
            if self.current.is_none() {
                self.current = Some(target);
            }
            self.update_animation(delta_time, speed);
            return;
        };

        let factor = factor.clamp(0.0, 1.0);
        let bone_count = self.skeleton.bone_count();
        self.palette.reset(bone_count);

        let (from, to) = pair_mut(&mut self.clips, current, target);
        from.update_time(delta_time, speed);
        to.update_time(delta_time, speed);

        let skeleton = &self.skeleton;
        let bones = skeleton.bones();
        let palette = &mut self.palette;

        skeleton.walk(|node, parent| {
            let animated =
                from.find_channel(&node.name).is_some() || to.find_channel(&node.name).is_some();
            let local = if !animated {
                node.rest_transform
            } else {
                from.local_pose(node).lerp(&to.local_pose(node), factor).to_matrix()
            };

            let global = *parent * local;
            write_bone(palette, bones, node, global);
            global
        });
    }

    /// Get the skeleton reference
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    /// Final bone transforms from the last update, indexed by bone index
    pub fn final_bone_matrices(&self) -> &[Mat4] {
        self.palette.as_slice()
    }

    pub fn palette(&self) -> &SkinningPalette {
        &self.palette
    }

    /// Get the number of bones in the skeleton
    pub fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }
}

/// Store `global * offset` if `node` is a registered bone
fn write_bone(palette: &mut SkinningPalette, bones: &BoneTable, node: &SkeletonNode, global: Mat4) {
    if let Some(index) = bones.index_of(&node.name) {
        if let Some(bone) = bones.get(index) {
            palette.set(index, global * bone.offset_matrix);
        }
    }
}

/// Two distinct mutable elements of a slice
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "pair_mut needs two distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
