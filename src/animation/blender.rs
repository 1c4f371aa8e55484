//! 2D blend space over several concurrently playing clips
//!
//! Each registered state covers a rectangular region of the blend parameter
//! space (speed and direction, for example). Every frame each state's weight is
//! recomputed from the blend position, all clips are evaluated over the shared
//! skeleton, and the per-bone local and parent transforms are blended by weight.
//!
//! Rotations are combined by chained slerp, which depends on registration order
//! once more than two states contribute. This is an approximation of a true
//! rotation average and is good enough for the usual two or three inputs.

use std::collections::HashSet;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use super::clip::SkeletalAnimation;
use super::palette::SkinningPalette;
use super::skeleton::Skeleton;
use super::transform::Transform;
use crate::core::Error;

/// Total weights at or below this are treated as zero
const WEIGHT_EPSILON: f32 = 1e-6;

/// One bone as evaluated by a single state
#[derive(Clone, Copy, Debug, PartialEq)]
struct NodePose {
    local: Transform,
    parent: Mat4,
}

/// A clip registered over a region of the blend space
#[derive(Clone, Debug)]
pub struct BlendState {
    pub name: String,
    pub min_range: Vec2,
    pub max_range: Vec2,
    pub anim_index: usize,
    pub weight: f32,
    /// Indexed by bone index; `None` for bones the hierarchy walk never reached
    anim_nodes: Vec<Option<NodePose>>,
}

impl BlendState {
    pub fn center(&self) -> Vec2 {
        (self.min_range + self.max_range) * 0.5
    }
}

/// Blend-space evaluator writing its own skinning palette
#[derive(Clone, Debug)]
pub struct AnimationBlender {
    skeleton: Arc<Skeleton>,
    clips: Vec<SkeletalAnimation>,
    states: Vec<BlendState>,
    range: Option<(Vec2, Vec2)>,
    blended: Vec<Transform>,
    palette: SkinningPalette,
}

impl AnimationBlender {
    pub fn new(skeleton: Arc<Skeleton>, clips: Vec<SkeletalAnimation>) -> Self {
        let bone_count = skeleton.bone_count();
        Self {
            skeleton,
            clips,
            states: Vec::new(),
            range: None,
            blended: vec![Transform::IDENTITY; bone_count],
            palette: SkinningPalette::new(bone_count),
        }
    }

    /// Register clip `anim_index` over the region `[min_range, max_range]`
    /// Returns the index of the new blend state
    pub fn add_animation(
        &mut self,
        anim_index: usize,
        min_range: Vec2,
        max_range: Vec2,
    ) -> Result<usize, Error> {
        let clip = self.clips.get(anim_index).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "blend animation index {} out of range ({} clips)",
                anim_index,
                self.clips.len()
            ))
        })?;

        if min_range.cmpgt(max_range).any() {
            return Err(Error::InvalidArgument(format!(
                "blend region min {} exceeds max {}",
                min_range, max_range
            )));
        }

        let index = self.states.len();
        self.states.push(BlendState {
            name: clip.name().to_string(),
            min_range,
            max_range,
            anim_index,
            weight: 0.0,
            anim_nodes: Vec::new(),
        });

        log::debug!(
            "Blend state {} -> clip '{}' over [{}, {}]",
            index,
            clip.name(),
            min_range,
            max_range
        );

        Ok(index)
    }

    /// Bound the blend space; incoming positions are clamped into it
    pub fn set_range(&mut self, min: Vec2, max: Vec2) -> Result<(), Error> {
        if min.cmpgt(max).any() {
            return Err(Error::InvalidArgument(format!(
                "blend range min {} exceeds max {}",
                min, max
            )));
        }
        self.range = Some((min, max));
        Ok(())
    }

    pub fn clear_range(&mut self) {
        self.range = None;
    }

    /// Radial falloff weight of `current_pos` inside the region
    ///
    /// The position is clamped into the region, and its offset from the center
    /// is divided by the half extent on each axis. An axis with zero extent
    /// contributes no distance. The weight is `max(0, 1 - length)`: 1 at the
    /// center, 0 at the corners. Weights of different regions are independent
    /// and are normalized only when blending.
    pub fn calculate_weight_for_range(current_pos: Vec2, min_range: Vec2, max_range: Vec2) -> f32 {
        let clamped = current_pos.clamp(min_range, max_range);
        let center = (min_range + max_range) * 0.5;
        let half_extent = (max_range - min_range) * 0.5;

        let axis = |offset: f32, half: f32| if half > 0.0 { offset / half } else { 0.0 };
        let normalized = Vec2::new(
            axis(clamped.x - center.x, half_extent.x),
            axis(clamped.y - center.y, half_extent.y),
        );

        (1.0 - normalized.length()).max(0.0)
    }

    /// Advance every referenced clip once and write the blended palette
    pub fn blend_animations(&mut self, current_position: Vec2, delta_time: f32, speed: f32) {
        let bone_count = self.skeleton.bone_count();
        self.palette.reset(bone_count);
        self.blended.clear();
        self.blended.resize(bone_count, Transform::IDENTITY);

        if self.states.is_empty() {
            return;
        }

        let position = match self.range {
            Some((min, max)) => current_position.clamp(min, max),
            None => current_position,
        };

        let mut updated = HashSet::new();
        for state in &mut self.states {
            state.weight =
                Self::calculate_weight_for_range(position, state.min_range, state.max_range);

            if updated.insert(state.anim_index) {
                if let Some(clip) = self.clips.get_mut(state.anim_index) {
                    clip.update_time(delta_time, speed);
                }
            }
        }

        for state in &mut self.states {
            state.anim_nodes.clear();
            state.anim_nodes.resize(bone_count, None);

            let Some(clip) = self.clips.get_mut(state.anim_index) else {
                continue;
            };
            let bones = self.skeleton.bones();
            let anim_nodes = &mut state.anim_nodes;

            self.skeleton.walk(|node, parent| {
                let local_matrix = clip.local_transform(node);

                if let Some(index) = bones.index_of(&node.name) {
                    let local = match clip.find_channel(&node.name) {
                        Some(channel) => channel.pose(),
                        None => Transform::from_matrix(local_matrix),
                    };
                    anim_nodes[index] = Some(NodePose {
                        local,
                        parent: *parent,
                    });
                }

                *parent * local_matrix
            });
        }

        let weights = self.effective_weights();
        let total_weight: f32 = weights.iter().sum();

        for (index, bone) in self.skeleton.bones().iter().enumerate() {
            let poses = self
                .states
                .iter()
                .zip(&weights)
                .filter(|(_, weight)| **weight > 0.0)
                .filter_map(|(state, weight)| {
                    let pose = state.anim_nodes.get(index).copied().flatten()?;
                    Some((pose, *weight))
                });

            let mut local = Accumulator::default();
            let mut parent = Accumulator::default();
            for (pose, weight) in poses {
                local.add(&pose.local, weight);
                parent.add(&Transform::from_matrix(pose.parent), weight);
            }

            let Some(local) = local.finish(total_weight) else {
                continue;
            };
            let parent = parent.finish(total_weight).unwrap_or(Transform::IDENTITY);

            self.blended[index] = local;
            self.palette
                .set(index, parent.to_matrix() * local.to_matrix() * bone.offset_matrix);
        }
    }

    /// State weights, falling back to the single highest-weighted state
    /// (first registered on ties) when every weight is zero
    fn effective_weights(&self) -> Vec<f32> {
        let mut weights: Vec<f32> = self.states.iter().map(|state| state.weight).collect();

        if weights.iter().sum::<f32>() <= WEIGHT_EPSILON {
            let best = weights
                .iter()
                .enumerate()
                .fold(0, |best, (index, weight)| {
                    if *weight > weights[best] { index } else { best }
                });

            log::trace!("All blend weights are zero; using state {} alone", best);

            weights.iter_mut().for_each(|weight| *weight = 0.0);
            weights[best] = 1.0;
        }

        weights
    }

    pub fn states(&self) -> &[BlendState] {
        &self.states
    }

    /// `(state name, weight)` pairs from the last blend
    pub fn weights(&self) -> impl Iterator<Item = (&str, f32)> {
        self.states.iter().map(|state| (state.name.as_str(), state.weight))
    }

    /// Blended local transform of a bone from the last blend
    pub fn blended_local(&self, bone_index: usize) -> Option<&Transform> {
        self.blended.get(bone_index)
    }

    pub fn clip(&self, index: usize) -> Option<&SkeletalAnimation> {
        self.clips.get(index)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn final_bone_matrices(&self) -> &[Mat4] {
        self.palette.as_slice()
    }

    pub fn palette(&self) -> &SkinningPalette {
        &self.palette
    }
}

/// Weighted running sum of transforms
#[derive(Default)]
struct Accumulator {
    translation: Vec3,
    scale: Vec3,
    rotation: Option<Quat>,
    weight: f32,
}

impl Accumulator {
    fn add(&mut self, transform: &Transform, weight: f32) {
        self.translation += transform.translation * weight;
        self.scale += transform.scale * weight;
        self.weight += weight;

        self.rotation = Some(match self.rotation {
            None => transform.rotation,
            Some(rotation) => rotation.slerp(transform.rotation, weight / self.weight),
        });
    }

    fn finish(self, total_weight: f32) -> Option<Transform> {
        let rotation = self.rotation?;
        Some(Transform::new(
            self.translation / total_weight,
            rotation.normalize(),
            self.scale / total_weight,
        ))
    }
}
