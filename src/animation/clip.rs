//! Skeletal animation clips and their time cursor

use std::collections::HashMap;

use glam::Mat4;

use super::asset::ClipData;
use super::keyframe::KeyTrack;
use super::node::AnimationNode;
use super::skeleton::SkeletonNode;
use super::transform::Transform;
use crate::core::{AnimationConfig, Error};

/// One clip: per-node channels plus a looping playback cursor
#[derive(Clone, Debug)]
pub struct SkeletalAnimation {
    name: String,
    duration_in_ticks: f32,
    ticks_per_second: f32,
    channels: HashMap<String, AnimationNode>,
    time_in_seconds: f32,
    time_in_ticks: f32,
}

impl SkeletalAnimation {
    /// Create a clip without channels
    ///
    /// A `ticks_per_second` of 0 means "unspecified" and is replaced by the
    /// configured default when clips are built through [`SkeletalAnimation::from_data`].
    pub fn new(name: impl Into<String>, duration_in_ticks: f32, ticks_per_second: f32) -> Self {
        Self {
            name: name.into(),
            duration_in_ticks,
            ticks_per_second,
            channels: HashMap::new(),
            time_in_seconds: 0.0,
            time_in_ticks: 0.0,
        }
    }

    /// Copy a clip out of imported data, validating every channel
    pub fn from_data(data: &ClipData, config: &AnimationConfig) -> Result<Self, Error> {
        if !(data.duration_in_ticks >= 0.0 && data.duration_in_ticks.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "clip '{}' has invalid duration {}",
                data.name, data.duration_in_ticks
            )));
        }
        if !(data.ticks_per_second >= 0.0 && data.ticks_per_second.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "clip '{}' has invalid ticks per second {}",
                data.name, data.ticks_per_second
            )));
        }

        let ticks_per_second = config.ticks_per_second(data.ticks_per_second);
        let mut clip = Self::new(data.name.clone(), data.duration_in_ticks, ticks_per_second);

        for channel in &data.channels {
            let node = AnimationNode::new(
                KeyTrack::from_frames(channel.position_keys.clone()),
                KeyTrack::from_frames(channel.rotation_keys.clone()),
                KeyTrack::from_frames(channel.scale_keys.clone()),
            );
            clip.add_channel(channel.node_name.clone(), node, config.strict_timestamps)?;
        }

        if clip.duration_in_ticks == 0.0 {
            log::warn!("Clip '{}' has zero duration; its time cursor will stay at 0", clip.name);
        }

        log::debug!(
            "Loaded clip '{}': {} channels, {} ticks at {} ticks/s",
            clip.name,
            clip.channels.len(),
            clip.duration_in_ticks,
            clip.ticks_per_second
        );

        Ok(clip)
    }

    /// Validate and insert a channel, replacing any previous one for the same node
    pub fn add_channel(
        &mut self,
        node_name: impl Into<String>,
        node: AnimationNode,
        strict: bool,
    ) -> Result<(), Error> {
        let node_name = node_name.into();

        let degenerate = node
            .validate(&node_name, strict)
            .map_err(|e| e.in_clip(&self.name))?;
        for (track, index) in degenerate {
            log::warn!(
                "Clip '{}', channel '{}': {} key {} repeats the previous timestamp; stepping to it",
                self.name,
                node_name,
                track,
                index
            );
        }

        if self.channels.insert(node_name.clone(), node).is_some() {
            log::warn!(
                "Clip '{}' has more than one channel for '{}'; keeping the last",
                self.name,
                node_name
            );
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_in_ticks(&self) -> f32 {
        self.duration_in_ticks
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Clip length in seconds (0 when the timing is degenerate)
    pub fn duration_in_seconds(&self) -> f32 {
        if self.ticks_per_second > 0.0 {
            self.duration_in_ticks / self.ticks_per_second
        } else {
            0.0
        }
    }

    pub fn time_in_seconds(&self) -> f32 {
        self.time_in_seconds
    }

    pub fn time_in_ticks(&self) -> f32 {
        self.time_in_ticks
    }

    /// Advance the cursor by `delta_time * speed` seconds, looping at the clip end
    ///
    /// Negative speeds play backwards and wrap into `[0, duration)`.
    pub fn update_time(&mut self, delta_time: f32, speed: f32) {
        let period = self.duration_in_seconds();
        if period <= 0.0 {
            self.time_in_seconds += delta_time * speed;
            self.time_in_ticks = 0.0;
            return;
        }

        self.time_in_seconds = (self.time_in_seconds + delta_time * speed).rem_euclid(period);
        self.time_in_ticks =
            (self.time_in_seconds * self.ticks_per_second).rem_euclid(self.duration_in_ticks);
    }

    /// Rewind the cursor to the start of the clip
    pub fn reset_time(&mut self) {
        self.time_in_seconds = 0.0;
        self.time_in_ticks = 0.0;
    }

    /// Channel for a node, `None` when the clip does not animate it
    pub fn find_channel(&self, node_name: &str) -> Option<&AnimationNode> {
        self.channels.get(node_name)
    }

    pub fn find_channel_mut(&mut self, node_name: &str) -> Option<&mut AnimationNode> {
        self.channels.get_mut(node_name)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> impl Iterator<Item = (&str, &AnimationNode)> {
        self.channels.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Local transform of `node` at the current tick time
    ///
    /// Evaluates the node's channel if the clip has one, otherwise returns the
    /// node's rest transform.
    pub fn local_transform(&mut self, node: &SkeletonNode) -> Mat4 {
        let time = self.time_in_ticks;
        match self.channels.get_mut(&node.name) {
            Some(channel) => {
                channel.update(time);
                channel.local_transform
            }
            None => node.rest_transform,
        }
    }

    /// Decomposed local transform of `node` at the current tick time
    pub fn local_pose(&mut self, node: &SkeletonNode) -> Transform {
        let time = self.time_in_ticks;
        match self.channels.get_mut(&node.name) {
            Some(channel) => {
                channel.update(time);
                channel.pose()
            }
            None => Transform::from_matrix(node.rest_transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::asset::ChannelData;
    use crate::animation::keyframe::KeyFrame;
    use glam::{Quat, Vec3};

    fn channel(name: &str, end: Vec3) -> ChannelData {
        ChannelData {
            node_name: name.to_string(),
            position_keys: vec![KeyFrame::new(Vec3::ZERO, 0.0), KeyFrame::new(end, 10.0)],
            rotation_keys: vec![KeyFrame::new(Quat::IDENTITY, 0.0)],
            scale_keys: vec![KeyFrame::new(Vec3::ONE, 0.0)],
        }
    }

    fn clip_data(ticks_per_second: f32) -> ClipData {
        ClipData {
            name: "walk".to_string(),
            duration_in_ticks: 10.0,
            ticks_per_second,
            channels: vec![channel("root", Vec3::X), channel("spine", Vec3::Y)],
        }
    }

    #[test]
    fn test_from_data() {
        let config = AnimationConfig::default();
        let clip = SkeletalAnimation::from_data(&clip_data(5.0), &config).unwrap();

        assert_eq!(clip.name(), "walk");
        assert_eq!(clip.channel_count(), 2);
        assert_eq!(clip.ticks_per_second(), 5.0);
        assert_eq!(clip.duration_in_seconds(), 2.0);
        assert!(clip.find_channel("spine").is_some());
        assert!(clip.find_channel("head").is_none());
    }

    #[test]
    fn test_unspecified_ticks_per_second_uses_default() {
        let defaults = AnimationConfig::default();
        let clip = SkeletalAnimation::from_data(&clip_data(0.0), &defaults).unwrap();
        assert_eq!(clip.ticks_per_second(), 1.0);

        let config = AnimationConfig {
            default_ticks_per_second: 25.0,
            ..Default::default()
        };
        let clip = SkeletalAnimation::from_data(&clip_data(0.0), &config).unwrap();
        assert_eq!(clip.ticks_per_second(), 25.0);
    }

    #[test]
    fn test_time_wraps_after_one_period() {
        let mut clip = SkeletalAnimation::new("cycle", 48.0, 24.0);

        clip.update_time(0.5, 1.0);
        assert_eq!(clip.time_in_ticks(), 12.0);

        for _ in 0..3 {
            clip.update_time(0.5, 1.0);
        }
        assert_eq!(clip.time_in_ticks(), 0.0);
        assert_eq!(clip.time_in_seconds(), 0.0);
    }

    #[test]
    fn test_speed_scales_time() {
        let mut clip = SkeletalAnimation::new("cycle", 100.0, 10.0);
        clip.update_time(1.0, 2.5);
        assert!((clip.time_in_ticks() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_negative_speed_wraps_backwards() {
        let mut clip = SkeletalAnimation::new("cycle", 10.0, 1.0);
        clip.update_time(2.0, -1.0);
        assert!((clip.time_in_ticks() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_keeps_cursor_at_start() {
        let mut clip = SkeletalAnimation::new("pose", 0.0, 30.0);
        clip.update_time(1.0, 1.0);
        assert_eq!(clip.time_in_ticks(), 0.0);
    }

    #[test]
    fn test_reset_time() {
        let mut clip = SkeletalAnimation::new("cycle", 10.0, 1.0);
        clip.update_time(3.0, 1.0);
        clip.reset_time();
        assert_eq!(clip.time_in_seconds(), 0.0);
        assert_eq!(clip.time_in_ticks(), 0.0);
    }

    #[test]
    fn test_local_transform_falls_back_to_rest() {
        let config = AnimationConfig::default();
        let mut clip = SkeletalAnimation::from_data(&clip_data(1.0), &config).unwrap();
        clip.update_time(5.0, 1.0);

        let rest = Mat4::from_translation(Vec3::new(0.0, 0.0, 9.0));
        let head = SkeletonNode::new("head", rest);
        assert_eq!(clip.local_transform(&head), rest);

        let root = SkeletonNode::new("root", rest);
        let animated = clip.local_transform(&root);
        assert!((animated.w_axis.truncate() - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_empty_channel_track_names_clip() {
        let mut data = clip_data(1.0);
        data.channels[1].scale_keys.clear();

        let err = SkeletalAnimation::from_data(&data, &AnimationConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'walk'"));
        assert!(msg.contains("'spine'"));
    }

    #[test]
    fn test_strict_rejects_duplicate_timestamps() {
        let mut data = clip_data(1.0);
        data.channels[0].position_keys.push(KeyFrame::new(Vec3::Z, 10.0));

        let lenient = SkeletalAnimation::from_data(&data, &AnimationConfig::default());
        assert!(lenient.is_ok());

        let strict = AnimationConfig {
            strict_timestamps: true,
            ..Default::default()
        };
        match SkeletalAnimation::from_data(&data, &strict) {
            Err(Error::DegenerateTimestamps { clip, node, index, .. }) => {
                assert_eq!(clip, "walk");
                assert_eq!(node, "root");
                assert_eq!(index, 2);
            }
            other => panic!("expected DegenerateTimestamps, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut data = clip_data(1.0);
        data.duration_in_ticks = -1.0;
        assert!(matches!(
            SkeletalAnimation::from_data(&data, &AnimationConfig::default()),
            Err(Error::InvalidArgument(_))
        ));
    }
}
