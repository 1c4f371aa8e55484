//! Timestamped keyframes and per-channel key tracks

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::{Error, TrackKind};

/// A value a key track can interpolate
pub trait TrackValue: Copy {
    /// Value of an empty track in the evaluation path
    const IDENTITY: Self;

    /// Blend `a` toward `b` by `t` in [0, 1]
    fn interpolate(a: Self, b: Self, t: f32) -> Self;

    /// Post-process a sampled value (rotations are re-normalized)
    fn finish(self) -> Self {
        self
    }
}

impl TrackValue for Vec3 {
    const IDENTITY: Self = Vec3::ZERO;

    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl TrackValue for Quat {
    const IDENTITY: Self = Quat::IDENTITY;

    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }

    fn finish(self) -> Self {
        self.normalize()
    }
}

/// A single keyed value
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame<T> {
    pub value: T,
    pub timestamp: f32,
}

impl<T> KeyFrame<T> {
    pub fn new(value: T, timestamp: f32) -> Self {
        Self { value, timestamp }
    }
}

/// Ordered keyframes for one component of one channel
///
/// Frames are kept in insertion order; callers supply ascending timestamps and
/// [`KeyTrack::validate`] checks that once at load time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyTrack<T> {
    frames: Vec<KeyFrame<T>>,
}

/// Translation or scale keys
pub type Vec3Key = KeyTrack<Vec3>;

/// Rotation keys
pub type QuatKey = KeyTrack<Quat>;

impl<T: TrackValue> KeyTrack<T> {
    /// Create an empty track
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Create a track from frames already in time order
    pub fn from_frames(frames: Vec<KeyFrame<T>>) -> Self {
        Self { frames }
    }

    /// Append a frame. No ordering check is made here.
    pub fn add_frame(&mut self, value: T, timestamp: f32) {
        self.frames.push(KeyFrame::new(value, timestamp));
    }

    pub fn frames(&self) -> &[KeyFrame<T>] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Timestamp of the last frame, 0 for an empty track
    pub fn end_time(&self) -> f32 {
        self.frames.last().map(|f| f.timestamp).unwrap_or(0.0)
    }

    /// Check the track's load-time preconditions
    ///
    /// Fails with `InvalidState` for an empty track and `UnsortedKeyframes` when a
    /// timestamp goes backwards. Adjacent frames sharing a timestamp are reported
    /// as `DegenerateTimestamps` only when `strict` is set; otherwise the first
    /// such index is returned so the caller can warn about it.
    /// The returned errors carry `node` and `track` but an empty clip name.
    pub fn validate(
        &self,
        node: &str,
        track: TrackKind,
        strict: bool,
    ) -> Result<Option<usize>, Error> {
        if self.frames.is_empty() {
            return Err(Error::InvalidState(format!(
                "channel '{}' has no {} keys",
                node, track
            )));
        }

        let mut first_degenerate = None;
        for (index, pair) in self.frames.windows(2).enumerate() {
            let next = index + 1;
            let time = pair[1].timestamp;

            if time < pair[0].timestamp {
                return Err(Error::UnsortedKeyframes {
                    clip: String::new(),
                    node: node.to_string(),
                    track,
                    index: next,
                    time,
                });
            }

            if time == pair[0].timestamp {
                if strict {
                    return Err(Error::DegenerateTimestamps {
                        clip: String::new(),
                        node: node.to_string(),
                        track,
                        index: next,
                        time,
                    });
                }
                first_degenerate.get_or_insert(next);
            }
        }

        Ok(first_degenerate)
    }

    /// Index `i` of the segment `[frames[i], frames[i + 1])` containing `time`
    ///
    /// This is the first `i` with `time < frames[i + 1].timestamp`. `None` means
    /// `time` is at or past the last frame.
    fn segment(&self, time: f32) -> Option<usize> {
        let next = self.frames.partition_point(|f| f.timestamp <= time);
        if next >= self.frames.len() {
            None
        } else {
            Some(next.saturating_sub(1))
        }
    }

    /// Sample the track at `time`
    ///
    /// - one frame: that frame's value, whatever `time` is
    /// - before the first frame: the first value
    /// - at or past the last frame: the last value (the pose is held)
    /// - a zero-length segment steps to the later frame
    ///
    /// An empty track yields `T::IDENTITY`; use [`KeyTrack::interpolate`] for the
    /// checked variant.
    pub fn sample(&self, time: f32) -> T {
        let (first, last) = match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return T::IDENTITY,
        };

        if self.frames.len() == 1 || time <= first.timestamp {
            return first.value.finish();
        }

        let Some(index) = self.segment(time) else {
            return last.value.finish();
        };

        let p0 = &self.frames[index];
        let p1 = &self.frames[index + 1];

        if time == p0.timestamp {
            return p0.value.finish();
        }

        let span = p1.timestamp - p0.timestamp;
        if span <= 0.0 {
            return p1.value.finish();
        }

        let scale_factor = (time - p0.timestamp) / span;
        T::interpolate(p0.value, p1.value, scale_factor).finish()
    }

    /// Sample the track, failing with `InvalidState` when it has no frames
    pub fn interpolate(&self, time: f32) -> Result<T, Error> {
        if self.frames.is_empty() {
            return Err(Error::InvalidState("cannot interpolate an empty key track".to_string()));
        }
        Ok(self.sample(time))
    }
}
