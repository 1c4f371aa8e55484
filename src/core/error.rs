//! Error types for the animation core
//!
//! Every variant except `Io`/`Json` describes malformed animation data. They are
//! raised while a rig or clip is being loaded so that per-frame evaluation can
//! run on validated input without branching on errors.

use std::fmt;

use thiserror::Error;

/// Which of a channel's three key tracks an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Translation,
    Rotation,
    Scale,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Translation => "translation",
            TrackKind::Rotation => "rotation",
            TrackKind::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// Main error type for the animation core
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("bone count {count} exceeds palette capacity {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },

    #[error("clip '{clip}', channel '{node}': {track} key {index} repeats timestamp {time}")]
    DegenerateTimestamps {
        clip: String,
        node: String,
        track: TrackKind,
        index: usize,
        time: f32,
    },

    #[error("clip '{clip}', channel '{node}': {track} key {index} at {time} goes back in time")]
    UnsortedKeyframes {
        clip: String,
        node: String,
        track: TrackKind,
        index: usize,
        time: f32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the clip name to an error raised while validating one of its channels
    pub(crate) fn in_clip(self, clip_name: &str) -> Self {
        match self {
            Error::DegenerateTimestamps {
                node,
                track,
                index,
                time,
                ..
            } => Error::DegenerateTimestamps {
                clip: clip_name.to_string(),
                node,
                track,
                index,
                time,
            },
            Error::UnsortedKeyframes {
                node,
                track,
                index,
                time,
                ..
            } => Error::UnsortedKeyframes {
                clip: clip_name.to_string(),
                node,
                track,
                index,
                time,
            },
            Error::InvalidState(msg) => {
                Error::InvalidState(format!("clip '{}': {}", clip_name, msg))
            }
            other => other,
        }
    }
}
