//! Core engine types and utilities

pub mod config;
pub mod error;
pub mod logging;

pub use config::AnimationConfig;
pub use error::{Error, TrackKind};
