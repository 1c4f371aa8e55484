//! Origin Anim - skeletal animation core for the ORigin engine
//!
//! Evaluates keyframed clips over a static skeleton hierarchy and produces the
//! per-bone skinning palette consumed by the renderer.

pub mod core;
pub mod animation;
