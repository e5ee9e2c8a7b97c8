// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timing and evaluation core for Motion GFX.
//!
//! This crate schedules procedural motion:
//! - Clips materialize into nested sequences
//! - Sequences lay out their children and compute their span
//! - A scene lays clips out back-to-back and is ticked by the host
//! - Commands receive an elapsed time that survives scrubbing
//!
//! ## Architecture
//!
//! The engine is built on two capabilities:
//! - [`Holder`]: a start time and a duration
//! - [`SequenceHolder`]: ordered children plus evaluation memory
//!
//! Durations propagate bottom-up when content changes; evaluation runs
//! top-down every tick, restarting a holder's clock whenever time jumps
//! backward or the holder is re-entered.

pub mod clip;
pub mod command;
pub mod ease;
pub mod error;
pub mod holder;
pub mod scene;
pub mod sequence;

#[cfg(test)]
mod testing;

pub use clip::{
    materialize, ActionClip, ChainClip, Clip, ClipId, ClipRef, GroupClip, SequenceBuilder,
    WaitClip, MAX_NESTING_DEPTH,
};
pub use command::{Command, CommandRegistry, CommandTime, SharedCommand};
pub use ease::{tween, Ease, Lerp, Tween};
pub use error::ContentError;
pub use holder::{
    CommandHolder, EvaluationMemory, EvaluationState, Holder, Phase, SequenceHolder, Tick,
};
pub use scene::{Scene, SceneUpdate, TimelineHost};
pub use sequence::Sequence;
