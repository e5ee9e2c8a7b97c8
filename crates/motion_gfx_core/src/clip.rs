// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clips: authored content that materializes into sequences.

use crate::command::{Command, SharedCommand};
use crate::error::{sanitize_duration, sanitize_offset, ContentError};
use crate::holder::{CommandHolder, Holder};
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum clip nesting depth
pub const MAX_NESTING_DEPTH: usize = 16;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a clip
pub type ClipRef = Arc<dyn Clip>;

/// Authored content that knows how to lay itself out as a sequence
pub trait Clip: Send + Sync {
    /// Stable identity of this clip
    fn id(&self) -> ClipId;

    /// Display name
    fn name(&self) -> &str {
        "Clip"
    }

    /// Populate the sequence being built for this clip
    fn create_sequence(&self, builder: &mut SequenceBuilder<'_>);

    /// Length this clip occupies once materialized
    fn duration(&self) -> f32 {
        let mut sequence = Sequence::new();
        materialize(self, &mut sequence);
        sequence.calculate_duration(0.0)
    }
}

impl fmt::Debug for dyn Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Bookkeeping shared by every builder of one materialization
#[derive(Debug, Default)]
struct BuildContext {
    /// Clips currently being materialized, outermost first
    ancestors: Vec<ClipId>,
    /// Normalizations applied so far
    issues: Vec<ContentError>,
}

/// Populate `sequence` from `clip`, replacing nothing that is already there.
///
/// Returns every normalization applied to the clip's content.
pub fn materialize<C: Clip + ?Sized>(clip: &C, sequence: &mut Sequence) -> Vec<ContentError> {
    let mut context = BuildContext::default();
    context.ancestors.push(clip.id());
    clip.create_sequence(&mut SequenceBuilder {
        sequence,
        context: &mut context,
    });

    for issue in &context.issues {
        tracing::warn!(clip = clip.name(), "{issue}");
    }
    context.issues
}

/// Builder handed to [`Clip::create_sequence`].
///
/// Offsets are in the local frame of the clip being built. Invalid offsets
/// and durations are clamped to zero; nesting a clip inside itself (directly
/// or through another clip) or nesting deeper than [`MAX_NESTING_DEPTH`] is
/// refused.
pub struct SequenceBuilder<'a> {
    sequence: &'a mut Sequence,
    context: &'a mut BuildContext,
}

impl SequenceBuilder<'_> {
    /// Clip currently being built
    pub fn clip_id(&self) -> Option<ClipId> {
        self.context.ancestors.last().copied()
    }

    /// Current nesting depth (1 for a top-level clip)
    pub fn depth(&self) -> usize {
        self.context.ancestors.len()
    }

    /// Latest end time among the holders added so far
    pub fn end_time(&self) -> f32 {
        self.sequence
            .holders()
            .iter()
            .map(|h| h.end_time())
            .fold(0.0, f32::max)
    }

    /// Invoke `command` over `[start_time, start_time + duration]`
    pub fn command(&mut self, start_time: f32, duration: f32, command: SharedCommand) -> &mut Self {
        let clip = self.clip_id();
        let start_time = sanitize_offset(start_time, clip, &mut self.context.issues);
        let duration = sanitize_duration(duration, clip, &mut self.context.issues);
        self.sequence
            .push_holder(CommandHolder::new(start_time, duration, command));
        self
    }

    /// Reserve `duration` from the clip's origin without invoking anything
    pub fn hold(&mut self, duration: f32) -> &mut Self {
        let clip = self.clip_id();
        let duration = sanitize_duration(duration, clip, &mut self.context.issues);
        self.sequence.push_holder(CommandHolder::hold(0.0, duration));
        self
    }

    /// Nest `clip` as a child sequence starting at `start_time`.
    ///
    /// Returns the nested duration, or `0.0` if the clip was refused.
    pub fn clip<C: Clip + ?Sized>(&mut self, start_time: f32, clip: &C) -> f32 {
        let id = clip.id();

        if self.context.ancestors.contains(&id) {
            self.context.issues.push(ContentError::CyclicClip { clip: id });
            return 0.0;
        }
        if self.context.ancestors.len() >= MAX_NESTING_DEPTH {
            self.context.issues.push(ContentError::NestingTooDeep {
                clip: id,
                max_depth: MAX_NESTING_DEPTH,
            });
            return 0.0;
        }

        let start_time = sanitize_offset(start_time, self.clip_id(), &mut self.context.issues);

        let mut nested = Sequence::new();
        self.context.ancestors.push(id);
        clip.create_sequence(&mut SequenceBuilder {
            sequence: &mut nested,
            context: &mut *self.context,
        });
        self.context.ancestors.pop();

        let duration = nested.calculate_duration(start_time);
        self.sequence.push_holder(nested);
        duration
    }
}

/// A single command spanning an authored duration
pub struct ActionClip {
    id: ClipId,
    name: String,
    duration: f32,
    command: SharedCommand,
}

impl ActionClip {
    /// Create an action clip from any command
    pub fn new(name: impl Into<String>, duration: f32, command: impl Command + 'static) -> Self {
        Self::from_shared(name, duration, SharedCommand::new(command))
    }

    /// Create an action clip from an existing command handle
    pub fn from_shared(name: impl Into<String>, duration: f32, command: SharedCommand) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            duration,
            command,
        }
    }
}

impl Clip for ActionClip {
    fn id(&self) -> ClipId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn create_sequence(&self, builder: &mut SequenceBuilder<'_>) {
        builder.command(0.0, self.duration, self.command.clone());
    }
}

/// An empty span of an authored duration
#[derive(Debug, Clone)]
pub struct WaitClip {
    id: ClipId,
    duration: f32,
}

impl WaitClip {
    /// Create a wait of `duration`
    pub fn new(duration: f32) -> Self {
        Self {
            id: ClipId::new(),
            duration,
        }
    }
}

impl Clip for WaitClip {
    fn id(&self) -> ClipId {
        self.id
    }

    fn name(&self) -> &str {
        "Wait"
    }

    fn create_sequence(&self, builder: &mut SequenceBuilder<'_>) {
        builder.hold(self.duration);
    }
}

/// Children played back-to-back
pub struct ChainClip {
    id: ClipId,
    name: String,
    clips: Vec<ClipRef>,
}

impl ChainClip {
    /// Create an empty chain
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            clips: Vec::new(),
        }
    }

    /// Append a clip to the chain
    pub fn then(mut self, clip: impl Clip + 'static) -> Self {
        self.clips.push(Arc::new(clip));
        self
    }

    /// Append a shared clip to the chain
    pub fn then_shared(mut self, clip: ClipRef) -> Self {
        self.clips.push(clip);
        self
    }

    /// Clips in playback order
    pub fn clips(&self) -> &[ClipRef] {
        &self.clips
    }
}

impl Clip for ChainClip {
    fn id(&self) -> ClipId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn create_sequence(&self, builder: &mut SequenceBuilder<'_>) {
        let mut offset = 0.0;
        for clip in &self.clips {
            offset += builder.clip(offset, clip.as_ref());
        }
    }
}

/// Children played together, each delayed by `stagger` after the previous one
pub struct GroupClip {
    id: ClipId,
    name: String,
    clips: Vec<ClipRef>,
    stagger: f32,
}

impl GroupClip {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            clips: Vec::new(),
            stagger: 0.0,
        }
    }

    /// Add a clip to the group
    pub fn with(mut self, clip: impl Clip + 'static) -> Self {
        self.clips.push(Arc::new(clip));
        self
    }

    /// Add a shared clip to the group
    pub fn with_shared(mut self, clip: ClipRef) -> Self {
        self.clips.push(clip);
        self
    }

    /// Delay between consecutive children
    pub fn stagger(mut self, stagger: f32) -> Self {
        self.stagger = stagger;
        self
    }
}

impl Clip for GroupClip {
    fn id(&self) -> ClipId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn create_sequence(&self, builder: &mut SequenceBuilder<'_>) {
        for (index, clip) in self.clips.iter().enumerate() {
            builder.clip(index as f32 * self.stagger, clip.as_ref());
        }
    }
}
