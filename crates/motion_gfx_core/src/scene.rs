// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene: the root of a clip tree and the per-tick entry point.
//!
//! The scene owns the authored clips, rebuilds one [`Sequence`] per clip when
//! content changes, lays them out back-to-back and evaluates them against the
//! host's clock.

use crate::clip::{materialize, Clip, ClipId, ClipRef};
use crate::command::CommandRegistry;
use crate::error::ContentError;
use crate::holder::{EvaluationState, Holder, SequenceHolder, Tick};
use crate::sequence::Sequence;
use std::fmt;
use std::sync::Arc;

/// The host timeline a scene is placed on
pub trait TimelineHost {
    /// Current global time, or `None` while no driver is attached
    fn global_time(&self) -> Option<f32>;

    /// Where the scene starts on the host timeline
    fn clip_start(&self) -> f32 {
        0.0
    }

    /// Shortest clip the host can represent (usually one frame)
    fn min_clip_duration(&self) -> Option<f32> {
        None
    }

    /// Receive the scene duration and the variant clamped to the host minimum
    fn write_clip_duration(&mut self, duration: f32, clamped: f32);
}

/// What happened during [`Scene::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneUpdate {
    /// Sequences were rebuilt from the clips
    pub rebuilt: bool,
    /// The total duration differs from the last notified value
    pub duration_changed: bool,
    /// Evaluation result, if the host supplied a global time
    pub tick: Option<Tick>,
}

type DurationHandler = Box<dyn FnMut(f32) + Send>;

/// Root sequence holder owning authored clips
pub struct Scene {
    /// Scene name
    name: String,
    /// Authored clips in playback order; a clip may appear more than once
    clips: Vec<ClipRef>,
    /// One sequence per clip, same order
    sequences: Vec<Sequence>,
    /// Position on the host timeline
    start_time: f32,
    /// Sum of sequence durations
    duration: f32,
    /// Duration reported by the last duration-changed notification
    notified_duration: f32,
    /// Clips changed since the last rebuild
    content_changed: bool,
    /// Normalizations applied by the last rebuild
    issues: Vec<ContentError>,
    /// Evaluation memory and clock
    evaluation: EvaluationState,
    /// Called once per duration change
    duration_handlers: Vec<DurationHandler>,
    /// Called after every rebuild
    rebuilt_handlers: Vec<DurationHandler>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clips: Vec::new(),
            sequences: Vec::new(),
            start_time: 0.0,
            duration: 0.0,
            notified_duration: 0.0,
            content_changed: true,
            issues: Vec::new(),
            evaluation: EvaluationState::new(),
            duration_handlers: Vec::new(),
            rebuilt_handlers: Vec::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a clip
    pub fn push_clip(&mut self, clip: impl Clip + 'static) -> ClipId {
        self.push_shared(Arc::new(clip))
    }

    /// Append a shared clip. The same clip may be pushed repeatedly.
    pub fn push_shared(&mut self, clip: ClipRef) -> ClipId {
        let id = clip.id();
        self.clips.push(clip);
        self.content_changed = true;
        id
    }

    /// Insert a shared clip at `index` (clamped to the clip count)
    pub fn insert_clip(&mut self, index: usize, clip: ClipRef) -> ClipId {
        let id = clip.id();
        let index = index.min(self.clips.len());
        self.clips.insert(index, clip);
        self.content_changed = true;
        id
    }

    /// Remove the first occurrence of a clip, keeping the order of the others
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Option<ClipRef> {
        let index = self.index_of(clip_id)?;
        self.remove_clip_at(index)
    }

    /// Remove the clip at `index`, keeping the order of the others
    pub fn remove_clip_at(&mut self, index: usize) -> Option<ClipRef> {
        if index >= self.clips.len() {
            return None;
        }
        self.content_changed = true;
        Some(self.clips.remove(index))
    }

    /// Replace every clip
    pub fn set_clips(&mut self, clips: impl IntoIterator<Item = ClipRef>) {
        self.clips = clips.into_iter().collect();
        self.content_changed = true;
    }

    /// Remove every clip
    pub fn clear_clips(&mut self) {
        self.clips.clear();
        self.content_changed = true;
    }

    /// Position of the first occurrence of a clip
    pub fn index_of(&self, clip_id: ClipId) -> Option<usize> {
        self.clips.iter().position(|clip| clip.id() == clip_id)
    }

    /// Get a clip
    pub fn clip(&self, clip_id: ClipId) -> Option<&ClipRef> {
        self.clips.iter().find(|clip| clip.id() == clip_id)
    }

    /// All clips in playback order
    pub fn clips(&self) -> &[ClipRef] {
        &self.clips
    }

    /// Get clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Flag authored content as changed so the next update rebuilds
    pub fn mark_changed(&mut self) {
        self.content_changed = true;
    }

    /// Whether the next update will rebuild
    pub fn is_content_changed(&self) -> bool {
        self.content_changed
    }

    /// Sequences built by the last rebuild, in clip order
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Sequence built for the first occurrence of a clip
    pub fn sequence_for(&self, clip_id: ClipId) -> Option<&Sequence> {
        self.sequences.get(self.index_of(clip_id)?)
    }

    /// Start of the first occurrence of a clip in the scene's local frame
    pub fn clip_start_time(&self, clip_id: ClipId) -> Option<f32> {
        self.sequence_for(clip_id).map(Holder::start_time)
    }

    /// Normalizations applied by the last rebuild
    pub fn content_issues(&self) -> &[ContentError] {
        &self.issues
    }

    /// Register a handler called once whenever the total duration changes
    pub fn on_duration_changed(&mut self, handler: impl FnMut(f32) + Send + 'static) {
        self.duration_handlers.push(Box::new(handler));
    }

    /// Register a handler called with the new duration after every rebuild
    pub fn on_rebuilt(&mut self, handler: impl FnMut(f32) + Send + 'static) {
        self.rebuilt_handlers.push(Box::new(handler));
    }

    /// Rebuild every sequence from the clips and lay them out back-to-back.
    ///
    /// Returns the total duration.
    pub fn rebuild(&mut self) -> f32 {
        self.duration = 0.0;
        self.issues.clear();
        self.sequences.resize_with(self.clips.len(), Sequence::new);

        for (sequence, clip) in self.sequences.iter_mut().zip(&self.clips) {
            sequence.clear_holders();
            self.issues.extend(materialize(clip.as_ref(), sequence));
            // accumulated duration is where this sequence starts
            self.duration += sequence.calculate_duration(self.duration);
        }
        self.content_changed = false;

        tracing::debug!(
            scene = %self.name,
            clips = self.clips.len(),
            duration = self.duration,
            issues = self.issues.len(),
            "Rebuilt scene sequences"
        );

        for handler in &mut self.rebuilt_handlers {
            handler(self.duration);
        }
        self.duration
    }

    /// Run one host tick: rebuild if needed, report duration, evaluate
    pub fn update(&mut self, host: &mut dyn TimelineHost) -> SceneUpdate {
        let rebuilt = self.content_changed;
        if rebuilt {
            self.rebuild();
        }

        self.start_time = host.clip_start();

        let clamped = host
            .min_clip_duration()
            .map_or(self.duration, |min| self.duration.max(min));
        host.write_clip_duration(self.duration, clamped);

        let duration_changed = self.notified_duration != self.duration;
        if duration_changed {
            tracing::debug!(
                scene = %self.name,
                from = self.notified_duration,
                to = self.duration,
                "Scene duration changed"
            );
            for handler in &mut self.duration_handlers {
                handler(self.duration);
            }
            self.notified_duration = self.duration;
        }

        let tick = host.global_time().map(|global_time| {
            if rebuilt {
                self.init_evaluation(global_time);
            }
            self.evaluate(global_time)
        });

        SceneUpdate {
            rebuilt,
            duration_changed,
            tick,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled Scene")
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("clips", &self.clips.len())
            .field("start_time", &self.start_time)
            .field("duration", &self.duration)
            .field("content_changed", &self.content_changed)
            .field("evaluation", &self.evaluation)
            .finish_non_exhaustive()
    }
}

impl Holder for Scene {
    fn start_time(&self) -> f32 {
        self.start_time
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn tick(&mut self, parent_time: f32, _clock: &CommandRegistry) {
        self.evaluate(parent_time);
    }

    fn restart(&mut self, parent_time: f32) {
        self.init_evaluation(parent_time);
    }
}

impl SequenceHolder for Scene {
    fn evaluation(&self) -> &EvaluationState {
        &self.evaluation
    }

    fn evaluation_mut(&mut self) -> &mut EvaluationState {
        &mut self.evaluation
    }

    fn holder_count(&self) -> usize {
        self.sequences.len()
    }

    fn clear_holders(&mut self) {
        self.sequences.clear();
        self.content_changed = true;
    }

    fn init_holders(&mut self, local_time: f32) {
        for sequence in &mut self.sequences {
            sequence.restart(local_time);
        }
    }

    fn evaluate_holders(&mut self, local_time: f32) {
        let clock = self.evaluation.registry();
        for sequence in &mut self.sequences {
            sequence.tick(local_time, clock);
        }
    }
}
