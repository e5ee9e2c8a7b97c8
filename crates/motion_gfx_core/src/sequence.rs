// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence containing ordered holders.

use crate::command::CommandRegistry;
use crate::holder::{EvaluationState, Holder, SequenceHolder};

/// Concrete container of holders.
///
/// Children are positioned in the sequence's local frame; the sequence spans
/// from its own origin to the latest child end time.
#[derive(Debug, Default)]
pub struct Sequence {
    /// Start time in the parent's frame
    start_time: f32,
    /// Span covering every child
    duration: f32,
    /// Children in playback order
    holders: Vec<Box<dyn Holder>>,
    /// Evaluation memory and clock
    evaluation: EvaluationState,
}

impl Sequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child holder
    pub fn push_holder(&mut self, holder: impl Holder + 'static) {
        self.holders.push(Box::new(holder));
    }

    /// Append an already boxed child holder
    pub fn push_boxed(&mut self, holder: Box<dyn Holder>) {
        self.holders.push(holder);
    }

    /// Children in playback order
    pub fn holders(&self) -> &[Box<dyn Holder>] {
        &self.holders
    }

    /// Nested sequences among the children, in playback order
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.holders.iter().filter_map(|h| h.as_sequence())
    }

    /// Place the sequence at `offset` and recompute its duration.
    ///
    /// Returns the new duration so callers can lay out the next sibling.
    pub fn calculate_duration(&mut self, offset: f32) -> f32 {
        self.start_time = offset;
        self.duration = self
            .holders
            .iter()
            .map(|h| h.end_time())
            .fold(0.0, f32::max);
        self.duration
    }
}

impl Holder for Sequence {
    fn start_time(&self) -> f32 {
        self.start_time
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn tick(&mut self, parent_time: f32, _clock: &CommandRegistry) {
        // Nested sequences run on their own clock
        self.evaluate(parent_time);
    }

    fn restart(&mut self, parent_time: f32) {
        self.init_evaluation(parent_time);
    }

    fn as_sequence(&self) -> Option<&Sequence> {
        Some(self)
    }
}

impl SequenceHolder for Sequence {
    fn evaluation(&self) -> &EvaluationState {
        &self.evaluation
    }

    fn evaluation_mut(&mut self) -> &mut EvaluationState {
        &mut self.evaluation
    }

    fn holder_count(&self) -> usize {
        self.holders.len()
    }

    fn clear_holders(&mut self) {
        self.holders.clear();
    }

    fn init_holders(&mut self, local_time: f32) {
        for holder in &mut self.holders {
            holder.restart(local_time);
        }
    }

    fn evaluate_holders(&mut self, local_time: f32) {
        let clock = self.evaluation.registry();
        for holder in &mut self.holders {
            holder.tick(local_time, clock);
        }
    }
}
