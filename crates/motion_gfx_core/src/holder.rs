// SPDX-License-Identifier: MIT OR Apache-2.0
//! Holder capabilities and the evaluation protocol.
//!
//! A [`Holder`] is anything with a start time and a duration. A
//! [`SequenceHolder`] additionally owns ordered children and remembers what it
//! was last evaluated with, which is how it tells forward playback apart from
//! a scrub:
//!
//! - forward tick while active: the clock advances by the time delta
//! - backward tick, re-entry, or a changed layout: the clock restarts at zero
//! - unchanged time: commands run again with the same elapsed time
//!
//! Children always receive time in their parent's local frame.

use crate::command::{CommandRegistry, CommandTime, SharedCommand};
use crate::sequence::Sequence;
use std::fmt;

/// Whether `local_time` falls inside a span of `duration`
pub fn span_contains(local_time: f32, duration: f32) -> bool {
    local_time >= 0.0 && local_time <= duration
}

/// Whether a container of `duration` is active at `local_time`.
///
/// Zero-length containers are never active.
pub fn container_active(local_time: f32, duration: f32) -> bool {
    duration > 0.0 && span_contains(local_time, duration)
}

/// A node with a position and a length on its parent's timeline
pub trait Holder: fmt::Debug + Send {
    /// Start time in the parent's local frame
    fn start_time(&self) -> f32;

    /// Length of the span (never negative)
    fn duration(&self) -> f32;

    /// End time in the parent's local frame
    fn end_time(&self) -> f32 {
        self.start_time() + self.duration()
    }

    /// Drive this holder for one tick.
    ///
    /// `parent_time` is the parent's local time; `clock` is the parent's
    /// elapsed-time clock.
    fn tick(&mut self, parent_time: f32, clock: &CommandRegistry);

    /// Restart evaluation at `parent_time` without invoking any command
    fn restart(&mut self, _parent_time: f32) {}

    /// Downcast to a nested sequence
    fn as_sequence(&self) -> Option<&Sequence> {
        None
    }
}

/// Values a sequence holder was last evaluated with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationMemory {
    /// Time passed to the last evaluation, in the parent's frame
    pub prev_global_time: f32,
    /// Start time at the last evaluation
    pub prev_start_time: f32,
    /// Duration at the last evaluation
    pub prev_duration: f32,
}

impl EvaluationMemory {
    /// Snapshot the given evaluation inputs
    pub fn new(global_time: f32, start_time: f32, duration: f32) -> Self {
        Self {
            prev_global_time: global_time,
            prev_start_time: start_time,
            prev_duration: duration,
        }
    }

    /// Whether the holder was active at the last evaluation
    pub fn was_active(&self) -> bool {
        container_active(
            self.prev_global_time - self.prev_start_time,
            self.prev_duration,
        )
    }

    /// Whether an evaluation at `global_time` continues the previous one.
    ///
    /// Continuity requires the holder to have been active, its layout to be
    /// unchanged, and time not to have moved backward.
    pub fn continues_at(&self, global_time: f32, start_time: f32, duration: f32) -> bool {
        self.was_active()
            && self.prev_start_time == start_time
            && self.prev_duration == duration
            && global_time >= self.prev_global_time
    }
}

/// Evaluation phase of a sequence holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Never evaluated
    #[default]
    Uninitialized,
    /// Last evaluated outside its span
    Inactive,
    /// Last evaluated inside its span
    Active,
}

/// Evaluation memory plus the holder's own elapsed-time clock
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationState {
    memory: Option<EvaluationMemory>,
    registry: CommandRegistry,
}

impl EvaluationState {
    /// Fresh, uninitialized state
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of the last evaluation, if any
    pub fn memory(&self) -> Option<EvaluationMemory> {
        self.memory
    }

    /// The holder's clock
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access to the holder's clock
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Record the inputs of an evaluation
    pub fn remember(&mut self, memory: EvaluationMemory) {
        self.memory = Some(memory);
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        match self.memory {
            None => Phase::Uninitialized,
            Some(memory) if memory.was_active() => Phase::Active,
            Some(_) => Phase::Inactive,
        }
    }
}

/// Branch taken by a single evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Outside the span; nothing invoked
    Inactive,
    /// Discontinuity; clock reset to zero before children ran
    Restarted,
    /// Forward playback; clock advanced by the delta
    Advanced(f32),
    /// Same time as before; children ran with the unchanged clock
    Held,
}

impl Tick {
    /// Whether children were evaluated on this tick
    pub fn is_active(&self) -> bool {
        !matches!(self, Tick::Inactive)
    }
}

/// A holder that owns ordered children and evaluation memory
pub trait SequenceHolder: Holder {
    /// Evaluation memory and clock
    fn evaluation(&self) -> &EvaluationState;

    /// Mutable evaluation memory and clock
    fn evaluation_mut(&mut self) -> &mut EvaluationState;

    /// Number of direct children
    fn holder_count(&self) -> usize;

    /// Drop every child
    fn clear_holders(&mut self);

    /// Restart every child at `local_time`
    fn init_holders(&mut self, local_time: f32);

    /// Tick every child in authored order at `local_time`
    fn evaluate_holders(&mut self, local_time: f32);

    /// Time elapsed on this holder's clock
    fn elapsed_time(&self) -> f32 {
        self.evaluation().registry().elapsed_time()
    }

    /// Whether this holder is active at `global_time`
    fn is_active_at(&self, global_time: f32) -> bool {
        container_active(global_time - self.start_time(), self.duration())
    }

    /// Establish a clean baseline at `global_time` without invoking commands
    fn init_evaluation(&mut self, global_time: f32) {
        let start_time = self.start_time();
        let duration = self.duration();

        self.init_holders(global_time - start_time);

        let state = self.evaluation_mut();
        state.registry_mut().reset();
        state.remember(EvaluationMemory::new(global_time, start_time, duration));
    }

    /// Evaluate this holder and its children at `global_time`
    fn evaluate(&mut self, global_time: f32) -> Tick {
        let start_time = self.start_time();
        let duration = self.duration();
        let local_time = global_time - start_time;

        let tick = if !container_active(local_time, duration) {
            Tick::Inactive
        } else {
            match self.evaluation().memory() {
                Some(memory) if memory.continues_at(global_time, start_time, duration) => {
                    let delta = global_time - memory.prev_global_time;
                    if delta > 0.0 {
                        self.evaluation_mut().registry_mut().advance(delta);
                        Tick::Advanced(delta)
                    } else {
                        Tick::Held
                    }
                }
                _ => {
                    self.evaluation_mut().registry_mut().reset();
                    self.init_holders(local_time);
                    Tick::Restarted
                }
            }
        };

        if tick.is_active() {
            self.evaluate_holders(local_time);
        }

        self.evaluation_mut()
            .remember(EvaluationMemory::new(global_time, start_time, duration));

        tracing::trace!(global_time, local_time, ?tick, "Evaluated sequence holder");
        tick
    }
}

/// Leaf holder that invokes a command while time is inside its span.
///
/// A leaf without a command only reserves time.
#[derive(Debug, Clone)]
pub struct CommandHolder {
    start_time: f32,
    duration: f32,
    command: Option<SharedCommand>,
}

impl CommandHolder {
    /// Create a leaf that invokes `command` over `[start_time, start_time + duration]`
    pub fn new(start_time: f32, duration: f32, command: SharedCommand) -> Self {
        Self {
            start_time: start_time.max(0.0),
            duration: duration.max(0.0),
            command: Some(command),
        }
    }

    /// Create a leaf that only reserves time
    pub fn hold(start_time: f32, duration: f32) -> Self {
        Self {
            start_time: start_time.max(0.0),
            duration: duration.max(0.0),
            command: None,
        }
    }

    /// The command this leaf invokes, if any
    pub fn command(&self) -> Option<&SharedCommand> {
        self.command.as_ref()
    }
}

impl Holder for CommandHolder {
    fn start_time(&self) -> f32 {
        self.start_time
    }

    fn duration(&self) -> f32 {
        self.duration
    }

    fn tick(&mut self, parent_time: f32, clock: &CommandRegistry) {
        let Some(command) = &self.command else {
            return;
        };

        let local_time = parent_time - self.start_time;
        if span_contains(local_time, self.duration) {
            command.invoke(CommandTime {
                elapsed: clock.elapsed_time(),
                local_time,
                duration: self.duration,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[test]
    fn test_memory_continuity() {
        let memory = EvaluationMemory::new(1.0, 0.0, 2.0);
        assert!(memory.was_active());
        assert!(memory.continues_at(1.5, 0.0, 2.0));
        assert!(memory.continues_at(1.0, 0.0, 2.0));

        // backward
        assert!(!memory.continues_at(0.5, 0.0, 2.0));
        // layout moved
        assert!(!memory.continues_at(1.5, 0.5, 2.0));
        assert!(!memory.continues_at(1.5, 0.0, 3.0));

        let outside = EvaluationMemory::new(3.0, 0.0, 2.0);
        assert!(!outside.was_active());
        assert!(!outside.continues_at(3.5, 0.0, 2.0));
    }

    #[test]
    fn test_zero_length_container_is_inactive() {
        assert!(!container_active(0.0, 0.0));
        assert!(container_active(0.0, 1.0));
        assert!(container_active(1.0, 1.0));
        assert!(!container_active(1.01, 1.0));
        assert!(span_contains(0.0, 0.0));
    }

    #[test]
    fn test_phase() {
        let mut state = EvaluationState::new();
        assert_eq!(state.phase(), Phase::Uninitialized);

        state.remember(EvaluationMemory::new(5.0, 0.0, 2.0));
        assert_eq!(state.phase(), Phase::Inactive);

        state.remember(EvaluationMemory::new(1.0, 0.0, 2.0));
        assert_eq!(state.phase(), Phase::Active);
    }

    #[test]
    fn test_command_holder_invokes_inside_span() {
        let recorder = Recorder::new();
        let mut holder = CommandHolder::new(1.0, 2.0, recorder.command("a"));
        let mut clock = CommandRegistry::new();
        clock.advance(0.75);

        holder.tick(0.5, &clock);
        assert!(recorder.is_empty());

        holder.tick(1.5, &clock);
        holder.tick(3.0, &clock);
        holder.tick(3.5, &clock);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.local_time, 0.5);
        assert_eq!(calls[0].1.elapsed, 0.75);
        assert_eq!(calls[1].1.local_time, 2.0);
    }

    #[test]
    fn test_hold_never_invokes() {
        let mut holder = CommandHolder::hold(0.0, 1.0);
        assert!(holder.command().is_none());
        holder.tick(0.5, &CommandRegistry::new());
        assert_eq!(holder.end_time(), 1.0);
    }

    #[test]
    fn test_command_holder_clamps_negative_span() {
        let holder = CommandHolder::hold(-1.0, -2.0);
        assert_eq!(holder.start_time(), 0.0);
        assert_eq!(holder.duration(), 0.0);
    }
}
