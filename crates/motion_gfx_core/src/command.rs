// SPDX-License-Identifier: MIT OR Apache-2.0
//! Commands and the elapsed-time clock they read.
//!
//! A command is an opaque, time-dependent side effect (tweening a property,
//! spawning particles, ...). The core never inspects what a command does; it
//! only guarantees *when* a command is invoked and which elapsed time it sees.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Elapsed-time clock owned by a sequence holder.
///
/// The value is the time accumulated since the last [`reset`](Self::reset).
/// Only the evaluation pass of the owning holder may call [`reset`](Self::reset)
/// or [`advance`](Self::advance); touching the clock from anywhere else while
/// commands depend on it leaves those commands with undefined readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandRegistry {
    elapsed_time: f32,
}

impl CommandRegistry {
    /// Create a clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Time accumulated since the last reset
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Zero the elapsed time
    pub fn reset(&mut self) {
        self.elapsed_time = 0.0;
    }

    /// Advance the elapsed time by `delta`.
    ///
    /// `delta` must be non-negative. The evaluation protocol resets the clock
    /// instead of advancing it whenever time moves backward, so a negative
    /// delta indicates a caller bug and is dropped.
    pub fn advance(&mut self, delta: f32) {
        if delta >= 0.0 {
            self.elapsed_time += delta;
        } else {
            tracing::warn!(delta, "Ignoring negative elapsed-time delta");
        }
    }
}

/// Timing handed to a command on invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandTime {
    /// Elapsed time since the owning sequence last reset its clock (never negative)
    pub elapsed: f32,
    /// Time within the command's own span, in `[0, duration]`
    pub local_time: f32,
    /// Length of the command's span
    pub duration: f32,
}

impl CommandTime {
    /// Normalized position within the span, in `[0, 1]`.
    ///
    /// Zero-length spans report `1.0` so instantaneous commands land on their
    /// final state.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.local_time / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// A time-dependent side effect invoked by the evaluation pass
pub trait Command: Send {
    /// Apply the effect for this tick
    fn invoke(&mut self, time: CommandTime);
}

impl<F> Command for F
where
    F: FnMut(CommandTime) + Send,
{
    fn invoke(&mut self, time: CommandTime) {
        self(time);
    }
}

/// Command handle shared between a clip and the holders materialized from it.
///
/// Clips are rebuilt into fresh holders on every content change, so the
/// command itself lives behind a shared handle instead of inside the holder.
#[derive(Clone)]
pub struct SharedCommand(Arc<Mutex<dyn Command>>);

impl SharedCommand {
    /// Wrap a command
    pub fn new(command: impl Command + 'static) -> Self {
        Self(Arc::new(Mutex::new(command)))
    }

    /// Invoke the wrapped command
    pub fn invoke(&self, time: CommandTime) {
        self.0.lock().invoke(time);
    }
}

impl fmt::Debug for SharedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCommand").finish_non_exhaustive()
    }
}
