// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared test fixtures.

use crate::command::{CommandTime, SharedCommand};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every command invocation in order
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Arc<Mutex<Vec<(String, CommandTime)>>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A command that records under `label`
    pub(crate) fn command(&self, label: &str) -> SharedCommand {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        SharedCommand::new(move |time: CommandTime| calls.lock().push((label.clone(), time)))
    }

    pub(crate) fn calls(&self) -> Vec<(String, CommandTime)> {
        self.calls.lock().clone()
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(label, _)| label.clone()).collect()
    }

    /// Elapsed times seen by the command recorded under `label`
    pub(crate) fn elapsed(&self, label: &str) -> Vec<f32> {
        self.calls
            .lock()
            .iter()
            .filter(|(l, _)| l == label)
            .map(|(_, time)| time.elapsed)
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}
