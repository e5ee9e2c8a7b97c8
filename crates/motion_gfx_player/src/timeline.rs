// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless host timeline the scene is placed on.

use motion_gfx_core::TimelineHost;
use parking_lot::Mutex;
use std::sync::Arc;

/// Minimal stand-in for an editor timeline: one clip, one clock
#[derive(Debug)]
pub struct HeadlessTimeline {
    /// Global time of the current frame, if a driver is attached
    pub time: Option<f32>,
    /// Where the scene clip starts
    pub clip_start: f32,
    /// Timeline frame rate
    pub frame_rate: f32,
    /// Length written back by the scene
    clip_duration: f32,
    /// Length clamped to one frame
    clamped_duration: f32,
    /// Duration waiting for a graph rebuild
    pending_rebuild: Arc<Mutex<Option<f32>>>,
    /// Number of graph rebuilds performed
    graph_rebuilds: u32,
}

impl HeadlessTimeline {
    /// Create a timeline at `frame_rate` with no driver attached
    pub fn new(frame_rate: f32, clip_start: f32) -> Self {
        Self {
            time: None,
            clip_start,
            frame_rate,
            clip_duration: 0.0,
            clamped_duration: 0.0,
            pending_rebuild: Arc::new(Mutex::new(None)),
            graph_rebuilds: 0,
        }
    }

    /// Handler to register with [`motion_gfx_core::Scene::on_duration_changed`]
    pub fn rebuild_request_handler(&self) -> impl FnMut(f32) + Send + 'static {
        let pending = Arc::clone(&self.pending_rebuild);
        move |duration| *pending.lock() = Some(duration)
    }

    /// Rebuild the playback graph if the scene asked for it.
    ///
    /// Returns the duration the graph was rebuilt for.
    pub fn rebuild_graph_if_requested(&mut self) -> Option<f32> {
        let duration = self.pending_rebuild.lock().take()?;
        self.graph_rebuilds += 1;
        tracing::info!(
            duration,
            clamped = self.clamped_duration,
            "Rebuilt playback graph"
        );
        Some(duration)
    }

    /// Clip length as last written by the scene
    pub fn clip_duration(&self) -> f32 {
        self.clip_duration
    }

    /// Clip length clamped to at least one frame
    pub fn clamped_duration(&self) -> f32 {
        self.clamped_duration
    }

    /// Number of graph rebuilds so far
    pub fn graph_rebuilds(&self) -> u32 {
        self.graph_rebuilds
    }
}

impl TimelineHost for HeadlessTimeline {
    fn global_time(&self) -> Option<f32> {
        self.time
    }

    fn clip_start(&self) -> f32 {
        self.clip_start
    }

    fn min_clip_duration(&self) -> Option<f32> {
        // the minimum duration of a clip is the length of a single frame
        (self.frame_rate > 0.0).then(|| 1.0 / self.frame_rate)
    }

    fn write_clip_duration(&mut self, duration: f32, clamped: f32) {
        self.clip_duration = duration;
        self.clamped_duration = clamped;
    }
}
