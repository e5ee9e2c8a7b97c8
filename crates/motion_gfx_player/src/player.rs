// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame loop tying the playback controller, the host timeline and a scene together.

use crate::config::{PlayerConfig, ScriptStep};
use crate::demo::PropertyStore;
use crate::playback::PlaybackController;
use crate::timeline::HeadlessTimeline;
use motion_gfx_core::{Holder, Scene, SceneUpdate};
use std::collections::VecDeque;

/// Result of one player frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame index, starting at 0
    pub frame: u32,
    /// Global time evaluated on this frame
    pub time: f32,
    /// What the scene did
    pub update: SceneUpdate,
}

/// Headless player
pub struct Player {
    config: PlayerConfig,
    scene: Scene,
    store: PropertyStore,
    timeline: HeadlessTimeline,
    controller: PlaybackController,
    script: VecDeque<ScriptStep>,
    wait_frames: u32,
    frame: u32,
}

impl Player {
    /// Create a player for `scene`, whose commands write into `store`
    pub fn new(config: PlayerConfig, mut scene: Scene, store: PropertyStore) -> Self {
        let mut timeline = HeadlessTimeline::new(config.frame_rate, config.clip_start);
        scene.on_duration_changed(timeline.rebuild_request_handler());

        // first tick happens before the clock is attached
        scene.update(&mut timeline);
        timeline.rebuild_graph_if_requested();

        let mut controller = PlaybackController::new();
        controller.speed = config.speed;
        controller.looping = config.looping;
        if let Some((start, end)) = config.loop_range {
            controller.set_loop_range(start, end);
        }
        controller.seek(config.clip_start);
        if config.script.is_empty() {
            controller.play();
        }

        Self {
            script: config.script.iter().copied().collect(),
            config,
            scene,
            store,
            timeline,
            controller,
            wait_frames: 0,
            frame: 0,
        }
    }

    /// The scene being played
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The host timeline
    pub fn timeline(&self) -> &HeadlessTimeline {
        &self.timeline
    }

    /// The playback controller
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Apply script steps until one asks to wait
    fn run_script(&mut self) {
        while self.wait_frames == 0 {
            match self.script.pop_front() {
                Some(ScriptStep::Wait(frames)) => self.wait_frames = frames,
                Some(step) => {
                    tracing::debug!(frame = self.frame, ?step, "Script step");
                    self.controller.apply(step);
                }
                None => break,
            }
        }
        self.wait_frames = self.wait_frames.saturating_sub(1);
    }

    /// Advance one frame and evaluate the scene
    pub fn step(&mut self) -> FrameReport {
        self.run_script();

        if self.frame > 0 {
            let end = self.config.clip_start + self.scene.duration();
            self.controller.update(self.config.frame_duration(), end);
        }

        let time = self.controller.time;
        self.timeline.time = Some(time);
        let update = self.scene.update(&mut self.timeline);
        self.timeline.rebuild_graph_if_requested();

        tracing::trace!(frame = self.frame, time, tick = ?update.tick, "Frame");

        let report = FrameReport {
            frame: self.frame,
            time,
            update,
        };
        self.frame += 1;
        report
    }

    /// Run the configured number of frames
    pub fn run(&mut self) -> Vec<FrameReport> {
        let mut reports = Vec::with_capacity(self.config.frames as usize);
        for _ in 0..self.config.frames {
            let report = self.step();

            if self.config.log_every > 0 && report.frame % self.config.log_every == 0 {
                tracing::info!(
                    frame = report.frame,
                    time = report.time,
                    properties = ?self.store.snapshot(),
                    "Frame"
                );
            }
            reports.push(report);
        }
        reports
    }
}
