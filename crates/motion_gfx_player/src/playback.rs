// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback controller producing the host's global time.

use crate::config::ScriptStep;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
    /// Playing in reverse
    Reverse,
}

/// Drives global time forward, backward, or by jumps
#[derive(Debug, Clone)]
pub struct PlaybackController {
    /// Current playback time
    pub time: f32,
    /// Playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    pub speed: f32,
    /// Wrap around at the ends
    pub looping: bool,
    /// Loop start point (for loop range)
    pub loop_start: Option<f32>,
    /// Loop end point (for loop range)
    pub loop_end: Option<f32>,
}

impl PlaybackController {
    /// Create a new playback controller
    pub fn new() -> Self {
        Self {
            time: 0.0,
            state: PlaybackState::Stopped,
            speed: 1.0,
            looping: false,
            loop_start: None,
            loop_end: None,
        }
    }

    /// Advance playback by `delta_time` against a timeline of `duration`
    pub fn update(&mut self, delta_time: f32, duration: f32) {
        match self.state {
            PlaybackState::Playing => {
                self.time += delta_time * self.speed;
                self.check_bounds(duration);
            }
            PlaybackState::Reverse => {
                self.time -= delta_time * self.speed;
                self.check_bounds_reverse(duration);
            }
            PlaybackState::Paused | PlaybackState::Stopped => {}
        }
    }

    /// Check and handle end of timeline
    fn check_bounds(&mut self, duration: f32) {
        let end_time = self.loop_end.unwrap_or(duration);

        if self.time >= end_time {
            if self.looping || self.loop_end.is_some() {
                let start = self.loop_start.unwrap_or(0.0);
                let span = end_time - start;
                self.time = if span > 0.0 {
                    start + (self.time - end_time) % span
                } else {
                    start
                };
            } else {
                self.time = end_time;
                self.state = PlaybackState::Stopped;
            }
        }
    }

    /// Check and handle reverse playback bounds
    fn check_bounds_reverse(&mut self, duration: f32) {
        let start_time = self.loop_start.unwrap_or(0.0);

        if self.time <= start_time {
            if self.looping || self.loop_start.is_some() {
                let end = self.loop_end.unwrap_or(duration);
                let span = end - start_time;
                self.time = if span > 0.0 {
                    end - (start_time - self.time) % span
                } else {
                    end
                };
            } else {
                self.time = start_time;
                self.state = PlaybackState::Stopped;
            }
        }
    }

    /// Apply a scripted action
    pub fn apply(&mut self, step: ScriptStep) {
        match step {
            ScriptStep::Play => self.play(),
            ScriptStep::Pause => self.pause(),
            ScriptStep::Reverse => self.play_reverse(),
            ScriptStep::Stop => self.stop(),
            ScriptStep::Toggle => self.toggle_playback(),
            ScriptStep::ClearLoop => self.clear_loop_range(),
            ScriptStep::Seek(time) => self.seek(time),
            ScriptStep::Wait(_) => {}
        }
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.is_playing() {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop and reset to beginning
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.time = self.loop_start.unwrap_or(0.0);
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        match self.state {
            PlaybackState::Playing | PlaybackState::Reverse => self.pause(),
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Play in reverse
    pub fn play_reverse(&mut self) {
        self.state = PlaybackState::Reverse;
    }

    /// Seek to specific time
    pub fn seek(&mut self, time: f32) {
        self.time = time.max(0.0);
    }

    /// Set loop range
    pub fn set_loop_range(&mut self, start: f32, end: f32) {
        self.loop_start = Some(start);
        self.loop_end = Some(end);
    }

    /// Clear loop range
    pub fn clear_loop_range(&mut self) {
        self.loop_start = None;
        self.loop_end = None;
    }

    /// Is currently playing (forward or reverse)
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Reverse)
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_stops_at_end() {
        let mut controller = PlaybackController::new();
        controller.play();
        controller.update(1.5, 2.0);
        assert_eq!(controller.time, 1.5);

        controller.update(1.0, 2.0);
        assert_eq!(controller.time, 2.0);
        assert_eq!(controller.state, PlaybackState::Stopped);
    }

    #[test]
    fn test_looping_wraps() {
        let mut controller = PlaybackController::new();
        controller.looping = true;
        controller.play();
        controller.update(2.5, 2.0);
        assert_eq!(controller.time, 0.5);
        assert!(controller.is_playing());
    }

    #[test]
    fn test_reverse_stops_at_start() {
        let mut controller = PlaybackController::new();
        controller.seek(1.0);
        controller.play_reverse();
        controller.update(0.25, 2.0);
        assert_eq!(controller.time, 0.75);

        controller.update(1.0, 2.0);
        assert_eq!(controller.time, 0.0);
        assert_eq!(controller.state, PlaybackState::Stopped);
    }

    #[test]
    fn test_loop_range_in_reverse() {
        let mut controller = PlaybackController::new();
        controller.set_loop_range(1.0, 2.0);
        controller.seek(1.25);
        controller.play_reverse();
        controller.update(0.5, 4.0);
        assert_eq!(controller.time, 1.75);

        controller.apply(ScriptStep::ClearLoop);
        assert!(controller.loop_start.is_none());
    }

    #[test]
    fn test_script_steps() {
        let mut controller = PlaybackController::new();
        controller.apply(ScriptStep::Play);
        assert!(controller.is_playing());

        controller.apply(ScriptStep::Seek(-3.0));
        assert_eq!(controller.time, 0.0);

        controller.apply(ScriptStep::Pause);
        assert_eq!(controller.state, PlaybackState::Paused);
        controller.update(1.0, 2.0);
        assert_eq!(controller.time, 0.0);

        controller.apply(ScriptStep::Toggle);
        assert_eq!(controller.state, PlaybackState::Playing);

        controller.apply(ScriptStep::Seek(1.0));
        controller.apply(ScriptStep::Stop);
        assert_eq!(controller.time, 0.0);
        assert_eq!(controller.state, PlaybackState::Stopped);
    }
}
