// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves and tween commands.

use crate::command::{Command, CommandTime};
use serde::{Deserialize, Serialize};

/// Easing curve applied to a command's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Ease {
    /// Holds the start value until the end of the span
    Constant,
    /// Linear
    #[default]
    Linear,
    /// Quadratic, accelerating
    InQuad,
    /// Quadratic, decelerating
    OutQuad,
    /// Quadratic, accelerating then decelerating
    InOutQuad,
    /// Cubic, accelerating
    InCubic,
    /// Cubic, decelerating
    OutCubic,
    /// Cubic, accelerating then decelerating
    InOutCubic,
    /// Hermite smoothstep
    Smooth,
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Constant => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Ease::Linear => t,
            Ease::InQuad => t * t,
            Ease::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::InCubic => t * t * t,
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
            Ease::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::Smooth => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Values that can be blended linearly
pub trait Lerp: Copy + Send {
    /// Blend from `self` to `other` by `t`
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl<const N: usize> Lerp for [f32; N] {
    fn lerp(self, other: Self, t: f32) -> Self {
        let mut out = self;
        for (value, target) in out.iter_mut().zip(other) {
            *value = value.lerp(target, t);
        }
        out
    }
}

/// Command that blends between two values over its span
pub struct Tween<T, F> {
    from: T,
    to: T,
    ease: Ease,
    apply: F,
}

impl<T, F> Command for Tween<T, F>
where
    T: Lerp,
    F: FnMut(T) + Send,
{
    fn invoke(&mut self, time: CommandTime) {
        let t = self.ease.apply(time.progress());
        (self.apply)(self.from.lerp(self.to, t));
    }
}

/// Build a command that writes the eased blend of `from` and `to` through `apply`
pub fn tween<T, F>(from: T, to: T, ease: Ease, apply: F) -> Tween<T, F>
where
    T: Lerp,
    F: FnMut(T) + Send,
{
    Tween { from, to, ease, apply }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_close;

    #[test]
    fn test_curves_hit_endpoints() {
        let curves = [
            Ease::Linear,
            Ease::InQuad,
            Ease::OutQuad,
            Ease::InOutQuad,
            Ease::InCubic,
            Ease::OutCubic,
            Ease::InOutCubic,
            Ease::Smooth,
        ];
        for ease in curves {
            assert_close(ease.apply(0.0), 0.0);
            assert_close(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_curve_shapes() {
        assert_eq!(Ease::Linear.apply(0.25), 0.25);
        assert_eq!(Ease::InQuad.apply(0.5), 0.25);
        assert_eq!(Ease::OutQuad.apply(0.5), 0.75);
        assert_eq!(Ease::Smooth.apply(0.5), 0.5);
        assert_eq!(Ease::Constant.apply(0.99), 0.0);
        assert_eq!(Ease::Constant.apply(1.0), 1.0);
        assert_eq!(Ease::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_lerp_arrays() {
        assert_eq!(2.0_f32.lerp(4.0, 0.5), 3.0);
        assert_eq!([0.0, 10.0, 20.0].lerp([10.0, 10.0, 0.0], 0.5), [5.0, 10.0, 10.0]);
    }

    #[test]
    fn test_tween_applies_eased_value() {
        let mut last = None;
        {
            let mut command = tween(0.0_f32, 8.0, Ease::InQuad, |v| last = Some(v));
            command.invoke(CommandTime { elapsed: 0.0, local_time: 1.0, duration: 2.0 });
        }
        assert_eq!(last, Some(2.0));
    }
}
