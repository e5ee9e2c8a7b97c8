// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content problems found while materializing clips.
//!
//! None of these abort a rebuild. The offending value is normalized (clamped
//! or skipped) and the problem is recorded so the host can surface it.

use crate::clip::ClipId;

/// A normalization applied while rebuilding sequences
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContentError {
    /// A span was authored with a negative or non-finite length
    #[error("Invalid duration {value} in clip {clip:?}, clamped to 0")]
    InvalidDuration {
        /// Clip being materialized
        clip: Option<ClipId>,
        /// Authored value
        value: f32,
    },

    /// A span was authored with a negative or non-finite start offset
    #[error("Invalid start offset {value} in clip {clip:?}, clamped to 0")]
    InvalidOffset {
        /// Clip being materialized
        clip: Option<ClipId>,
        /// Authored value
        value: f32,
    },

    /// A clip tried to nest itself or one of its ancestors
    #[error("Clip {clip:?} is nested inside itself")]
    CyclicClip {
        /// The clip that was refused
        clip: ClipId,
    },

    /// Nesting went deeper than the supported limit
    #[error("Nesting too deep (max depth: {max_depth}) at clip {clip:?}")]
    NestingTooDeep {
        /// The clip that was refused
        clip: ClipId,
        /// The supported limit
        max_depth: usize,
    },
}

/// Clamp an authored duration to `>= 0`, reporting the normalization
pub(crate) fn sanitize_duration(
    value: f32,
    clip: Option<ClipId>,
    issues: &mut Vec<ContentError>,
) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        issues.push(ContentError::InvalidDuration { clip, value });
        0.0
    }
}

/// Clamp an authored start offset to `>= 0`, reporting the normalization
pub(crate) fn sanitize_offset(
    value: f32,
    clip: Option<ClipId>,
    issues: &mut Vec<ContentError>,
) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        issues.push(ContentError::InvalidOffset { clip, value });
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_valid_values() {
        let mut issues = Vec::new();
        assert_eq!(sanitize_duration(2.5, None, &mut issues), 2.5);
        assert_eq!(sanitize_offset(0.0, None, &mut issues), 0.0);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_sanitize_clamps_invalid_values() {
        let mut issues = Vec::new();
        assert_eq!(sanitize_duration(-1.0, None, &mut issues), 0.0);
        assert_eq!(sanitize_duration(f32::NAN, None, &mut issues), 0.0);
        assert_eq!(sanitize_offset(f32::NEG_INFINITY, None, &mut issues), 0.0);
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], ContentError::InvalidDuration { value, .. } if value == -1.0));
    }
}
