//! Error types for grid access and blending.

use bevy::math::UVec2;
use thiserror::Error;

/// Errors raised by grid access, sampling and blending.
///
/// These are caller contract violations: a resolution mismatch that would
/// otherwise corrupt downstream terrain data silently. An absent channel is
/// never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Cell ({u}, {v}) is outside a {width}x{height} grid")]
    IndexOutOfRange {
        u: u64,
        v: u64,
        width: u32,
        height: u32,
    },

    #[error("Grid shape mismatch: expected {}x{}, got {}x{}", expected.x, expected.y, found.x, found.y)]
    ShapeMismatch { expected: UVec2, found: UVec2 },

    #[error("Grid data holds {found} cells, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GridError {
    pub(crate) fn shape(expected: UVec2, found: UVec2) -> Self {
        Self::ShapeMismatch { expected, found }
    }
}
