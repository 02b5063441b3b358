//! Blend policies and the routines that apply them.
//!
//! This module provides:
//! - [`BlendMode`]: Set, Additive or Stencil-weighted lerp
//! - [`BlendRegion`] / [`EraseRegion`]: where a grid sits in the full canvas
//! - [`BlendEngine`]: `blend_into` and `erase_with_stencil` for byte and float channels

mod engine;
mod mode;

pub use engine::BlendEngine;
pub use mode::{BlendMode, BlendRegion, EraseRegion};
