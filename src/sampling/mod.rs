//! Bilinear sampling of channel and stencil grids.
//!
//! Samplers take normalized coordinates in `[0, 1]²`. Unlike direct cell
//! access, they clamp neighbours into the grid and treat coordinates outside
//! the unit square as "no coverage", returning zero.

mod bilinear;
mod resample;

pub use bilinear::{
    MIN_STENCIL_CONTRIBUTION, StencilSampleOptions, sample, sample_f32, stencil_sample,
};
pub use resample::resample;
