//! 2D channel grids.
//!
//! This module provides:
//! - [`Grid2D`]: dense row-major storage for heights, stencils, splat and detail maps
//! - [`GridValue`]: the cell types a grid can hold (`f32`, `u8`)
//! - The raw byte layout used when the persistence layer hands grids back

mod grid2d;
mod persist;
mod value;

pub use grid2d::Grid2D;
pub use value::{ByteOverflow, GridValue};
