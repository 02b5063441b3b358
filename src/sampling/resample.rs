//! Resampling a sub-rectangle of a grid to another resolution.

use bevy::math::{UVec2, Vec2};

use super::sample;
use crate::error::GridError;
use crate::grid::{Grid2D, GridValue};

/// Copies the `width` x `height` rectangle at `(x, z)` and resamples it to
/// `target` resolution.
///
/// When `target` equals the rectangle size this is a plain [`Grid2D::select`].
/// Absent grids resample to absent grids.
pub fn resample<T: GridValue>(
    grid: &Grid2D<T>,
    x: u32,
    z: u32,
    width: u32,
    height: u32,
    target: UVec2,
) -> Result<Grid2D<T>, GridError> {
    let region = grid.select(x, z, width, height)?;
    if region.is_absent() {
        return Ok(Grid2D::absent(target.x, target.y));
    }
    if target == region.size() {
        return Ok(region);
    }

    let span = Vec2::new(
        target.x.saturating_sub(1).max(1) as f32,
        target.y.saturating_sub(1).max(1) as f32,
    );
    Grid2D::from_fn(target.x, target.y, |u, v| {
        sample(&region, Vec2::new(u as f32, v as f32) / span)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_select() {
        let grid = Grid2D::<u8>::from_fn(4, 4, |u, v| (u + v * 4) as u8).unwrap();
        let out = resample(&grid, 1, 1, 2, 2, UVec2::new(2, 2)).unwrap();
        assert_eq!(out, grid.select(1, 1, 2, 2).unwrap());
    }

    #[test]
    fn test_upsample_interpolates() {
        let grid = Grid2D::from_raw(2, 1, vec![0.0f32, 10.0]).unwrap();
        let out = resample(&grid, 0, 0, 2, 1, UVec2::new(3, 1)).unwrap();
        assert_eq!(out.as_slice(), &[0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_downsample_keeps_edges() {
        let grid = Grid2D::<f32>::from_fn(5, 5, |u, _| u as f32).unwrap();
        let out = resample(&grid, 0, 0, 5, 5, UVec2::new(2, 2)).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 0.0);
        assert_eq!(out.get(1, 1).unwrap(), 4.0);
    }

    #[test]
    fn test_absent_resamples_to_absent() {
        let grid = Grid2D::<u8>::absent(8, 8);
        let out = resample(&grid, 0, 0, 8, 8, UVec2::new(4, 4)).unwrap();
        assert!(out.is_absent());
        assert_eq!(out.size(), UVec2::new(4, 4));
    }

    #[test]
    fn test_region_out_of_bounds() {
        let grid = Grid2D::<u8>::new(4, 4).unwrap();
        assert!(resample(&grid, 3, 3, 2, 2, UVec2::new(4, 4)).is_err());
    }
}
