//! Dense row-major 2D channel storage.

use bevy::math::UVec2;

use super::GridValue;
use crate::error::GridError;

/// A dense 2D grid of channel values.
///
/// Cells are stored row-major: `index = v * width + u`, where `u` runs along
/// the X axis and `v` along the Z axis of the terrain.
///
/// A grid whose backing buffer is empty is *absent*: it still has dimensions
/// but no data, and reads as [`GridValue::ZERO`] everywhere. Absent grids are
/// how an unpopulated channel flows through sampling and blending without
/// being treated as an error.
///
/// # Example
///
/// ```
/// use bevy_terrain_layers::grid::Grid2D;
///
/// let mut heights = Grid2D::<f32>::new(4, 4).unwrap();
/// heights.set(1, 2, 5.0).unwrap();
/// assert_eq!(heights.get(1, 2).unwrap(), 5.0);
///
/// let absent = Grid2D::<u8>::absent(4, 4);
/// assert_eq!(absent.get(3, 3).unwrap(), 0);
/// ```
#[derive(Clone, PartialEq, Default)]
pub struct Grid2D<T: GridValue> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

/// Number of cells for a `width` x `height` grid of `T`, or an error if the
/// buffer could not be addressed.
fn cell_count<T>(width: u32, height: u32) -> Result<usize, GridError> {
    let cells = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| GridError::InvalidArgument(format!("{width}x{height} overflows")))?;
    let bytes = cells.checked_mul(size_of::<T>() as u64);
    match bytes {
        Some(bytes) if bytes <= isize::MAX as u64 => Ok(cells as usize),
        _ => Err(GridError::InvalidArgument(format!(
            "{width}x{height} grid exceeds addressable memory"
        ))),
    }
}

impl<T: GridValue> Grid2D<T> {
    /// Creates a zero-filled grid.
    pub fn new(width: u32, height: u32) -> Result<Self, GridError> {
        Self::filled(width, height, T::ZERO)
    }

    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Result<Self, GridError> {
        let len = cell_count::<T>(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a grid with dimensions but no backing data.
    pub const fn absent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Vec::new(),
        }
    }

    /// Wraps an existing buffer. An empty buffer yields an absent grid.
    pub fn from_raw(width: u32, height: u32, data: Vec<T>) -> Result<Self, GridError> {
        if data.is_empty() {
            return Ok(Self::absent(width, height));
        }
        let expected = cell_count::<T>(width, height)?;
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(u, v)` for every cell.
    pub fn from_fn<F: FnMut(u32, u32) -> T>(
        width: u32,
        height: u32,
        mut f: F,
    ) -> Result<Self, GridError> {
        let mut data = Vec::with_capacity(cell_count::<T>(width, height)?);
        for v in 0..height {
            for u in 0..width {
                data.push(f(u, v));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    /// Returns `true` when the grid has no backing data.
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    #[inline]
    fn index(&self, u: u32, v: u32) -> usize {
        v as usize * self.width as usize + u as usize
    }

    fn check(&self, u: u32, v: u32) -> Result<(), GridError> {
        if u >= self.width || v >= self.height {
            return Err(GridError::IndexOutOfRange {
                u: u as u64,
                v: v as u64,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Allocates zeroed storage for an absent grid.
    fn materialize(&mut self) -> Result<(), GridError> {
        if self.is_absent() {
            self.data = vec![T::ZERO; cell_count::<T>(self.width, self.height)?];
        }
        Ok(())
    }

    /// Reads a cell. Absent grids read as zero.
    pub fn get(&self, u: u32, v: u32) -> Result<T, GridError> {
        if self.is_absent() {
            return Ok(T::ZERO);
        }
        self.check(u, v)?;
        Ok(self.data[self.index(u, v)])
    }

    /// Writes a cell, allocating storage if the grid was absent.
    pub fn set(&mut self, u: u32, v: u32, value: T) -> Result<(), GridError> {
        self.check(u, v)?;
        self.materialize()?;
        let i = self.index(u, v);
        self.data[i] = value;
        Ok(())
    }

    /// Reads a cell with coordinates clamped into the grid.
    #[inline]
    pub fn get_clamped(&self, u: i64, v: i64) -> T {
        if self.is_absent() || self.width == 0 || self.height == 0 {
            return T::ZERO;
        }
        let u = u.clamp(0, self.width as i64 - 1) as u32;
        let v = v.clamp(0, self.height as i64 - 1) as u32;
        self.data[self.index(u, v)]
    }

    /// Copies the `width` x `height` rectangle starting at `(x, z)`.
    ///
    /// Selecting from an absent grid yields an absent grid of the requested
    /// size. The rectangle is bounds-checked either way.
    pub fn select(&self, x: u32, z: u32, width: u32, height: u32) -> Result<Self, GridError> {
        self.check_rect(x, z, width, height)?;
        if self.is_absent() {
            return Ok(Self::absent(width, height));
        }
        let mut data = Vec::with_capacity(cell_count::<T>(width, height)?);
        for v in z..z + height {
            let start = self.index(x, v);
            data.extend_from_slice(&self.data[start..start + width as usize]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Writes `src` into this grid with its origin at `(x, z)`.
    ///
    /// An absent `src` is a no-op; an absent destination is allocated first.
    pub fn paste(&mut self, x: u32, z: u32, src: &Self) -> Result<(), GridError> {
        if src.is_absent() {
            return Ok(());
        }
        self.check_rect(x, z, src.width, src.height)?;
        self.materialize()?;
        for row in 0..src.height {
            let dst = self.index(x, z + row);
            let from = src.index(0, row);
            self.data[dst..dst + src.width as usize]
                .copy_from_slice(&src.data[from..from + src.width as usize]);
        }
        Ok(())
    }

    fn check_rect(&self, x: u32, z: u32, width: u32, height: u32) -> Result<(), GridError> {
        let end_u = x as u64 + width as u64;
        let end_v = z as u64 + height as u64;
        if end_u > self.width as u64 || end_v > self.height as u64 {
            return Err(GridError::IndexOutOfRange {
                u: end_u.saturating_sub(1),
                v: end_v.saturating_sub(1),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Transposes the grid, swapping the U and V axes.
    pub fn flip(&mut self) {
        if !self.is_absent() {
            let mut data = Vec::with_capacity(self.data.len());
            for u in 0..self.width {
                for v in 0..self.height {
                    data.push(self.data[self.index(u, v)]);
                }
            }
            self.data = data;
        }
        std::mem::swap(&mut self.width, &mut self.height);
    }

    /// Sets every cell to `value`, allocating storage if absent.
    pub fn fill(&mut self, value: T) -> Result<(), GridError> {
        if self.is_absent() {
            self.data = vec![value; cell_count::<T>(self.width, self.height)?];
        } else {
            self.data.fill(value);
        }
        Ok(())
    }

    /// Sets every cell to zero.
    pub fn clear(&mut self) -> Result<(), GridError> {
        self.fill(T::ZERO)
    }

    /// Drops the backing data and adopts new dimensions.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data = Vec::new();
    }
}

impl<T: GridValue> std::fmt::Debug for Grid2D<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Grid2D");
        s.field("width", &self.width).field("height", &self.height);
        if self.is_absent() {
            s.field("data", &"absent");
        } else {
            let (min, max) = self.data.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
                let v = v.to_f32();
                (lo.min(v), hi.max(v))
            });
            s.field("min", &min).field("max", &max);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> Grid2D<f32> {
        Grid2D::from_fn(width, height, |u, v| (v * width + u) as f32).unwrap()
    }

    #[test]
    fn test_new_is_zero_filled() {
        let grid = Grid2D::<u8>::new(3, 2).unwrap();
        assert_eq!(grid.as_slice().len(), 6);
        assert!(grid.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_new_rejects_overflow() {
        let result = Grid2D::<f32>::new(u32::MAX, u32::MAX);
        assert!(matches!(result, Err(GridError::InvalidArgument(_))));
    }

    #[test]
    fn test_get_set() {
        let mut grid = Grid2D::<f32>::new(4, 3).unwrap();
        grid.set(3, 2, 7.5).unwrap();
        assert_eq!(grid.get(3, 2).unwrap(), 7.5);
        assert_eq!(grid.as_slice()[2 * 4 + 3], 7.5);
    }

    #[test]
    fn test_out_of_range() {
        let mut grid = Grid2D::<f32>::new(4, 3).unwrap();
        assert!(matches!(
            grid.get(4, 0),
            Err(GridError::IndexOutOfRange { u: 4, v: 0, .. })
        ));
        assert!(grid.set(0, 3, 1.0).is_err());
    }

    #[test]
    fn test_absent_reads_zero() {
        let grid = Grid2D::<u8>::absent(8, 8);
        assert!(grid.is_absent());
        assert_eq!(grid.get(2, 2).unwrap(), 0);
        assert_eq!(grid.get_clamped(-5, 100), 0);
    }

    #[test]
    fn test_set_materializes_absent() {
        let mut grid = Grid2D::<u8>::absent(2, 2);
        grid.set(1, 1, 9).unwrap();
        assert!(!grid.is_absent());
        assert_eq!(grid.as_slice(), &[0, 0, 0, 9]);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        let result = Grid2D::<u8>::from_raw(2, 2, vec![1, 2, 3]);
        assert_eq!(
            result,
            Err(GridError::LengthMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_select() {
        let grid = ramp(4, 4);
        let sub = grid.select(1, 2, 2, 2).unwrap();
        assert_eq!(sub.size(), UVec2::new(2, 2));
        assert_eq!(sub.as_slice(), &[9.0, 10.0, 13.0, 14.0]);
    }

    #[test]
    fn test_select_out_of_bounds() {
        let grid = ramp(4, 4);
        assert!(matches!(
            grid.select(3, 0, 2, 1),
            Err(GridError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_select_absent() {
        let grid = Grid2D::<f32>::absent(4, 4);
        let sub = grid.select(0, 0, 2, 3).unwrap();
        assert!(sub.is_absent());
        assert_eq!(sub.size(), UVec2::new(2, 3));

        assert!(matches!(
            grid.select(3, 3, 5, 5),
            Err(GridError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_paste_inverts_select() {
        let src = ramp(4, 4);
        let patch = src.select(1, 1, 2, 2).unwrap();
        let mut dst = Grid2D::<f32>::absent(4, 4);
        dst.paste(1, 1, &patch).unwrap();
        assert_eq!(dst.get(1, 1).unwrap(), 5.0);
        assert_eq!(dst.get(2, 2).unwrap(), 10.0);
        assert_eq!(dst.get(0, 0).unwrap(), 0.0);
        assert!(dst.paste(3, 3, &patch).is_err());
    }

    #[test]
    fn test_flip_transposes() {
        let mut grid = ramp(3, 2);
        let before = grid.clone();
        grid.flip();
        assert_eq!(grid.size(), UVec2::new(2, 3));
        for v in 0..2 {
            for u in 0..3 {
                assert_eq!(grid.get(v, u).unwrap(), before.get(u, v).unwrap());
            }
        }
    }

    #[test]
    fn test_fill_and_clear() {
        let mut grid = Grid2D::<u8>::absent(2, 3);
        grid.fill(4).unwrap();
        assert!(grid.iter().all(|&c| c == 4));
        grid.clear().unwrap();
        assert!(grid.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_reset_drops_data() {
        let mut grid = ramp(2, 2);
        grid.reset(5, 5);
        assert!(grid.is_absent());
        assert_eq!(grid.size(), UVec2::new(5, 5));
    }
}
