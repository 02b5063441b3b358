//! Raw byte layout handed over by the persistence layer.
//!
//! Each channel grid is packed cell by cell in native byte order. Dimensions
//! travel separately; the cell count is re-derived from the payload length.

use super::{Grid2D, GridValue};
use crate::error::GridError;

impl<T: GridValue> Grid2D<T> {
    /// Packs the cells into bytes. Absent grids pack to an empty payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(self.as_slice()).to_vec()
    }

    /// Rebuilds a grid from a decompressed payload.
    ///
    /// An empty payload is a valid absent grid. Otherwise the payload length
    /// must be a whole number of cells and agree with `width * height`.
    pub fn from_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, GridError> {
        if bytes.is_empty() {
            return Ok(Self::absent(width, height));
        }
        let cell = size_of::<T>();
        if bytes.len() % cell != 0 {
            return Err(GridError::InvalidArgument(format!(
                "payload of {} bytes is not a whole number of {cell}-byte cells",
                bytes.len()
            )));
        }
        // Payload slices are not guaranteed to be aligned for `T`.
        let data: Vec<T> = bytes
            .chunks_exact(cell)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        Self::from_raw(width, height, data)
    }
}
