//! Single-pass blend and erase routines.

use bevy::prelude::*;

use super::{BlendMode, BlendRegion, EraseRegion};
use crate::error::GridError;
use crate::grid::{ByteOverflow, Grid2D, GridValue};
use crate::sampling::{StencilSampleOptions, stencil_sample};

/// Blends channel grids into one another.
///
/// The engine holds only policy: how byte channels overflow under
/// [`BlendMode::Additive`], and how stencils are decoded when sampled.
///
/// # Example
///
/// ```
/// use bevy::math::UVec2;
/// use bevy_terrain_layers::blend::{BlendEngine, BlendMode, BlendRegion};
/// use bevy_terrain_layers::grid::Grid2D;
///
/// let engine = BlendEngine::default();
/// let region = BlendRegion::full(UVec2::new(1, 1));
///
/// let mut base = Grid2D::<u8>::filled(1, 1, 250).unwrap();
/// let incoming = Grid2D::<u8>::filled(1, 1, 20).unwrap();
/// engine.blend_into(&mut base, &incoming, None, BlendMode::Additive, &region).unwrap();
/// assert_eq!(base.get(0, 0).unwrap(), 255);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendEngine {
    pub overflow: ByteOverflow,
    pub stencil: StencilSampleOptions,
}

impl BlendEngine {
    pub fn new(overflow: ByteOverflow, stencil: StencilSampleOptions) -> Self {
        Self { overflow, stencil }
    }

    /// Blends `incoming` into `base` over `region`.
    ///
    /// - An absent `incoming` leaves `base` untouched.
    /// - An absent `base` becomes a copy of `incoming`, whatever the mode.
    /// - Otherwise both must match `region.size`, and `base` keeps its shape.
    ///
    /// `stencil` is only read in [`BlendMode::Stencil`]; cells whose sampled
    /// strength is zero keep their base value.
    pub fn blend_into<T: GridValue>(
        &self,
        base: &mut Grid2D<T>,
        incoming: &Grid2D<T>,
        stencil: Option<&Grid2D<f32>>,
        mode: BlendMode,
        region: &BlendRegion,
    ) -> Result<(), GridError> {
        if incoming.is_absent() {
            return Ok(());
        }
        if incoming.size() != region.size {
            return Err(GridError::shape(region.size, incoming.size()));
        }
        // First write into an empty channel: nothing to blend against
        if base.is_absent() {
            *base = incoming.clone();
            return Ok(());
        }
        if base.size() != region.size {
            return Err(GridError::shape(region.size, base.size()));
        }

        match mode {
            BlendMode::Set => base.as_mut_slice().copy_from_slice(incoming.as_slice()),
            BlendMode::Additive => {
                for (b, i) in base.as_mut_slice().iter_mut().zip(incoming.as_slice()) {
                    *b = b.add(*i, self.overflow);
                }
            }
            BlendMode::Stencil => {
                let Some(stencil) = stencil else {
                    warn!("stencil blend without a stencil grid leaves the base unchanged");
                    return Ok(());
                };
                let width = region.size.x as usize;
                let base_cells = base.as_mut_slice();
                for v in 0..region.size.y {
                    for u in 0..region.size.x {
                        // Stencil is sampled in full-canvas space, not region space
                        let strength = stencil_sample(stencil, region.uv(u, v), &self.stencil);
                        // Unclaimed cells keep the base
                        if strength <= 0.0 {
                            continue;
                        }
                        let i = v as usize * width + u as usize;
                        base_cells[i] = lerp_cell(base_cells[i], incoming.as_slice()[i], strength);
                    }
                }
            }
        }
        Ok(())
    }

    /// Scales `base` down by the stencil strength sampled over `region`.
    ///
    /// - `absolute`: cells with zero strength are zeroed, others kept. With
    ///   `invert`, cells with any strength are zeroed instead.
    /// - otherwise: cells are scaled by `1 - strength`, or by `strength`
    ///   with `invert`.
    ///
    /// An absent `base` is left absent.
    pub fn erase_with_stencil<T: GridValue>(
        &self,
        base: &mut Grid2D<T>,
        stencil: &Grid2D<f32>,
        region: &EraseRegion,
        invert: bool,
        absolute: bool,
    ) -> Result<(), GridError> {
        if region.max.x < region.min.x || region.max.y < region.min.y {
            return Err(GridError::InvalidArgument(format!(
                "erase region max {} is below min {}",
                region.max, region.min
            )));
        }
        if base.is_absent() {
            return Ok(());
        }

        let dims = base.size();
        let cells = base.as_mut_slice();
        for v in 0..dims.y {
            for u in 0..dims.x {
                let strength = stencil_sample(stencil, region.uv(u, v, dims), &self.stencil);
                let i = v as usize * dims.x as usize + u as usize;
                // Binary mask
                if absolute {
                    let keep = (strength > 0.0) != invert;
                    if !keep {
                        cells[i] = T::ZERO;
                    }
                } else {
                    // Proportional fade
                    let factor = if invert { strength } else { 1.0 - strength };
                    cells[i] = T::from_f32(cells[i].to_f32() * factor);
                }
            }
        }
        Ok(())
    }
}

/// Lerps between two cells, keeping the result between them.
#[inline]
fn lerp_cell<T: GridValue>(base: T, incoming: T, t: f32) -> T {
    let (a, b) = (base.to_f32(), incoming.to_f32());
    let value = (a + (b - a) * t).clamp(a.min(b), a.max(b));
    T::from_f32(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stencil::StencilValue;

    fn region(w: u32, h: u32) -> BlendRegion {
        BlendRegion::full(UVec2::new(w, h))
    }

    fn stencil(w: u32, h: u32, key: i32, strength: f32) -> Grid2D<f32> {
        Grid2D::filled(w, h, StencilValue::encode(key, strength)).unwrap()
    }

    #[test]
    fn test_absent_incoming_is_noop() {
        let engine = BlendEngine::default();
        let mut base = Grid2D::<f32>::filled(2, 2, 3.0).unwrap();
        let before = base.clone();
        engine
            .blend_into(&mut base, &Grid2D::absent(2, 2), None, BlendMode::Set, &region(2, 2))
            .unwrap();
        assert_eq!(base, before);
    }

    #[test]
    fn test_first_write_shortcut() {
        let engine = BlendEngine::default();
        let incoming = Grid2D::<f32>::from_fn(2, 2, |u, v| (u + v) as f32).unwrap();
        for mode in [BlendMode::Set, BlendMode::Additive, BlendMode::Stencil] {
            let mut base = Grid2D::absent(2, 2);
            engine
                .blend_into(&mut base, &incoming, None, mode, &region(2, 2))
                .unwrap();
            assert_eq!(base, incoming);
        }
    }

    #[test]
    fn test_set_is_idempotent() {
        let engine = BlendEngine::default();
        let incoming = Grid2D::<u8>::from_fn(3, 3, |u, v| (u * 7 + v) as u8).unwrap();
        let mut once = Grid2D::<u8>::filled(3, 3, 1).unwrap();
        engine
            .blend_into(&mut once, &incoming, None, BlendMode::Set, &region(3, 3))
            .unwrap();
        let mut twice = once.clone();
        engine
            .blend_into(&mut twice, &incoming, None, BlendMode::Set, &region(3, 3))
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, incoming);
    }

    #[test]
    fn test_additive_bytes() {
        let engine = BlendEngine::default();
        let mut base = Grid2D::<u8>::filled(1, 1, 10).unwrap();
        let incoming = Grid2D::<u8>::filled(1, 1, 20).unwrap();
        engine
            .blend_into(&mut base, &incoming, None, BlendMode::Additive, &region(1, 1))
            .unwrap();
        assert_eq!(base.get(0, 0).unwrap(), 30);

        let mut base = Grid2D::<u8>::filled(1, 1, 250).unwrap();
        engine
            .blend_into(&mut base, &incoming, None, BlendMode::Additive, &region(1, 1))
            .unwrap();
        assert_eq!(base.get(0, 0).unwrap(), 255);
    }

    #[test]
    fn test_additive_bytes_wrapping() {
        let engine = BlendEngine::new(ByteOverflow::Wrap, StencilSampleOptions::default());
        let mut base = Grid2D::<u8>::filled(1, 1, 250).unwrap();
        let incoming = Grid2D::<u8>::filled(1, 1, 20).unwrap();
        engine
            .blend_into(&mut base, &incoming, None, BlendMode::Additive, &region(1, 1))
            .unwrap();
        assert_eq!(base.get(0, 0).unwrap(), 14);
    }

    #[test]
    fn test_stencil_lerp() {
        let engine = BlendEngine::default();
        let incoming = Grid2D::<f32>::filled(3, 3, 20.0).unwrap();
        for (strength, expected) in [(1.0, 20.0), (0.5, 15.0)] {
            let mut base = Grid2D::<f32>::filled(3, 3, 10.0).unwrap();
            let mask = stencil(3, 3, 1, strength);
            engine
                .blend_into(&mut base, &incoming, Some(&mask), BlendMode::Stencil, &region(3, 3))
                .unwrap();
            assert!(base.iter().all(|&h| (h - expected).abs() < 1e-3), "{base:?}");
        }
    }

    #[test]
    fn test_stencil_lerp_is_convex() {
        let engine = BlendEngine::default();
        let incoming = Grid2D::<u8>::from_fn(4, 4, |u, v| (u * 60 + v) as u8).unwrap();
        let original = Grid2D::<u8>::from_fn(4, 4, |u, v| (255 - u * 30 - v * 20) as u8).unwrap();
        for step in 0..=10 {
            let strength = step as f32 / 10.0;
            let mut base = original.clone();
            let mask = stencil(4, 4, 2, strength);
            engine
                .blend_into(&mut base, &incoming, Some(&mask), BlendMode::Stencil, &region(4, 4))
                .unwrap();
            for ((out, a), b) in base.iter().zip(original.iter()).zip(incoming.iter()) {
                assert!(*out >= *a.min(b) && *out <= *a.max(b));
            }
        }
    }

    #[test]
    fn test_stencil_without_stencil_grid_keeps_base() {
        let engine = BlendEngine::default();
        let mut base = Grid2D::<f32>::filled(2, 2, 1.0).unwrap();
        let incoming = Grid2D::<f32>::filled(2, 2, 9.0).unwrap();
        engine
            .blend_into(&mut base, &incoming, None, BlendMode::Stencil, &region(2, 2))
            .unwrap();
        assert!(base.iter().all(|&h| h == 1.0));
    }

    #[test]
    fn test_stencil_on_offset_region() {
        // Stencil claims only the right half of a 5-wide canvas.
        let engine = BlendEngine::default();
        let mask = Grid2D::from_fn(5, 1, |u, _| {
            if u >= 2 { StencilValue::encode(1, 1.0) } else { 0.0 }
        })
        .unwrap();
        let mut base = Grid2D::<f32>::filled(2, 1, 0.0).unwrap();
        let incoming = Grid2D::<f32>::filled(2, 1, 8.0).unwrap();
        let region = BlendRegion::new(UVec2::new(3, 0), UVec2::new(2, 1), UVec2::new(5, 1));
        engine
            .blend_into(&mut base, &incoming, Some(&mask), BlendMode::Stencil, &region)
            .unwrap();
        assert_eq!(base.as_slice(), &[8.0, 8.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let engine = BlendEngine::default();
        let mut base = Grid2D::<f32>::new(2, 2).unwrap();
        let incoming = Grid2D::<f32>::new(3, 3).unwrap();
        assert!(matches!(
            engine.blend_into(&mut base, &incoming, None, BlendMode::Set, &region(3, 3)),
            Err(GridError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            engine.blend_into(&mut base, &incoming, None, BlendMode::Set, &region(2, 2)),
            Err(GridError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_erase_scales_by_inverse_strength() {
        let engine = BlendEngine::default();
        let mask = stencil(3, 3, 1, 0.25);
        let erase = EraseRegion::new(Vec2::ZERO, Vec2::new(2.0, 2.0), UVec2::new(3, 3));

        let mut base = Grid2D::<f32>::filled(3, 3, 8.0).unwrap();
        engine
            .erase_with_stencil(&mut base, &mask, &erase, false, false)
            .unwrap();
        assert!(base.iter().all(|&h| (h - 6.0).abs() < 1e-3));

        let mut base = Grid2D::<f32>::filled(3, 3, 8.0).unwrap();
        engine
            .erase_with_stencil(&mut base, &mask, &erase, true, false)
            .unwrap();
        assert!(base.iter().all(|&h| (h - 2.0).abs() < 1e-3));
    }

    #[test]
    fn test_erase_absolute() {
        let engine = BlendEngine::default();
        let mask = Grid2D::from_fn(3, 1, |u, _| {
            if u == 0 { StencilValue::encode(1, 1.0) } else { 0.0 }
        })
        .unwrap();
        let erase = EraseRegion::new(Vec2::ZERO, Vec2::new(2.0, 0.0), UVec2::new(3, 1));

        let mut base = Grid2D::<u8>::filled(3, 1, 200).unwrap();
        engine
            .erase_with_stencil(&mut base, &mask, &erase, false, true)
            .unwrap();
        assert_eq!(base.as_slice(), &[200, 0, 0]);

        let mut base = Grid2D::<u8>::filled(3, 1, 200).unwrap();
        engine
            .erase_with_stencil(&mut base, &mask, &erase, true, true)
            .unwrap();
        assert_eq!(base.as_slice(), &[0, 200, 200]);
    }

    #[test]
    fn test_erase_rejects_inverted_region() {
        let engine = BlendEngine::default();
        let mut base = Grid2D::<u8>::new(2, 2).unwrap();
        let mask = stencil(2, 2, 1, 1.0);
        let erase = EraseRegion::new(Vec2::ONE, Vec2::ZERO, UVec2::new(2, 2));
        assert!(
            engine
                .erase_with_stencil(&mut base, &mask, &erase, false, false)
                .is_err()
        );
    }
}
