//! Writing claims into a stencil grid.

use bevy::prelude::*;

use super::StencilValue;
use crate::error::GridError;
use crate::grid::Grid2D;

/// Claims stencil cells for `key`, one strength per cell of `strengths`.
///
/// `strengths` is placed with its origin at `(x, z)` in `stencil`. A cell is
/// written only when the new strength is positive and at least as strong as
/// the claim already stored there, so overlapping stamps keep the stronger
/// owner.
///
/// Returns the number of cells that changed owner or strength.
pub fn claim_stencil(
    stencil: &mut Grid2D<f32>,
    x: u32,
    z: u32,
    strengths: &Grid2D<f32>,
    key: i32,
    ignore_negative_keys: bool,
) -> Result<usize, GridError> {
    if key == 0 {
        return Err(GridError::InvalidArgument(
            "stencil key 0 is reserved for unclaimed cells".into(),
        ));
    }
    if strengths.is_absent() {
        return Ok(0);
    }

    let mut claimed = 0;
    for v in 0..strengths.height() {
        for u in 0..strengths.width() {
            let strength = strengths.get(u, v)?.clamp(0.0, 1.0);
            if strength <= 0.0 {
                continue;
            }
            let existing = StencilValue::decode(stencil.get(x + u, z + v)?, ignore_negative_keys);
            // Stronger owner already there
            if existing.is_claimed() && existing.strength > strength {
                continue;
            }
            stencil.set(x + u, z + v, StencilValue::encode(key, strength))?;
            claimed += 1;
        }
    }

    trace!("stencil key {key} claimed {claimed} cells at ({x}, {z})");
    Ok(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_into_absent_stencil() {
        let mut stencil = Grid2D::<f32>::absent(4, 4);
        let strengths = Grid2D::filled(2, 2, 1.0).unwrap();
        let count = claim_stencil(&mut stencil, 1, 1, &strengths, 3, false).unwrap();
        assert_eq!(count, 4);
        assert_eq!(StencilValue::decode(stencil.get(2, 2).unwrap(), false).key, 3);
        assert_eq!(stencil.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_stronger_claim_wins() {
        let mut stencil = Grid2D::<f32>::new(1, 1).unwrap();
        claim_stencil(&mut stencil, 0, 0, &Grid2D::filled(1, 1, 0.8).unwrap(), 1, false).unwrap();
        let weaker = claim_stencil(&mut stencil, 0, 0, &Grid2D::filled(1, 1, 0.3).unwrap(), 2, false)
            .unwrap();
        assert_eq!(weaker, 0);
        assert_eq!(StencilValue::decode(stencil.get(0, 0).unwrap(), false).key, 1);

        claim_stencil(&mut stencil, 0, 0, &Grid2D::filled(1, 1, 0.9).unwrap(), 2, false).unwrap();
        assert_eq!(StencilValue::decode(stencil.get(0, 0).unwrap(), false).key, 2);
    }

    #[test]
    fn test_zero_key_rejected() {
        let mut stencil = Grid2D::<f32>::new(1, 1).unwrap();
        let strengths = Grid2D::filled(1, 1, 1.0).unwrap();
        assert!(claim_stencil(&mut stencil, 0, 0, &strengths, 0, false).is_err());
    }

    #[test]
    fn test_claim_outside_stencil_fails() {
        let mut stencil = Grid2D::<f32>::new(2, 2).unwrap();
        let strengths = Grid2D::filled(2, 2, 1.0).unwrap();
        assert!(matches!(
            claim_stencil(&mut stencil, 1, 1, &strengths, 1, false),
            Err(GridError::IndexOutOfRange { .. })
        ));
    }
}
