//! Bilinear sampling over normalized grid coordinates.

use bevy::math::{UVec2, Vec2};

use crate::grid::{Grid2D, GridValue};
use crate::stencil::StencilValue;

/// Weighted stencil contributions below this sum sample as zero.
pub const MIN_STENCIL_CONTRIBUTION: f32 = 0.01;

/// Options for [`stencil_sample`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilSampleOptions {
    /// Only cells owned by this key contribute. `None` accepts every owner.
    pub key_filter: Option<i32>,

    /// Treat cells owned by keys below 1 as unclaimed.
    /// Default: false
    pub ignore_negative_keys: bool,

    /// Weighted sums below this threshold return 0.
    /// Default: [`MIN_STENCIL_CONTRIBUTION`]
    pub min_contribution: f32,
}

impl Default for StencilSampleOptions {
    fn default() -> Self {
        Self {
            key_filter: None,
            ignore_negative_keys: false,
            min_contribution: MIN_STENCIL_CONTRIBUTION,
        }
    }
}

impl StencilSampleOptions {
    /// Restricts sampling to cells owned by `key`.
    pub fn with_key(mut self, key: i32) -> Self {
        self.key_filter = Some(key);
        self
    }

    pub fn ignoring_negative_keys(mut self, ignore: bool) -> Self {
        self.ignore_negative_keys = ignore;
        self
    }
}

/// The four clamped neighbours of a sample point and its fractional offsets.
struct Footprint {
    x0: i64,
    z0: i64,
    fx: f32,
    fz: f32,
}

impl Footprint {
    /// Returns `None` when `uv` lies outside `[0, 1]²`.
    fn new(size: UVec2, uv: Vec2) -> Option<Self> {
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return None;
        }
        // Cell centers: uv 0 and 1 land exactly on the first and last cell
        let px = uv.x * size.x.saturating_sub(1) as f32;
        let pz = uv.y * size.y.saturating_sub(1) as f32;
        let x0 = px.floor();
        let z0 = pz.floor();
        Some(Self {
            x0: x0 as i64,
            z0: z0 as i64,
            fx: px - x0,
            fz: pz - z0,
        })
    }

    #[inline]
    fn corners(&self) -> [(i64, i64); 4] {
        [
            (self.x0, self.z0),
            (self.x0 + 1, self.z0),
            (self.x0, self.z0 + 1),
            (self.x0 + 1, self.z0 + 1),
        ]
    }

    #[inline]
    fn weights(&self) -> [f32; 4] {
        [
            (1.0 - self.fx) * (1.0 - self.fz),
            self.fx * (1.0 - self.fz),
            (1.0 - self.fx) * self.fz,
            self.fx * self.fz,
        ]
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Samples `grid` at normalized `uv`, widened to `f32`.
///
/// Coordinates outside `[0, 1]²` and absent grids sample as zero.
pub fn sample_f32<T: GridValue>(grid: &Grid2D<T>, uv: Vec2) -> f32 {
    if grid.is_absent() {
        return 0.0;
    }
    let Some(fp) = Footprint::new(grid.size(), uv) else {
        return 0.0;
    };
    let [c00, c10, c01, c11] = fp.corners().map(|(u, v)| grid.get_clamped(u, v).to_f32());
    let top = lerp(c00, c10, fp.fx);
    let bottom = lerp(c01, c11, fp.fx);
    lerp(top, bottom, fp.fz)
}

/// Samples `grid` at normalized `uv` in the grid's own channel type.
///
/// Sampling at `(0, 0)` returns the first cell exactly and `(1, 1)` the last.
pub fn sample<T: GridValue>(grid: &Grid2D<T>, uv: Vec2) -> T {
    T::from_f32(sample_f32(grid, uv))
}

/// Samples the decoded strength of a stencil grid at normalized `uv`.
///
/// Each neighbour is decoded before blending, so owner keys never bleed into
/// the interpolated strength. The result is clamped to `[0, 1]`.
pub fn stencil_sample(stencil: &Grid2D<f32>, uv: Vec2, options: &StencilSampleOptions) -> f32 {
    if stencil.is_absent() {
        return 0.0;
    }
    let Some(fp) = Footprint::new(stencil.size(), uv) else {
        return 0.0;
    };

    let strengths = fp.corners().map(|(u, v)| {
        let cell = StencilValue::decode(stencil.get_clamped(u, v), options.ignore_negative_keys);
        match options.key_filter {
            // Another owner's claim counts as no coverage
            Some(key) if cell.key != key => 0.0,
            _ => cell.strength,
        }
    });

    let sum: f32 = strengths
        .iter()
        .zip(fp.weights())
        .map(|(s, w)| s * w)
        .sum();
    // Faint edge bleed
    if sum < options.min_contribution {
        return 0.0;
    }
    sum.clamp(0.0, 1.0)
}
