//! Cell value types that can live in a [`Grid2D`](super::Grid2D).

use bytemuck::Pod;

/// How additive blending handles byte channels that overflow 255.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOverflow {
    /// Clamp at 255.
    #[default]
    Saturate,
    /// Wrap modulo 256.
    Wrap,
}

/// A fixed-size channel value: `f32` for heights and stencils, `u8` for
/// splat weights and detail densities.
pub trait GridValue: Pod + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// The "no data" value returned for absent channels and out-of-range samples.
    const ZERO: Self;

    /// Widens the value for interpolation.
    fn to_f32(self) -> f32;

    /// Narrows an interpolated value back to the channel type.
    ///
    /// Byte channels round and clamp to `[0, 255]`.
    fn from_f32(value: f32) -> Self;

    /// Sums two values under the given overflow policy.
    fn add(self, other: Self, overflow: ByteOverflow) -> Self;
}

impl GridValue for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline]
    fn add(self, other: Self, _overflow: ByteOverflow) -> Self {
        self + other
    }
}

impl GridValue for u8 {
    const ZERO: Self = 0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value.round().clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn add(self, other: Self, overflow: ByteOverflow) -> Self {
        match overflow {
            ByteOverflow::Saturate => self.saturating_add(other),
            ByteOverflow::Wrap => self.wrapping_add(other),
        }
    }
}
