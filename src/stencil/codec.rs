//! Single-float encoding of an owner key and a strength.

/// Width of the fractional window that carries the strength.
///
/// Encoding and decoding must agree on this value.
pub const STENCIL_WINDOW: f32 = 0.9;

/// A decoded stencil cell.
///
/// The integer part of the raw value is the owner key: the identifier of the
/// layer or stamp that last claimed the cell, with its sign carrying logical
/// polarity. Key `0` means unclaimed. The fractional part, scaled into
/// [`STENCIL_WINDOW`], carries the strength inverted so that a full-strength
/// claim encodes to the bare integer.
///
/// # Example
///
/// ```
/// use bevy_terrain_layers::stencil::StencilValue;
///
/// let raw = StencilValue::encode(7, 0.5);
/// let cell = StencilValue::decode(raw, false);
/// assert_eq!(cell.key, 7);
/// assert!((cell.strength - 0.5).abs() < 1e-3);
///
/// assert_eq!(StencilValue::encode(0, 1.0), 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StencilValue {
    pub key: i32,
    pub strength: f32,
}

impl StencilValue {
    pub const UNCLAIMED: Self = Self {
        key: 0,
        strength: 0.0,
    };

    #[inline]
    pub const fn new(key: i32, strength: f32) -> Self {
        Self { key, strength }
    }

    /// Packs `key` and `strength` into one float. Strength is clamped to `[0, 1]`.
    #[inline]
    pub fn encode(key: i32, strength: f32) -> f32 {
        if key == 0 {
            return 0.0;
        }
        let strength = strength.clamp(0.0, 1.0);
        key as f32 + (1.0 - strength) * STENCIL_WINDOW * key.signum() as f32
    }

    /// Unpacks a raw stencil float.
    ///
    /// With `ignore_negative_keys`, cells owned by a key below 1 decode with
    /// zero strength. Key `0` always decodes with zero strength.
    pub fn decode(raw: f32, ignore_negative_keys: bool) -> Self {
        if raw == 0.0 || !raw.is_finite() {
            return Self::UNCLAIMED;
        }
        let key = if raw > 0.0 { raw.floor() } else { raw.ceil() } as i32;

        let magnitude = raw.abs();
        let frac = magnitude - magnitude.floor();
        let mut strength = (1.0 - frac / STENCIL_WINDOW).clamp(0.0, 1.0);

        if key == 0 || (ignore_negative_keys && key < 1) {
            strength = 0.0;
        }
        Self { key, strength }
    }

    /// Re-encodes this cell.
    #[inline]
    pub fn to_raw(self) -> f32 {
        Self::encode(self.key, self.strength)
    }

    /// Returns `true` if some owner holds the cell with non-zero strength.
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.key != 0 && self.strength > 0.0
    }
}
